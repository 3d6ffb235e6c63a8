use quest_core::{Conditions, Task};

use crate::config::EngineConfig;

/// Tasks spliced in front of an interrupted task.
///
/// In combat the actor dismounts and clears whatever is attacking it before
/// resuming; otherwise it only pauses briefly.
pub fn recovery_tasks(conditions: Conditions, config: &EngineConfig) -> Vec<Task> {
    if conditions.contains(Conditions::IN_COMBAT) {
        vec![
            Task::Unmount,
            Task::interruption_fight(),
            Task::Delay(config.recovery_delay),
        ]
    } else {
        vec![Task::Delay(config.recovery_delay)]
    }
}

#[cfg(test)]
mod tests {
    use quest_core::SpawnType;

    use super::*;

    #[test]
    fn combat_recovery_clears_hostiles_first() {
        let config = EngineConfig::default();
        let tasks = recovery_tasks(Conditions::IN_COMBAT | Conditions::MOUNTED, &config);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0], Task::Unmount);
        match &tasks[1] {
            Task::Fight(fight) => {
                assert_eq!(fight.combat.spawn_type, SpawnType::QuestInterruption);
                assert!(fight.combat.kill_list.is_empty());
            }
            other => panic!("expected fight, got {other}"),
        }
        assert_eq!(tasks[2], Task::Delay(config.recovery_delay));
    }

    #[test]
    fn peaceful_recovery_only_waits() {
        let config = EngineConfig::default();
        assert_eq!(
            recovery_tasks(Conditions::MOUNTED, &config),
            vec![Task::Delay(config.recovery_delay)]
        );
    }
}
