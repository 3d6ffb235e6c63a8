//! Scenario files for headless runs.
//!
//! A scenario describes the starting world (actor, objects, inventory, quest
//! progress, scripted reactions) and the quest steps to run in it. Steps are
//! fed to the dispatcher one at a time through [`ScriptedQuest`].
use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use quest_core::{
    AetheryteId, Conditions, GameObject, ItemId, PlayerState, QuestId, QuestProgress, StepRef,
    Task,
};
use quest_runtime::{Reaction, SimWorld, StepHooks};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub player: PlayerState,
    #[serde(default)]
    pub objects: Vec<GameObject>,
    #[serde(default)]
    pub progress: Vec<QuestProgress>,
    #[serde(default)]
    pub items: Vec<(ItemId, u32)>,
    #[serde(default)]
    pub attuned: Vec<AetheryteId>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub move_speed: Option<f32>,
    #[serde(default)]
    pub damage_per_second: Option<f32>,
    pub steps: Vec<Step>,
}

/// One compiled quest step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub quest: QuestId,
    pub sequence: u8,
    pub step: u16,
    pub tasks: Vec<Task>,
}

impl Step {
    pub fn step_ref(&self) -> StepRef {
        StepRef::new(self.quest, self.sequence, self.step)
    }

    /// The step's tasks, terminated by `NextStep`, or `EndAutomation` for the
    /// last step, unless the script already ends in a terminal task.
    fn into_tasks(self, last: bool) -> Vec<Task> {
        let step = self.step_ref();
        let mut tasks = self.tasks;
        if !tasks.last().is_some_and(Task::is_step_terminal) {
            tasks.push(if last {
                Task::EndAutomation
            } else {
                Task::NextStep(step)
            });
        }
        tasks
    }
}

impl Scenario {
    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::from_ron(&content)
            .with_context(|| format!("Failed to load scenario at {}", path.display()))
    }

    pub fn from_ron(content: &str) -> Result<Self> {
        let scenario: Scenario =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {e}"))?;
        if scenario.steps.is_empty() {
            anyhow::bail!("scenario '{}' has no steps", scenario.name);
        }
        Ok(scenario)
    }

    /// Initial world state of this scenario.
    pub fn build_world(&self) -> SimWorld {
        let mut world = SimWorld::new(self.player.clone());
        if let Some(speed) = self.move_speed {
            world = world.with_move_speed(speed);
        }
        if let Some(damage) = self.damage_per_second {
            world = world.with_damage_per_second(damage);
        }

        for object in &self.objects {
            world.spawn(object.clone());
        }
        for progress in &self.progress {
            world.set_progress(*progress);
        }
        for (item, count) in &self.items {
            world.give_item(*item, *count);
        }
        for aetheryte in &self.attuned {
            world.attune(*aetheryte);
        }
        for reaction in &self.reactions {
            world.add_reaction(reaction.clone());
        }
        world.insert_conditions(self.conditions);

        tracing::info!(
            "Scenario '{}' loaded: {} objects, {} reactions, {} steps",
            self.name,
            self.objects.len(),
            self.reactions.len(),
            self.steps.len()
        );
        world
    }

    /// Splits the scenario into its world and the step driver.
    pub fn into_run(self) -> (SimWorld, ScriptedQuest) {
        let world = self.build_world();
        (world, ScriptedQuest::new(self.steps))
    }
}

/// Step driver that replays the scenario's steps in order.
#[derive(Debug, Default)]
pub struct ScriptedQuest {
    steps: VecDeque<Step>,
    completed_tasks: usize,
    errors: Vec<String>,
}

impl ScriptedQuest {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            ..Self::default()
        }
    }

    /// Tasks of the next step, or nothing once all steps were handed out.
    pub fn next_tasks(&mut self) -> Vec<Task> {
        let Some(step) = self.steps.pop_front() else {
            return Vec::new();
        };
        tracing::info!("Entering step {}", step.step_ref());
        step.into_tasks(self.steps.is_empty())
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn completed_tasks(&self) -> usize {
        self.completed_tasks
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl StepHooks for ScriptedQuest {
    fn on_task_complete(&mut self, task: &Task) {
        self.completed_tasks += 1;
        tracing::debug!("Task done: {task}");
    }

    fn on_next_step(&mut self, step: StepRef) -> Vec<Task> {
        tracing::info!("Step {step} complete");
        self.next_tasks()
    }

    fn on_run_end(&mut self) {
        tracing::info!("Scenario finished after {} tasks", self.completed_tasks);
    }

    fn notify_error(&mut self, message: &str) {
        tracing::error!("Quest automation stopped: {message}");
        self.errors.push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use quest_core::{DataId, ObjectId};
    use quest_runtime::{Dispatcher, RunState, World};

    use super::*;

    const SCENARIO: &str = r#"
(
    name: "Talk and fight",
    player: (
        id: ObjectId(1),
        position: (x: 0.0, y: 0.0, z: 0.0),
        hitbox_radius: 0.5,
        role: Melee,
    ),
    objects: [
        (
            id: ObjectId(20),
            data_id: DataId(900),
            kind: Friendly,
            position: (x: 3.0, y: 0.0, z: 0.0),
        ),
    ],
    progress: [
        (quest: QuestId(70), sequence: 1, variables: (0, 0, 0, 0, 0, 0)),
    ],
    reactions: [
        (
            trigger: Interact(DataId(900)),
            effects: [
                SetProgress((quest: QuestId(70), sequence: 1, variables: (16, 0, 0, 0, 0, 0))),
                Spawn((
                    id: ObjectId(30),
                    data_id: DataId(500),
                    kind: Enemy,
                    position: (x: 4.0, y: 0.0, z: 0.0),
                )),
            ],
        ),
    ],
    damage_per_second: Some(50.0),
    steps: [
        (
            quest: QuestId(70),
            sequence: 1,
            step: 0,
            tasks: [
                Interact((
                    data_id: DataId(900),
                    quest: Some(QuestId(70)),
                    completion: [Some((high: Some(1)))],
                )),
            ],
        ),
        (
            quest: QuestId(70),
            sequence: 1,
            step: 1,
            tasks: [
                Fight((combat: (spawn_type: AfterInteraction, kill_list: [DataId(500)]))),
            ],
        ),
    ],
)
"#;

    fn write_scenario(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write scenario");
        file
    }

    #[test]
    fn loads_world_and_steps_from_ron() {
        let file = write_scenario(SCENARIO);
        let scenario = Scenario::load_from_file(file.path()).expect("scenario should parse");

        assert_eq!(scenario.name, "Talk and fight");
        assert_eq!(scenario.steps.len(), 2);
        let world = scenario.build_world();
        assert!(world.object(ObjectId(20)).is_some());
        assert!(world.object_by_data_id(DataId(500)).is_none());
    }

    #[test]
    fn steps_get_a_terminator() {
        let scenario = Scenario::from_ron(SCENARIO).expect("scenario should parse");
        let mut quest = ScriptedQuest::new(scenario.steps);

        let first = quest.next_tasks();
        assert_eq!(first.last(), Some(&Task::NextStep(StepRef::new(QuestId(70), 1, 0))));
        let second = quest.next_tasks();
        assert_eq!(second.last(), Some(&Task::EndAutomation));
        assert!(quest.next_tasks().is_empty());
    }

    #[test]
    fn scenario_without_steps_is_rejected() {
        let file = write_scenario(
            "(player: (id: ObjectId(1), position: (x: 0.0, y: 0.0, z: 0.0), hitbox_radius: 0.5, role: Tank), steps: [])",
        );
        let error = Scenario::load_from_file(file.path()).expect_err("no steps");
        assert!(format!("{error:#}").contains("has no steps"));
    }

    #[test]
    fn scripted_run_reaches_the_end() {
        let scenario = Scenario::from_ron(SCENARIO).expect("scenario should parse");
        let (mut world, mut quest) = scenario.into_run();
        let first = quest.next_tasks();

        let mut dispatcher = Dispatcher::builder().hooks(quest).build();
        dispatcher.start_run(first).expect("run should start");

        let mut state = RunState::Running;
        for _ in 0..300 {
            world.advance(Duration::from_millis(100));
            state = dispatcher.tick(&mut world);
            if state != RunState::Running {
                break;
            }
        }

        assert_eq!(state, RunState::Ended);
        assert!(
            world
                .object_by_data_id(DataId(500))
                .is_some_and(|enemy| enemy.is_dead)
        );
    }
}
