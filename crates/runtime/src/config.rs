//! Engine tunables.
//!
//! Every field has a default, so a config file only needs to name the values
//! it overrides. Durations are written as milliseconds.
use std::time::Duration;

use quest_core::ClassRole;
use serde::{Deserialize, Serialize};

/// Tunable parameters shared by the dispatcher, the executors and the combat engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a movement request may stay pending before it is treated as failed.
    #[serde(with = "millis")]
    pub move_timeout: Duration,
    /// Re-issued movement requests before a move task aborts.
    pub move_retry_limit: u32,
    /// Minimum time between two range checks against the current combat target.
    #[serde(with = "millis")]
    pub distance_check_interval: Duration,
    /// Engagement range for tanks and melee.
    pub melee_range: f32,
    /// Engagement range for physical ranged, casters and healers.
    pub ranged_range: f32,
    /// Surface distance under which an in-sight target is approached in a straight line.
    pub direct_move_threshold: f32,
    /// Interact/attune attempts before the task aborts.
    pub interaction_retry_limit: u32,
    #[serde(with = "millis")]
    pub interaction_retry_delay: Duration,
    /// How long a mount, unmount or item use may take to show its effect.
    #[serde(with = "millis")]
    pub action_timeout: Duration,
    /// Length of the delay spliced in after an interruption.
    #[serde(with = "millis")]
    pub recovery_delay: Duration,
    /// Radius within which a missing interaction object is treated as truly gone.
    pub interact_search_radius: f32,
    /// Error notifications containing one of these (case-insensitive) interrupt the active task.
    pub interrupt_phrases: Vec<String>,
    /// Capacity of each event broadcast channel.
    pub event_buffer_size: usize,
}

impl EngineConfig {
    pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_DISTANCE_CHECK_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_MELEE_RANGE: f32 = 2.9;
    pub const DEFAULT_RANGED_RANGE: f32 = 20.0;
    pub const DEFAULT_DIRECT_MOVE_THRESHOLD: f32 = 5.0;

    /// Engagement range for `role`.
    pub fn engagement_range(&self, role: ClassRole) -> f32 {
        if role.is_ranged() {
            self.ranged_range
        } else {
            self.melee_range
        }
    }

    /// Whether an error notification should interrupt the active task.
    pub fn is_interrupt_message(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.interrupt_phrases
            .iter()
            .any(|phrase| message.contains(&phrase.to_lowercase()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            move_timeout: Self::DEFAULT_MOVE_TIMEOUT,
            move_retry_limit: 2,
            distance_check_interval: Self::DEFAULT_DISTANCE_CHECK_INTERVAL,
            melee_range: Self::DEFAULT_MELEE_RANGE,
            ranged_range: Self::DEFAULT_RANGED_RANGE,
            direct_move_threshold: Self::DEFAULT_DIRECT_MOVE_THRESHOLD,
            interaction_retry_limit: 3,
            interaction_retry_delay: Duration::from_secs(3),
            action_timeout: Duration::from_secs(5),
            recovery_delay: Duration::from_secs(1),
            interact_search_radius: 20.0,
            interrupt_phrases: vec![
                "action was interrupted".to_owned(),
                "action failed".to_owned(),
                "event canceled".to_owned(),
            ],
            event_buffer_size: 100,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            move_timeout = 2500
            ranged_range = 25.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.move_timeout, Duration::from_millis(2500));
        assert_eq!(config.ranged_range, 25.0);
        assert_eq!(config.melee_range, EngineConfig::DEFAULT_MELEE_RANGE);
        assert_eq!(
            config.distance_check_interval,
            EngineConfig::DEFAULT_DISTANCE_CHECK_INTERVAL
        );
    }

    #[test]
    fn casters_and_healers_engage_from_range() {
        let config = EngineConfig::default();
        assert_eq!(config.engagement_range(ClassRole::Caster), 20.0);
        assert_eq!(config.engagement_range(ClassRole::Healer), 20.0);
        assert_eq!(config.engagement_range(ClassRole::Tank), 2.9);
    }

    #[test]
    fn interrupt_phrases_match_case_insensitively() {
        let config = EngineConfig::default();
        assert!(config.is_interrupt_message("The Event Canceled."));
        assert!(!config.is_interrupt_message("You obtain a potion."));
    }

    #[test]
    fn durations_serialize_as_millis() {
        let json = serde_json::to_value(EngineConfig::default()).expect("serializable");
        assert_eq!(json["move_timeout"], 10_000);
        assert_eq!(json["recovery_delay"], 1_000);
    }
}
