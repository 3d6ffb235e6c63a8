//! Driver configuration structures and loaders.
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use quest_runtime::EngineConfig;

/// Settings for one headless run.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub scenario: Option<PathBuf>,
    pub tick: Duration,
    pub max_ticks: u64,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub engine_config: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            tick: Self::DEFAULT_TICK,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            session_id: None,
            log_dir: None,
            engine_config: None,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_TICK: Duration = Duration::from_millis(100);
    pub const DEFAULT_MAX_TICKS: u64 = 36_000;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `QUEST_SCENARIO` - Scenario file to run
    /// - `QUEST_TICK_MS` - Frame length in milliseconds (default: 100)
    /// - `QUEST_MAX_TICKS` - Give up after this many frames (default: 36000)
    /// - `QUEST_SESSION_ID` - Session identifier for log files (default: timestamp)
    /// - `QUEST_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `QUEST_ENGINE_CONFIG` - TOML file overriding engine tunables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.scenario = env::var("QUEST_SCENARIO").ok().map(PathBuf::from);

        if let Some(millis) = read_env::<u64>("QUEST_TICK_MS") {
            config.tick = Duration::from_millis(millis.max(1));
        }

        if let Some(max_ticks) = read_env::<u64>("QUEST_MAX_TICKS") {
            config.max_ticks = max_ticks.max(1);
        }

        config.session_id = env::var("QUEST_SESSION_ID").ok();
        config.log_dir = env::var("QUEST_LOG_DIR").ok().map(PathBuf::from);
        config.engine_config = env::var("QUEST_ENGINE_CONFIG").ok().map(PathBuf::from);

        config
    }

    /// Engine tunables from the configured TOML file, or the defaults.
    pub fn load_engine_config(&self) -> Result<EngineConfig> {
        match &self.engine_config {
            Some(path) => load_engine_config(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read engine config: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse engine config TOML at {}", path.display()))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn engine_config_file_overrides_only_listed_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "move_retry_limit = 5\nmelee_range = 3.5").expect("write config");

        let config = load_engine_config(file.path()).expect("config should parse");
        assert_eq!(config.move_retry_limit, 5);
        assert_eq!(config.melee_range, 3.5);
        assert_eq!(config.ranged_range, EngineConfig::default().ranged_range);
    }

    #[test]
    fn missing_engine_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = load_engine_config(&dir.path().join("absent.toml"))
            .expect_err("missing file must fail");
        assert!(error.to_string().contains("Failed to read engine config"));
    }
}
