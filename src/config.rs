use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dictation::{DictationPolicy, RetryPolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub dictation: DictationConfig,
    pub speech: SpeechConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    Attempts,
    Immediate,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DictationConfig {
    pub retry: RetryMode,
    pub attempts_per_word: u32,
    /// 0 disables the cap
    pub daily_unit_cap: usize,
    pub initial_assessment: bool,
    pub words_per_unit: usize,
    #[serde(default)]
    pub catalog_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    pub enabled: bool,
    #[serde(default)]
    pub command: Option<String>,
    pub voice: String,
    pub rate: u32,
    #[serde(default)]
    pub sounds_dir: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_path: String,
}

const DEFAULT_CONFIG: &str = r#"[store]
path = "~/.braille-trainer/students_db.json"

[dictation]
retry = "attempts"
attempts_per_word = 3
daily_unit_cap = 2
initial_assessment = true
words_per_unit = 10
# catalog_path = "~/.braille-trainer/curriculum.json"

[speech]
enabled = true
# command = "espeak-ng"
voice = "ru"
rate = 150
# sounds_dir = "~/.braille-trainer/sounds/letters"
# player = "paplay"

[telemetry]
enabled = true
log_path = "~/.braille-trainer/trainer.log"
"#;

impl Config {
    /// Load config from ~/.braille-trainer.toml
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`, writing the defaults there first if it's missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            Self::create_default(config_path)
                .context("failed to create default config")?;
        }

        let contents = fs::read_to_string(config_path)
            .context("failed to read config file")?;

        Self::parse(&contents)
    }

    /// Parse and validate TOML config text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .context("failed to parse config TOML")?;

        if config.dictation.words_per_unit == 0 {
            return Err(anyhow!("dictation.words_per_unit must be > 0"));
        }
        if config.dictation.retry == RetryMode::Attempts && config.dictation.attempts_per_word == 0 {
            return Err(anyhow!("dictation.attempts_per_word must be > 0"));
        }

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".braille-trainer.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create config directory")?;
            }
        }
        fs::write(path, DEFAULT_CONFIG)
            .context("failed to write default config")?;
        Ok(())
    }

    /// Dictation policy described by the `[dictation]` section
    pub fn dictation_policy(&self) -> DictationPolicy {
        let d = &self.dictation;
        DictationPolicy {
            retry: match d.retry {
                RetryMode::Attempts => RetryPolicy::Attempts(d.attempts_per_word),
                RetryMode::Immediate => RetryPolicy::Immediate,
            },
            daily_unit_cap: (d.daily_unit_cap > 0).then_some(d.daily_unit_cap),
            initial_assessment: d.initial_assessment,
            words_per_unit: d.words_per_unit,
        }
    }

    /// Expand ~ in paths to home directory
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME")
                .context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.dictation.retry, RetryMode::Attempts);
        assert!(config.speech.command.is_none());
        assert!(config.dictation.catalog_path.is_none());
        assert_eq!(config.dictation_policy(), DictationPolicy::default());
    }

    #[test]
    fn test_immediate_and_unlimited() {
        let text = DEFAULT_CONFIG
            .replace("retry = \"attempts\"", "retry = \"immediate\"")
            .replace("daily_unit_cap = 2", "daily_unit_cap = 0");
        let policy = Config::parse(&text).unwrap().dictation_policy();
        assert_eq!(policy.retry, RetryPolicy::Immediate);
        assert_eq!(policy.daily_unit_cap, None);
    }

    #[test]
    fn test_rejects_unknown_retry_mode() {
        let text = DEFAULT_CONFIG.replace("retry = \"attempts\"", "retry = \"sometimes\"");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_rejects_zero_words_per_unit() {
        let text = DEFAULT_CONFIG.replace("words_per_unit = 10", "words_per_unit = 0");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let text = DEFAULT_CONFIG.replace("attempts_per_word = 3", "attempts_per_word = 0");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_load_from_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("trainer.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.store.path, "~/.braille-trainer/students_db.json");
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(
            Config::expand_path("/var/lib/db.json").unwrap(),
            PathBuf::from("/var/lib/db.json")
        );
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let home = std::env::var("HOME").expect("HOME not set");
        assert_eq!(
            Config::expand_path("~/x/db.json").unwrap(),
            PathBuf::from(home).join("x/db.json")
        );
    }
}
