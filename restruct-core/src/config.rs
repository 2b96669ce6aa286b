use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::restructure::{Clock, DEFAULT_TIME_FORMAT, FormatOptions};

/// One named set of formatting choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub clock: Clock,
    #[serde(default = "default_include_time")]
    pub include_time: bool,
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

fn default_include_time() -> bool {
    true
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            clock: Clock::default(),
            include_time: default_include_time(),
        }
    }
}

impl ProfileConfig {
    pub fn to_format_options(&self) -> FormatOptions {
        FormatOptions {
            time_format: self.time_format.clone(),
            clock: self.clock,
            include_time: self.include_time,
            ..FormatOptions::default()
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Example TOML:
    /// [profiles.local]
    /// time_format = "%H:%M"
    /// clock = "local"
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

impl Config {
    pub fn default_profile_name(&self) -> Option<&str> {
        self.default_profile.as_deref()
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.get(name)
    }

    /// Make an existing profile the default.
    pub fn set_default_profile(&mut self, name: &str) -> Result<()> {
        if !self.has_profile(name) {
            return Err(anyhow!(
                "Unknown profile '{name}'.\n\
                 Hint: run `restruct configure {name}` to create it."
            ));
        }
        self.default_profile = Some(name.to_string());
        Ok(())
    }

    /// Set/replace a profile; it becomes the default if there is none yet.
    pub fn upsert_profile(&mut self, name: &str, profile: ProfileConfig) {
        self.profiles.insert(name.to_string(), profile);

        if self.default_profile.is_none() {
            self.default_profile = Some(name.to_string());
        }
    }

    /// Resolve formatting options: the named profile, else the default
    /// profile, else built-in defaults.
    pub fn format_options(&self, name: Option<&str>) -> Result<FormatOptions> {
        let resolved = name.or(self.default_profile_name());
        let options = match resolved {
            Some(name) => self
                .profile(name)
                .ok_or_else(|| {
                    anyhow!(
                        "No profile named '{name}' is configured.\n\
                         Hint: run `restruct configure {name}` first."
                    )
                })?
                .to_format_options(),
            None => FormatOptions::default(),
        };

        options
            .validate()
            .with_context(|| match resolved {
                Some(name) => format!("Profile '{name}' is not usable"),
                None => "Built-in format options are not usable".to_string(),
            })?;

        Ok(options)
    }

    /// Load config from the platform location, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "restruct", "restruct")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_profile() -> ProfileConfig {
        ProfileConfig { clock: Clock::Utc, ..ProfileConfig::default() }
    }

    #[test]
    fn empty_config_uses_builtin_options() {
        let cfg = Config::default();
        let options = cfg.format_options(None).expect("defaults resolve");

        assert_eq!(options, FormatOptions::default());
    }

    #[test]
    fn upsert_sets_default_profile() {
        let mut cfg = Config::default();

        cfg.upsert_profile("utc", utc_profile());

        assert_eq!(cfg.default_profile_name(), Some("utc"));
        assert!(cfg.has_profile("utc"));
        assert_eq!(cfg.format_options(None).expect("resolves").clock, Clock::Utc);
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_profile("utc", utc_profile());
        cfg.upsert_profile("local", ProfileConfig::default());

        assert_eq!(cfg.default_profile_name(), Some("utc"));
        assert!(cfg.has_profile("local"));
    }

    #[test]
    fn set_default_profile_overrides_default() {
        let mut cfg = Config::default();

        cfg.upsert_profile("utc", utc_profile());
        cfg.upsert_profile("local", ProfileConfig::default());
        cfg.set_default_profile("local").expect("profile exists");

        assert_eq!(cfg.default_profile_name(), Some("local"));
        assert_eq!(cfg.format_options(None).expect("resolves").clock, Clock::Local);
    }

    #[test]
    fn set_default_profile_rejects_unknown_name() {
        let mut cfg = Config::default();
        let err = cfg.set_default_profile("nope").unwrap_err();

        assert!(err.to_string().contains("Unknown profile 'nope'"));
        assert_eq!(cfg.default_profile_name(), None);
    }

    #[test]
    fn named_profile_wins_over_default() {
        let mut cfg = Config::default();
        cfg.upsert_profile("local", ProfileConfig::default());
        cfg.upsert_profile("utc", utc_profile());

        let options = cfg.format_options(Some("utc")).expect("resolves");
        assert_eq!(options.clock, Clock::Utc);
    }

    #[test]
    fn missing_named_profile_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.format_options(Some("travel")).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No profile named 'travel'"));
        assert!(msg.contains("Hint: run `restruct configure travel`"));
    }

    #[test]
    fn unusable_time_format_is_rejected() {
        let mut cfg = Config::default();
        cfg.upsert_profile(
            "broken",
            ProfileConfig { time_format: "%Q".to_string(), ..ProfileConfig::default() },
        );

        let err = cfg.format_options(None).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Profile 'broken' is not usable"), "{msg}");
        assert!(msg.contains("Invalid time format '%Q'"), "{msg}");
    }

    #[test]
    fn partial_profile_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            default_profile = "utc"
            [profiles.utc]
            clock = "utc"
            "#,
        )
        .expect("parses");

        let profile = cfg.profile("utc").expect("present");
        assert_eq!(profile.time_format, DEFAULT_TIME_FORMAT);
        assert!(profile.include_time);
        assert_eq!(profile.clock, Clock::Utc);
    }

    #[test]
    fn save_then_load_from_path() {
        let path = std::env::temp_dir()
            .join(format!("restruct-config-{}", std::process::id()))
            .join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_profile(
            "long",
            ProfileConfig {
                time_format: "%Y-%m-%d %H:%M".to_string(),
                clock: Clock::Utc,
                include_time: false,
            },
        );
        cfg.save_to(&path).expect("saves");

        let loaded = Config::load_from(&path).expect("loads");
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }

        assert_eq!(loaded.default_profile_name(), Some("long"));
        assert_eq!(loaded.profile("long"), cfg.profile("long"));
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let path = std::env::temp_dir().join("restruct-config-does-not-exist.toml");
        let cfg = Config::load_from(&path).expect("loads");

        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.default_profile_name(), None);
    }
}
