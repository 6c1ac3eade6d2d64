use crate::models::{Settings, Stats};
use crate::services::collaborators::{SettingsStore, StatsStore};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

pub const SETTINGS_FILE: &str = "settings.yaml";
pub const STATS_FILE: &str = "stats.yaml";

/// Prefix of environment overrides, e.g. `FLASHDOC_FOLDER_PATH=Notes/`.
pub const ENV_PREFIX: &str = "FLASHDOC";

/// Loads and saves the YAML files in the config directory.
///
/// - `settings.yaml`: user preferences, layered under `FLASHDOC_*` environment
///   overrides
/// - `stats.yaml`: usage counters, written after every successful save
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    stats_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for `config_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            stats_path: config_dir.join(STATS_FILE),
            config_dir,
        })
    }

    /// Load settings from `settings.yaml` plus process environment overrides.
    ///
    /// A missing file yields defaults. The result is normalized.
    pub fn load_settings(&self) -> Result<Settings> {
        self.load_settings_with_env(None)
    }

    /// Like [`load_settings`](Self::load_settings), reading overrides from
    /// `env` instead of the process environment when given.
    pub fn load_settings_with_env(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<Settings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("context_menu_formats")
            .source(env);

        let settings: Settings = Config::builder()
            .add_source(File::new(self.settings_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings.normalized())
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load counters from `stats.yaml`, or defaults if it doesn't exist.
    pub fn load_stats(&self) -> Result<Stats> {
        if !self.stats_path.exists() {
            tracing::debug!("Stats file not found at {}, starting fresh", self.stats_path);
            return Ok(Stats::default());
        }

        let file_contents = fs::read_to_string(&self.stats_path)
            .with_context(|| format!("Failed to read stats: {}", self.stats_path))?;

        let stats: Stats = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse stats: {}", self.stats_path))?;

        tracing::debug!("Loaded stats from {}", self.stats_path);
        Ok(stats)
    }

    pub fn save_stats(&self, stats: &Stats) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(stats).context("Failed to serialize stats to YAML")?;

        fs::write(&self.stats_path, yaml_string)
            .with_context(|| format!("Failed to write stats: {}", self.stats_path))?;

        tracing::debug!("Saved stats to {}", self.stats_path);
        Ok(())
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn stats_path(&self) -> &Utf8Path {
        &self.stats_path
    }
}

impl SettingsStore for ConfigManager {
    fn load_settings(&self) -> Result<Settings> {
        ConfigManager::load_settings(self)
    }
}

impl StatsStore for ConfigManager {
    fn load_stats(&self) -> Result<Stats> {
        ConfigManager::load_stats(self)
    }

    fn save_stats(&self, stats: &Stats) -> Result<()> {
        ConfigManager::save_stats(self, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormatTag, NamingPattern};
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = Utf8PathBuf::try_from(temp_dir.path().join("config")).unwrap();
        let manager = ConfigManager::new(&config_dir).unwrap();
        (manager, temp_dir)
    }

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    #[test]
    fn test_create_config_manager() {
        let (manager, _temp) = create_test_config_manager();
        assert!(manager.config_dir().exists());
        assert_eq!(manager.settings_path().file_name(), Some(SETTINGS_FILE));
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let (manager, _temp) = create_test_config_manager();
        let settings = manager.load_settings_with_env(no_env()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_save_settings() {
        let (manager, _temp) = create_test_config_manager();

        let settings = Settings {
            folder_path: "Notes/".to_string(),
            naming_pattern: NamingPattern::Custom,
            custom_pattern: "{type}_{date}".to_string(),
            context_menu_formats: vec![FormatTag::Auto, FormatTag::Md],
            ..Settings::default()
        };
        manager.save_settings(&settings).unwrap();

        let loaded = manager.load_settings_with_env(no_env()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_settings_file() {
        let (manager, _temp) = create_test_config_manager();
        fs::write(manager.settings_path(), "organize_by_type: false\n").unwrap();

        let loaded = manager.load_settings_with_env(no_env()).unwrap();
        assert!(!loaded.organize_by_type);
        assert_eq!(loaded.folder_path, "FlashDocs/");
        assert_eq!(loaded.selection_threshold, 10);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (manager, _temp) = create_test_config_manager();
        fs::write(manager.settings_path(), "folder_path: FromFile/\n").unwrap();

        let mut env = config::Map::new();
        env.insert("FLASHDOC_FOLDER_PATH".to_string(), "FromEnv/".to_string());
        env.insert("FLASHDOC_SELECTION_THRESHOLD".to_string(), "25".to_string());

        let loaded = manager.load_settings_with_env(Some(env)).unwrap();
        assert_eq!(loaded.folder_path, "FromEnv/");
        assert_eq!(loaded.selection_threshold, 25);
    }

    #[test]
    fn test_load_save_stats() {
        let (manager, _temp) = create_test_config_manager();
        assert_eq!(manager.load_stats().unwrap(), Stats::default());

        let mut stats = Stats {
            total_files: 3,
            last_file: "query.sql".to_string(),
            ..Stats::default()
        };
        stats.format_usage.insert("sql".to_string(), 3);
        manager.save_stats(&stats).unwrap();

        assert_eq!(manager.load_stats().unwrap(), stats);
    }

    #[test]
    fn test_corrupt_stats_is_an_error() {
        let (manager, _temp) = create_test_config_manager();
        fs::write(manager.stats_path(), "total_files: [not a number").unwrap();
        assert!(manager.load_stats().is_err());
    }
}
