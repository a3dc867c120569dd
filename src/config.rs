use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;

use crate::AuroraError;

const APP_DIR_NAME: &str = "aurora-watch";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_SERVICE_BASE_URL: &str = "https://services.swpc.noaa.gov";
pub const DEFAULT_FRAME_SIZE: [u32; 2] = [400, 400];
pub const DEFAULT_FRAME_DELAY_MS: u64 = 100;
pub const DEFAULT_TICK_MS: u64 = 115;
pub const DEFAULT_CHECK_INTERVAL_S: u64 = 30;

/// One independent data feed: where its frames come from, where they are
/// stored, and where the finished animation is published for the viewer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    pub name: String,
    pub display_title: String,
    pub source_index_url: String,
    pub frame_directory: PathBuf,
    pub artifact_output_directory: PathBuf,
    pub published_directory: PathBuf,
    pub artifact_file_name: String,
}

impl ChannelConfig {
    /// Builds a channel whose directories all live under `root/<name>`.
    pub fn under_root(
        root: &Path,
        name: &str,
        display_title: &str,
        source_index_url: &str,
    ) -> Self {
        let channel_root = root.join(name);
        Self {
            name: name.to_string(),
            display_title: display_title.to_string(),
            source_index_url: source_index_url.to_string(),
            frame_directory: channel_root.join("frames"),
            artifact_output_directory: channel_root.join("gif_gen"),
            published_directory: channel_root.join("gif_display"),
            artifact_file_name: format!("aurora_{}.gif", name),
        }
    }

    pub fn north(root: &Path) -> Self {
        Self::under_root(
            root,
            "north",
            "Aurora Borealis (Northern Hemisphere)",
            "https://services.swpc.noaa.gov/products/animations/ovation_north_24h.json",
        )
    }

    pub fn south(root: &Path) -> Self {
        Self::under_root(
            root,
            "south",
            "Aurora Australis (Southern Hemisphere)",
            "https://services.swpc.noaa.gov/products/animations/ovation_south_24h.json",
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub service_base_url: String,
    pub channels: Vec<ChannelConfig>,
    pub frame_size: [u32; 2],
    pub frame_delay_ms: u64,
    pub tick_ms: u64,
    pub check_interval_s: u64,
    pub signal_file: Option<PathBuf>,
    pub fullscreen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_root = default_data_root();
        Self {
            service_base_url: DEFAULT_SERVICE_BASE_URL.to_string(),
            channels: vec![ChannelConfig::north(&data_root), ChannelConfig::south(&data_root)],
            frame_size: DEFAULT_FRAME_SIZE,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            tick_ms: DEFAULT_TICK_MS,
            check_interval_s: DEFAULT_CHECK_INTERVAL_S,
            signal_file: None,
            fullscreen: true,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, AuroraError> {
        Ok(dirs::config_dir()
            .ok_or(AuroraError::NoConfigDir)?
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Loads the config from `path`, or from the user config directory when no
    /// path is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AuroraError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            info!(
                "No config file at {:?}, using default configuration",
                config_path
            );
            return Ok(Self::default());
        }

        let file = File::open(&config_path).map_err(|e| AuroraError::ConfigIOError {
            path: config_path.display().to_string(),
            source: e,
        })?;
        serde_json::from_reader(file).map_err(|e| AuroraError::ConfigSerializeError {
            path: config_path.display().to_string(),
            source: e,
        })
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), AuroraError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuroraError::ConfigIOError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let file = File::create(config_path).map_err(|e| AuroraError::ConfigIOError {
            path: config_path.display().to_string(),
            source: e,
        })?;
        serde_json::to_writer_pretty(file, self).map_err(|e| AuroraError::ConfigSerializeError {
            path: config_path.display().to_string(),
            source: e,
        })
    }

    pub fn channel(&self, name: &str) -> Result<&ChannelConfig, AuroraError> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AuroraError::UnknownChannel {
                name: name.to_string(),
            })
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_s)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(Some(&temp_dir.path().join("nope.json"))).unwrap();
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.frame_size, [400, 400]);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = AppConfig::default();
        config.check_interval_s = 5;
        config.signal_file = Some(temp_dir.path().join("cycle.marker"));
        config.channels = vec![ChannelConfig::north(temp_dir.path())];
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"tick_ms": 50}"#).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.tick_ms, 50);
        assert_eq!(loaded.check_interval_s, DEFAULT_CHECK_INTERVAL_S);
        assert_eq!(loaded.channels.len(), 2);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        match AppConfig::load(Some(&path)) {
            Err(AuroraError::ConfigSerializeError { .. }) => {}
            other => panic!("Expected ConfigSerializeError, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_lookup() {
        let config = AppConfig::default();
        assert_eq!(config.channel("south").unwrap().name, "south");
        assert!(matches!(
            config.channel("east"),
            Err(AuroraError::UnknownChannel { .. })
        ));
    }

    #[test]
    fn test_channel_directories_are_distinct() {
        let root = PathBuf::from("/data");
        let north = ChannelConfig::north(&root);
        assert_eq!(north.frame_directory, root.join("north").join("frames"));
        assert_ne!(north.artifact_output_directory, north.published_directory);
        assert_eq!(north.artifact_file_name, "aurora_north.gif");
    }
}
