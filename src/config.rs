use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::log;

// ----------------------------------------------
// EditorConfig
// ----------------------------------------------

pub const CONFIG_FILE_NAME: &str = "scenario_edit.json";

const CONFIG_LOG_CHANNEL: log::Channel = log::channel!("config");

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    // Root directory holding the `sprites/` archives.
    pub data_dir: PathBuf,

    pub log_level: String,
    pub log_tty_colors: bool,
    pub log_src_location: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("assets"),
            log_level: "verbose".to_string(),
            log_tty_colors: true,
            log_src_location: false,
        }
    }
}

impl EditorConfig {
    // Either succeeds loading the config file or returns the default config.
    pub fn load_file(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::error!(CONFIG_LOG_CHANNEL,
                            "Failed to read config file {path:?}: {err}");
                return Self::default();
            },
        };

        match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(err) => {
                log::error!(CONFIG_LOG_CHANNEL,
                            "Failed to deserialize config file {path:?}: {err}");
                Self::default()
            },
        }
    }

    // Saves current configs to file.
    pub fn save_file(&self, path: &Path) -> bool {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                log::error!(CONFIG_LOG_CHANNEL,
                            "Failed to serialize config: {err}");
                return false;
            },
        };

        if let Some(parent) = path.parent() {
            // Ignore any errors since this might fail if any
            // element of the path already exists.
            let _ = fs::create_dir_all(parent);
        }

        if let Err(err) = fs::write(path, json) {
            log::error!(CONFIG_LOG_CHANNEL,
                        "Failed to write config file {path:?}: {err}");
            return false;
        }

        true
    }

    pub fn apply_log_settings(&self) {
        if let Some(level) = log::Level::parse(&self.log_level) {
            log::set_level(level);
        } else {
            log::warn!(CONFIG_LOG_CHANNEL,
                       "Unknown log level \"{}\", keeping current", self.log_level);
        }

        log::enable_tty_colors(self.log_tty_colors);
        log::enable_source_location(self.log_src_location);
    }
}

// ----------------------------------------------
// Tests
// ----------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("scenario_edit_test_{}_{tag}", std::process::id()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = EditorConfig::load_file(Path::new("/nonexistent/scenario_edit.json"));
        assert_eq!(config.data_dir, PathBuf::from("assets"));
        assert_eq!(config.log_level, "verbose");
    }

    #[test]
    fn save_then_load_roundtrip() {
        let path = temp_config_path("config_roundtrip");

        let mut config = EditorConfig::default();
        config.data_dir = PathBuf::from("/opt/game/data");
        config.log_level = "warn".to_string();
        config.log_tty_colors = false;

        assert!(config.save_file(&path));

        let loaded = EditorConfig::load_file(&path);
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.log_level, "warn");
        assert!(!loaded.log_tty_colors);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_config_path("config_partial");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "log_level": "error" }"#).unwrap();

        let config = EditorConfig::load_file(&path);
        assert_eq!(config.log_level, "error");
        assert_eq!(config.data_dir, PathBuf::from("assets"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
