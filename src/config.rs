use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::review::CounterStore;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
/// Persisted UI/application settings for Instafilter.
pub struct AppConfig {
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub browse_path: Option<PathBuf>,
    pub share_path: Option<PathBuf>,
    pub share_format: Option<String>,
    pub preview_max: Option<u32>,
    /// How many times a filter has been picked, across runs.
    pub filter_count: Option<u32>,
}

impl AppConfig {
    /// Returns the user config file path, if a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("instafilter").join("config.toml"))
    }

    /// Loads config from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring unreadable config");
            Self::default()
        })
    }

    /// Writes config to disk, ignoring filesystem/serialization errors.
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(s) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, s);
        }
    }
}

impl CounterStore for AppConfig {
    fn load(&self) -> u32 {
        self.filter_count.unwrap_or(0)
    }

    fn store(&mut self, value: u32) {
        self.filter_count = Some(value);
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::AppConfig;
    use crate::review::CounterStore;

    #[test]
    fn round_trips_through_toml() {
        let config = AppConfig {
            window_width: Some(1024.0),
            window_height: Some(768.0),
            browse_path: Some(PathBuf::from("/photos")),
            share_path: None,
            share_format: Some("png".to_string()),
            preview_max: Some(1280),
            filter_count: Some(7),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(AppConfig::parse(&text), config);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(AppConfig::parse("window_width = [oops"), AppConfig::default());
    }

    #[test]
    fn missing_counter_reads_as_zero() {
        let config = AppConfig::parse("window_width = 800.0\n");
        assert_eq!(CounterStore::load(&config), 0);
    }

    #[test]
    fn config_path_lives_under_app_folder() {
        if let Some(path) = AppConfig::config_path() {
            assert!(path.ends_with("instafilter/config.toml"));
        }
    }
}
