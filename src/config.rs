use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub base_url: Option<String>,
    pub open_on_start: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: None,
            open_on_start: None,
        }
    }

    /// Load the config, writing the defaults out on first run so users
    /// have a file to edit.
    pub fn load_or_init() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_or_init_from(&config_path)
    }

    pub fn load_or_init_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::new();
            config.save_to(config_path)?;
            return Ok(config);
        }
        Self::load_from(config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("http://localhost:5000")
    }

    pub fn open_on_start(&self) -> bool {
        self.open_on_start.unwrap_or(false)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chatpane").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.base_url(), "http://localhost:5000");
        assert!(!config.open_on_start());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            base_url: Some("http://127.0.0.1:8080".to_string()),
            open_on_start: Some(true),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url(), "http://127.0.0.1:8080");
        assert!(loaded.open_on_start());
    }

    #[test]
    fn load_or_init_persists_defaults_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatpane").join("config.json");

        let config = Config::load_or_init_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.base_url(), "http://localhost:5000");

        // Second run reads the file it wrote instead of rewriting it
        let reloaded = Config::load_or_init_from(&path).unwrap();
        assert_eq!(reloaded.base_url(), config.base_url());
        assert_eq!(reloaded.open_on_start(), config.open_on_start());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
