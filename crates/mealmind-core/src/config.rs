use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};

/// Environment variables checked for the Gemini credential, in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub base_url: String,
    /// Fetch the dish picture as soon as a recipe opens.
    pub auto_generate_images: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auto_generate_images: false,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Credential from the environment first, then the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = Self::key_from_env(|var| std::env::var(var).ok());
        Self::pick_api_key(from_env, self.api_key.clone())
    }

    /// First non-blank value among [`API_KEY_VARS`].
    fn key_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|&var| lookup(var))
            .find(|key| !key.trim().is_empty())
    }

    fn pick_api_key(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
        from_env
            .into_iter()
            .chain(from_file)
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mealmind"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
