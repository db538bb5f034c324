//! Configuration management for mitsumori
//!
//! Config stored at: ~/.config/mitsumori/config.json

use std::path::PathBuf;

use mitsumori_types::{ConfigError, OutputFormat, Result};
use mitsumori_vision::{CommandBackend, InferenceConfig, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Command line of the inference bridge (e.g. "node gemini-bridge.js")
    #[serde(default)]
    pub backend_command: Option<String>,

    /// Image generation model override
    #[serde(default)]
    pub image_model: Option<String>,

    /// Text/chat model override
    #[serde(default)]
    pub chat_model: Option<String>,

    /// Store directory override
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Sampling temperature passed to the model
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_command: None,
            image_model: None,
            chat_model: None,
            store_dir: None,
            output_format: default_output_format(),
            temperature: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("mitsumori");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the store directory path
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let store_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("mitsumori");
        Ok(store_dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Model selection for inference calls
    pub fn inference_config(&self) -> InferenceConfig {
        let mut inference = InferenceConfig::default()
            .with_image_model(self.image_model.clone())
            .with_temperature(self.temperature);
        if let Some(ref model) = self.chat_model {
            inference.chat_model = model.clone();
        }
        inference
    }

    /// Backend built from `backend_command`
    pub fn backend(&self) -> Result<CommandBackend> {
        let command = self
            .backend_command
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("backend_command".to_string()))?;
        CommandBackend::new(command)
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mitsumori Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Backend command: {}",
            self.backend_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(
            f,
            "Image model:     {}",
            self.image_model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
        )?;
        writeln!(
            f,
            "Chat model:      {}",
            self.chat_model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL)
        )?;
        match self.temperature {
            Some(t) => writeln!(f, "Temperature:     {}", t)?,
            None => writeln!(f, "Temperature:     (model default)")?,
        }
        writeln!(
            f,
            "Store dir:       {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:   {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}
