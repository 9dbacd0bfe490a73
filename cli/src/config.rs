use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Values supplied on the command line (or their environment fallbacks).
#[derive(Debug, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub model: String,
    pub base_url: String,
    api_key: Option<String>,
}

/// Everything the generation client needs to reach the service.
#[derive(Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    pub fn load(overrides: Overrides) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "cookbook").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let api_key = std::env::var(API_KEY_ENV).ok();
        Ok(Self::from_parts(data_dir, overrides, api_key))
    }

    fn from_parts(data_dir: PathBuf, overrides: Overrides, api_key: Option<String>) -> Self {
        let db_path = overrides
            .db_path
            .unwrap_or_else(|| data_dir.join("recipes.db"));
        let model = overrides
            .model
            .unwrap_or_else(|| cookbook_core::generate::DEFAULT_MODEL.to_string());
        let base_url = overrides
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Config {
            db_path,
            data_dir,
            model,
            base_url,
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        }
    }

    /// Settings for the generation client. Fails when the credential is missing.
    pub fn generation_settings(&self) -> Result<GenerationSettings> {
        let api_key = self
            .api_key
            .clone()
            .with_context(|| format!("{API_KEY_ENV} is not set (export it or add it to .env)"))?;
        Ok(GenerationSettings {
            api_key,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        })
    }
}
