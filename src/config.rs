use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::services::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8501";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub bind_addr: String,
}

impl Config {
    /// Load `.env` (next to the executable first, then the working directory) and read the environment.
    pub fn load() -> Result<Self> {
        if let Some(path) = env_file_next_to_executable() {
            if dotenv::from_path(&path).is_ok() {
                log::debug!("📄 Loaded environment from {}", path.display());
            }
        }
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = read("GEMINI_API_KEY").ok_or_else(|| {
            anyhow::anyhow!(
                "GEMINI_API_KEY is not set. Add it to the .env file next to the ichef binary."
            )
        })?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            model: read("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: read("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr: read("ICHEF_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn env_file_next_to_executable() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    Some(exe.parent()?.join(".env"))
}
