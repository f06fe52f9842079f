// src/config.rs
use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};

pub const ENV_CONFIG_PATH: &str = "PREDICTOR_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/predictor.json";

fn default_lang() -> String {
    "en".to_string()
}
fn default_region() -> String {
    "US".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./data.json")
}

/// Runtime configuration. The Gemini API key deliberately stays out of this
/// file; it is read from `GEMINI_API_KEY` when the client is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// News search locale, fixed per deployment (`hl` query parameter).
    #[serde(default = "default_lang")]
    pub lang: String,
    /// News search region (`gl` query parameter, also feeds `ceid`).
    #[serde(default = "default_region")]
    pub region: String,
    /// Generation model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Intermediate store shared by collector and predictor.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            region: default_region(),
            model: default_model(),
            store_path: default_store_path(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: AppConfig = serde_json::from_str(&data)?;
        Ok(cfg)
    }

    /// Load using `$PREDICTOR_CONFIG_PATH`, then `config/predictor.json`,
    /// then built-in defaults. Reading/parsing failures fall back to defaults.
    pub fn load_default() -> Self {
        let path = env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_file(&path).unwrap_or_default()
    }

    /// Google News `ceid` value, e.g. "US:en".
    pub fn ceid(&self) -> String {
        format!("{}:{}", self.region, self.lang)
    }
}
