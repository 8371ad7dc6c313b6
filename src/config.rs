use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api_connection::endpoints::{OPENROUTER_BASE_URL, OPENROUTER_MODELS};

// Name of the environment variable holding the API key, not the key itself.
pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

const MODEL_ENV_VAR: &str = "MEAL_PLANNER_MODEL";
const BASE_URL_ENV_VAR: &str = "OPENROUTER_BASE_URL";
const DATA_DIR_ENV_VAR: &str = "MEAL_PLANNER_DATA_DIR";
const TIMEOUT_ENV_VAR: &str = "MEAL_PLANNER_TIMEOUT_SECS";

const DEFAULT_DATA_DIR: &str = ".meal_planner";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key_env_var: String,
    pub model: String,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            model: OPENROUTER_MODELS[0].model_name.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by whatever is set in the environment (after `.env`).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(model) = lookup(MODEL_ENV_VAR) {
            cfg.model = model;
        }
        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            cfg.base_url = base_url;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV_VAR) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV_VAR).and_then(|raw| raw.parse::<u64>().ok()) {
            cfg.timeout = Duration::from_secs(secs);
        }
        cfg
    }
}
