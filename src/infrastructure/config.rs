use std::env;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::domain::config::{AppConfig, DEFAULT_BASE_URL};
use crate::domain::errors::ApiError;
use crate::infrastructure::api_client::ApiClient;

const APP_NAME: &str = "worktime";

pub fn load_config() -> AppConfig {
    match confy::load(APP_NAME, "config") {
        Ok(cfg) => {
            info!("config loaded");
            cfg
        }
        Err(e) => {
            warn!(error = %e, "could not load config, using defaults");
            AppConfig::default()
        }
    }
}

pub fn save_config(cfg: &AppConfig) -> Result<()> {
    confy::store(APP_NAME, "config", cfg).context("Failed to save configuration")
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.replace('"', "").trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Saved token, or `WORKTIME_TOKEN` when none is saved.
pub fn effective_token(config: &AppConfig) -> String {
    if !config.api_token.trim().is_empty() {
        config.api_token.trim().to_string()
    } else {
        env_value("WORKTIME_TOKEN").unwrap_or_default()
    }
}

/// Saved base URL unless it is still the default, then `WORKTIME_BASE_URL`.
pub fn effective_base_url(config: &AppConfig) -> String {
    let saved = config.base_url.trim();
    let url = if !saved.is_empty() && saved != DEFAULT_BASE_URL {
        saved.to_string()
    } else {
        env_value("WORKTIME_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    };
    url.trim_end_matches('/').to_string()
}

pub fn build_client(config: &AppConfig) -> Result<ApiClient, ApiError> {
    ApiClient::new(effective_base_url(config), effective_token(config))
}
