use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    // The session's own user. `--user-id` on the command line takes precedence.
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_base_url(),
            user_id: None,
            theme: default_theme(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_theme() -> String {
    "tokyo-night".to_string()
}
