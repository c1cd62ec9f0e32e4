use std::str::FromStr;

use ratatui_themes::{ThemeName, ThemePalette};

use crate::domain::config::AppConfig;

pub const THEME_CATALOG: &[&str] = &[
    "tokyo-night",
    "dracula",
    "one-dark-pro",
    "nord",
    "catppuccin-mocha",
    "catppuccin-latte",
    "gruvbox-dark",
    "gruvbox-light",
    "solarized-dark",
    "solarized-light",
    "rose-pine",
    "kanagawa",
    "everforest",
];

pub fn palette_from_config(config: &AppConfig) -> ThemePalette {
    resolve_theme_name(&config.theme).palette()
}

pub fn palette_with_override(config: &AppConfig, override_theme: Option<&str>) -> ThemePalette {
    resolve_theme_name(override_theme.unwrap_or(&config.theme)).palette()
}

pub fn resolve_theme_name(raw: &str) -> ThemeName {
    let key = match raw.trim().to_ascii_lowercase().as_str() {
        "" | "default" | "tokyo" => "tokyo-night".to_string(),
        "catppuccin" | "mocha" => "catppuccin-mocha".to_string(),
        "latte" => "catppuccin-latte".to_string(),
        "gruvbox" => "gruvbox-dark".to_string(),
        "solarized" => "solarized-dark".to_string(),
        other => other.to_string(),
    };
    ThemeName::from_str(&key).unwrap_or(ThemeName::TokyoNight)
}
