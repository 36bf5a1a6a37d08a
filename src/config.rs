//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;

const APP_DIR: &str = "portal_catalog";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    // Quiet interval of the search boxes
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_user_agent() -> String { format!("portal_catalog/{}", env!("CARGO_PKG_VERSION")) }
fn default_timeout() -> u64 { 30 }
fn default_debounce() -> u64 { 500 }
fn default_font_size() -> u32 { 14 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
            debounce_ms: default_debounce(),
            dark_mode: true,
            font_size: default_font_size(),
        }
    }
}

/// `<config dir>/portal_catalog`, created on demand
pub fn app_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    fs::create_dir_all(&path).ok();
    path
}

/// Where the favorites blobs live
pub fn storage_path() -> PathBuf {
    app_dir().join("storage.json")
}

impl AppConfig {
    fn config_path() -> PathBuf {
        app_dir().join("config.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Defaults when the file is missing or does not parse
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Ignoring unreadable config {}: {}", path.display(), e),
                }
            }
        }

        Self::default()
    }

    pub fn save(&self) {
        self.save_to(&Self::config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Ok(content) = serde_json::to_string_pretty(self) {
            if let Err(e) = fs::write(path, content) {
                log::warn!("Could not save config to {}: {}", path.display(), e);
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
