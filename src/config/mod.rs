//! Configuration module for the ordering backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! The remote service is optional: without both URL and key the backend runs offline.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::remote::RemoteConfig;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted database service
    pub remote_url: Option<String>,
    /// Access key for the hosted database service
    pub remote_key: Option<String>,
    /// Object-storage bucket for menu images
    pub image_bucket: String,
    /// Path to the SQLite file backing local storage
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Admin password; admin login is refused when unset
    pub admin_password: Option<String>,
}

/// Read a variable, treating an empty value as unset.
fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let remote_url = non_empty("WARUNG_REMOTE_URL");
        let remote_key = non_empty("WARUNG_REMOTE_KEY");

        let image_bucket =
            non_empty("WARUNG_IMAGE_BUCKET").unwrap_or_else(|| "menu-images".to_string());

        let db_path = non_empty("WARUNG_DB_PATH")
            .unwrap_or_else(|| "./data/local.sqlite".to_string())
            .into();

        let bind_addr = non_empty("WARUNG_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid WARUNG_BIND_ADDR format");

        let log_level = non_empty("WARUNG_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let admin_password = non_empty("WARUNG_ADMIN_PASSWORD");

        Self {
            remote_url,
            remote_key,
            image_bucket,
            db_path,
            bind_addr,
            log_level,
            admin_password,
        }
    }

    /// Remote settings, present only when both endpoint and key are configured.
    pub fn remote(&self) -> Option<RemoteConfig> {
        match (&self.remote_url, &self.remote_key) {
            (Some(url), Some(key)) => Some(RemoteConfig {
                url: url.clone(),
                key: key.clone(),
                image_bucket: self.image_bucket.clone(),
            }),
            _ => None,
        }
    }
}
