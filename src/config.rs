//! Sync configuration: credentials, env file, and runtime settings.
//!
//! Credentials are read from the process environment first, then from the env
//! file (`.env.local` by default). The env file is also where a freshly
//! obtained refresh token is stored.

use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ActivityMapError, Result};
use crate::geo_utils::Bounds;
use crate::strava::auth::DEFAULT_OAUTH_BASE;
use crate::strava::client::DEFAULT_API_BASE;

pub const CLIENT_ID_KEY: &str = "VITE_STRAVA_CLIENT_ID";
pub const CLIENT_SECRET_KEY: &str = "VITE_STRAVA_CLIENT_SECRET";
pub const REFRESH_TOKEN_KEY: &str = "STRAVA_REFRESH_TOKEN";

pub const DEFAULT_ENV_FILE: &str = ".env.local";
pub const DEFAULT_OUTPUT: &str = "src/data/strava-activities.json";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 1;
pub const DEFAULT_PAUSE_MS: u64 = 300;
pub const DEFAULT_PHOTO_SIZE: u32 = 1000;

// ============================================================================
// Env file
// ============================================================================

/// Ordered `KEY=VALUE` file.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Load the file. A missing or unreadable file yields an empty set.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut entries: Vec<(String, String)> = Vec::new();

        // Values are kept verbatim, with no quote stripping or `$VAR` expansion
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("[EnvFile] {} not loaded: {}", path.display(), e);
                String::new()
            }
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                debug!("[EnvFile] Skipping line without '=' in {}", path.display());
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => entries.push((key.to_string(), value.to_string())),
            }
        }

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Update a key in place, or append it.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn save(&self) -> Result<()> {
        let content = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&self.path, content).map_err(|e| ActivityMapError::io(&self.path, e))
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Strava OAuth application credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// Resolve credentials from the process environment, then the env file.
    pub fn resolve(env_file: &EnvFile) -> Result<Self> {
        Self::resolve_with(env_file, |key| env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with<F>(env_file: &EnvFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env_file.get(key).map(str::to_string))
        };

        match (get(CLIENT_ID_KEY), get(CLIENT_SECRET_KEY)) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id,
                client_secret,
                refresh_token: get(REFRESH_TOKEN_KEY),
            }),
            _ => Err(ActivityMapError::config(format!(
                "{} and {} must be in {}",
                CLIENT_ID_KEY,
                CLIENT_SECRET_KEY,
                env_file.path().display()
            ))),
        }
    }
}

// ============================================================================
// Sync settings
// ============================================================================

/// Settings for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub output: PathBuf,
    /// Activities whose first point falls outside are dropped
    pub bounds: Bounds,
    pub per_page: u32,
    pub max_pages: u32,
    /// Minimum spacing between API request starts
    pub pause: Duration,
    pub photo_size: u32,
    pub api_base: String,
    pub oauth_base: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            bounds: Bounds::AUSTRALIA,
            per_page: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            photo_size: DEFAULT_PHOTO_SIZE,
            api_base: DEFAULT_API_BASE.to_string(),
            oauth_base: DEFAULT_OAUTH_BASE.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 || self.per_page > 200 {
            return Err(ActivityMapError::config(format!(
                "per_page must be between 1 and 200, got {}",
                self.per_page
            )));
        }
        if self.max_pages == 0 {
            return Err(ActivityMapError::config("max_pages must be at least 1"));
        }
        Ok(())
    }
}
