// ============================
// goaltrack-backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::token::DEFAULT_TTL_SECS;

/// Application settings. Read-only after process start.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory for the flat-file store
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Token signing secret. Required: the process refuses to start
    /// without one.
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub jwt_expires_in: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            jwt_secret: String::new(),
            jwt_expires_in: DEFAULT_TTL_SECS,
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` plus the environment.
    ///
    /// `GOALTRACK_*` variables override file values; the bare
    /// `JWT_SECRET` / `JWT_EXPIRES_IN` names are recognized as well.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("GOALTRACK_"))
            .merge(Env::raw().only(&["JWT_SECRET", "JWT_EXPIRES_IN"]))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            bail!("JWT_SECRET is required");
        }
        if self.jwt_expires_in == 0 {
            bail!("jwt_expires_in must be greater than zero");
        }
        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            bail!("log_level must be one of trace, debug, info, warn, error");
        }
        Ok(())
    }
}
