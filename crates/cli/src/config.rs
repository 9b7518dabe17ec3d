// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration.
//!
//! Configuration is read from `pulse.toml`, located by `--config`, then
//! `PULSE_CONFIG`, then the current directory. Every key is optional; a
//! missing file in the current directory means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::connection::ConnectionConfig;
use crate::env;
use crate::error::{Error, Result};
use crate::fetch::FetchConfig;
use crate::notify::{NotifyConfig, DEFAULT_CRITICAL_KEYWORDS};
use crate::offline::OfflineConfig;

const CONFIG_FILE_NAME: &str = "pulse.toml";
const STATE_DIR_NAME: &str = "pulse";
const FALLBACK_STATE_DIR: &str = ".pulse";
const QUEUE_FILE_NAME: &str = "pending_ops.json";

/// Contents of `pulse.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionSection,
    #[serde(default)]
    pub fetch: FetchSection,
    #[serde(default)]
    pub offline: OfflineSection,
    #[serde(default)]
    pub notifications: NotificationsSection,
}

/// `[connection]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSection {
    /// WebSocket URL (`ws://` or `wss://`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Bearer token sent when connecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 0 disables the heartbeat.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Messages buffered while disconnected. 0 = unbounded.
    #[serde(default = "default_outbound_limit")]
    pub outbound_limit: usize,
}

/// `[fetch]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSection {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_resource")]
    pub resource: String,
}

/// `[offline]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineSection {
    /// Overrides `<state_dir>/pending_ops.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_path: Option<PathBuf>,
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    #[serde(default = "default_attention_threshold")]
    pub attention_threshold: u32,
}

/// `[notifications]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsSection {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_display_ms")]
    pub display_ms: u64,
    #[serde(default = "default_critical_keywords")]
    pub critical_keywords: Vec<String>,
    #[serde(default = "default_sound")]
    pub sound: bool,
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_outbound_limit() -> usize {
    1000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_resource() -> String {
    "logs".to_string()
}

fn default_max_pending() -> usize {
    500
}

fn default_attention_threshold() -> u32 {
    3
}

fn default_history_limit() -> usize {
    50
}

fn default_display_ms() -> u64 {
    5000
}

fn default_critical_keywords() -> Vec<String> {
    DEFAULT_CRITICAL_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_sound() -> bool {
    true
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            base_delay_ms: default_base_delay_ms(),
            max_attempts: default_max_attempts(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            outbound_limit: default_outbound_limit(),
        }
    }
}

impl Default for FetchSection {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), resource: default_resource() }
    }
}

impl Default for OfflineSection {
    fn default() -> Self {
        Self {
            queue_path: None,
            max_pending: default_max_pending(),
            attention_threshold: default_attention_threshold(),
        }
    }
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            display_ms: default_display_ms(),
            critical_keywords: default_critical_keywords(),
            sound: default_sound(),
        }
    }
}

/// Picks the config file to read.
///
/// Returns the path and whether it must exist. An explicit or environment
/// path must; the implicit `./pulse.toml` may be absent.
pub fn locate(explicit: Option<&Path>, from_env: Option<PathBuf>) -> (PathBuf, bool) {
    match (explicit, from_env) {
        (Some(path), _) => (path.to_path_buf(), true),
        (None, Some(path)) => (path, true),
        (None, None) => (PathBuf::from(CONFIG_FILE_NAME), false),
    }
}

impl Config {
    /// Parses a config document.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reads a config file. An optional file that does not exist yields defaults.
    pub fn read(path: &Path, required: bool) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Loads the effective configuration, environment overrides included.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = locate(explicit, env::config_path());
        let config = Self::read(&path, required)?;
        Ok(config.with_overrides(env::endpoint(), env::token()))
    }

    /// Replaces the endpoint and token when a value is given.
    pub fn with_overrides(mut self, endpoint: Option<String>, token: Option<String>) -> Self {
        if endpoint.is_some() {
            self.connection.endpoint = endpoint;
        }
        if token.is_some() {
            self.connection.token = token;
        }
        self
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEndpoint`] when none is set.
    pub fn endpoint(&self) -> Result<&str> {
        self.connection
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(Error::MissingEndpoint)
    }

    pub fn token(&self) -> Option<&str> {
        self.connection.token.as_deref()
    }

    /// Connection settings. The URL is the endpoint when one is configured.
    pub fn connection_config(&self) -> ConnectionConfig {
        let c = &self.connection;
        let mut config = ConnectionConfig {
            base_delay: Duration::from_millis(c.base_delay_ms),
            max_attempts: c.max_attempts,
            heartbeat_interval: Duration::from_millis(c.heartbeat_interval_ms),
            outbound_limit: c.outbound_limit,
            ..ConnectionConfig::default()
        };
        if let Ok(endpoint) = self.endpoint() {
            config.url = endpoint.to_string();
        }
        config
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            resource: self.fetch.resource.clone(),
            debounce: Duration::from_millis(self.fetch.debounce_ms),
        }
    }

    pub fn offline_config(&self) -> OfflineConfig {
        OfflineConfig {
            max_pending: self.offline.max_pending,
            attention_threshold: self.offline.attention_threshold,
        }
    }

    pub fn notify_config(&self) -> NotifyConfig {
        let n = &self.notifications;
        NotifyConfig {
            history_limit: n.history_limit,
            display: Duration::from_millis(n.display_ms),
            critical_keywords: n.critical_keywords.clone(),
            sound: n.sound,
        }
    }

    /// Where the offline queue is persisted.
    pub fn queue_path(&self) -> PathBuf {
        match &self.offline.queue_path {
            Some(path) => path.clone(),
            None => state_dir().join(QUEUE_FILE_NAME),
        }
    }
}

/// Directory for persisted state.
///
/// `PULSE_STATE_DIR`, else the platform state directory, else `.pulse`.
pub fn state_dir() -> PathBuf {
    resolve_state_dir(env::state_dir(), dirs::state_dir())
}

fn resolve_state_dir(from_env: Option<PathBuf>, platform: Option<PathBuf>) -> PathBuf {
    from_env
        .or_else(|| platform.map(|dir| dir.join(STATE_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STATE_DIR))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
