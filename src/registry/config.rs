//! Registry configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::upstream::catalog::UpstreamApp;

use super::error::RegistryError;

/// Registry configuration options
///
/// Deserializable from the JSON config file a management front end ships,
/// e.g.:
///
/// ```json
/// {
///     "pull_timeout_secs": 30,
///     "upstreams": [
///         {"id": "origin-1", "app": "live", "protocol": "rtmp",
///          "address": "origin.example.com", "port": 1935, "weight": 2}
///     ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// How long an `add_sink` caller waits for an origin pull to hand off
    pub pull_timeout_secs: u64,

    /// Connect/handshake budget per upstream candidate
    pub connect_timeout_secs: u64,

    /// How often an origin puller checks for remaining consumers
    pub idle_check_secs: u64,

    /// Replay the cached last keyframe to late-joining sinks
    ///
    /// Off by default: a stale keyframe ahead of a fresh one confuses some
    /// decoders more than a short wait for the next IDR.
    pub replay_last_keyframe: bool,

    /// Upstream catalog seeded at construction
    pub upstreams: Vec<UpstreamApp>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            pull_timeout_secs: 60,
            connect_timeout_secs: 10,
            idle_check_secs: 120,
            replay_last_keyframe: false,
            upstreams: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let data = std::fs::read(path.as_ref())
            .map_err(|e| RegistryError::Config(format!("read {:?}: {}", path.as_ref(), e)))?;
        serde_json::from_slice(&data)
            .map_err(|e| RegistryError::Config(format!("parse {:?}: {}", path.as_ref(), e)))
    }

    /// Set the pull handoff timeout
    pub fn pull_timeout_secs(mut self, secs: u64) -> Self {
        self.pull_timeout_secs = secs;
        self
    }

    /// Set the per-candidate connect timeout
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set the puller idle-check interval
    pub fn idle_check_secs(mut self, secs: u64) -> Self {
        self.idle_check_secs = secs;
        self
    }

    /// Enable or disable last-keyframe replay to late joiners
    pub fn replay_last_keyframe(mut self, enabled: bool) -> Self {
        self.replay_last_keyframe = enabled;
        self
    }

    /// Seed the upstream catalog
    pub fn upstream(mut self, app: UpstreamApp) -> Self {
        self.upstreams.push(app);
        self
    }

    /// Pull handoff timeout as a `Duration`
    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }

    /// Per-candidate connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Idle-check interval as a `Duration`
    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_secs(self.idle_check_secs)
    }
}
