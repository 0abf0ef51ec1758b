//! Upstream peer catalog
//!
//! Ordered list of weighted upstream descriptors the origin puller draws
//! from. Candidate selection is a weighted random draw; when that candidate
//! fails, the puller falls back to the full catalog in configured order.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::registry::error::RegistryError;

fn default_weight() -> u32 {
    1
}

/// One upstream peer descriptor
///
/// Two descriptors are duplicates only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamApp {
    /// Identifier for log lines and catalog management
    pub id: String,
    /// Application path on the remote peer (e.g. "live")
    pub app: String,
    /// Transport protocol the connector should speak (e.g. "rtmp")
    pub protocol: String,
    /// Remote host
    pub address: String,
    /// Remote port
    pub port: u16,
    /// Relative weight for the random draw (minimum 1)
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl std::fmt::Display for UpstreamApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}://{}:{}/{})",
            self.id, self.protocol, self.address, self.port, self.app
        )
    }
}

/// Ordered catalog of upstream descriptors
#[derive(Debug, Default)]
pub struct UpstreamCatalog {
    apps: Vec<UpstreamApp>,
}

impl UpstreamCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor
    ///
    /// A weight below 1 is clamped to 1. Fails with `UpstreamExists` when an
    /// equal descriptor (all fields) is already present.
    pub fn add(&mut self, mut app: UpstreamApp) -> Result<(), RegistryError> {
        if app.weight < 1 {
            app.weight = 1;
        }
        if self.apps.contains(&app) {
            return Err(RegistryError::UpstreamExists(app.id));
        }
        self.apps.push(app);
        Ok(())
    }

    /// Remove a descriptor by full equality
    pub fn remove(&mut self, app: &UpstreamApp) -> Result<(), RegistryError> {
        match self.apps.iter().position(|v| v == app) {
            Some(idx) => {
                self.apps.remove(idx);
                Ok(())
            }
            None => Err(RegistryError::UpstreamNotFound(app.id.clone())),
        }
    }

    /// Weighted random draw over the catalog
    pub fn pick_weighted(&self) -> Option<&UpstreamApp> {
        let total: u64 = self.apps.iter().map(|v| u64::from(v.weight)).sum();
        if total == 0 {
            return None;
        }
        let idx = rand::thread_rng().gen_range(1..=total);
        let mut cur = 0u64;
        for app in &self.apps {
            cur += u64::from(app.weight);
            if cur >= idx {
                return Some(app);
            }
        }
        None
    }

    /// Iterate descriptors in configured order (the fallback order)
    pub fn iter(&self) -> impl Iterator<Item = &UpstreamApp> {
        self.apps.iter()
    }

    /// Snapshot of the catalog in configured order
    pub fn to_vec(&self) -> Vec<UpstreamApp> {
        self.apps.clone()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
