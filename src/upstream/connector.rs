//! Upstream connector seam
//!
//! The broker core never speaks a wire protocol. A protocol adapter (RTMP
//! client, WebSocket puller, ...) implements [`UpstreamConnector`]: it
//! connects, handshakes and negotiates with the remote peer, spawns its own
//! read task, and hands the core an [`UpstreamSession`] that yields decoded
//! frames over a channel.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::registry::error::RegistryError;
use crate::registry::frame::{Frame, StreamKey};

use super::catalog::UpstreamApp;

/// An established upstream session
///
/// The adapter owns the transport; the core only consumes frames. Dropping
/// the session drops the receiver, which is the adapter's signal to close
/// its transport (its sends start failing).
pub struct UpstreamSession {
    remote_addr: Option<SocketAddr>,
    frames: tokio::sync::mpsc::Receiver<Frame>,
}

impl UpstreamSession {
    /// Wrap a frame channel produced by a connector's read task
    pub fn new(
        remote_addr: Option<SocketAddr>,
        frames: tokio::sync::mpsc::Receiver<Frame>,
    ) -> Self {
        Self {
            remote_addr,
            frames,
        }
    }

    /// Address of the remote peer, if known
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Next frame from the remote peer; `None` when the session ended
    pub async fn recv(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }
}

impl std::fmt::Debug for UpstreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSession")
            .field("remote_addr", &self.remote_addr)
            .finish()
    }
}

/// Protocol seam for pulling a stream from a remote peer
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    /// Connect to `upstream` and start pulling `key`
    ///
    /// Implementations perform the full connect/handshake/negotiate sequence
    /// and only return once media is flowing (or about to). The origin
    /// puller bounds this call with the configured connect timeout.
    async fn connect(
        &self,
        upstream: &UpstreamApp,
        key: &StreamKey,
    ) -> Result<UpstreamSession, RegistryError>;
}
