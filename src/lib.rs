//! streamhub-rs: in-process stream registry and fan-out broker
//!
//! The piece of a multi-protocol live-media server that sits between its
//! protocol adapters:
//! - Maps a logical stream name (`app/streamName`) to exactly one active
//!   producer, with generation-guarded takeover so a stale teardown never
//!   evicts a newer producer.
//! - Fans media frames out to any number of consumers, inline on the
//!   producer's task, with zero-copy `bytes::Bytes` payloads.
//! - Replays cached initialization frames (metadata, audio header, video
//!   header) to late-joining consumers.
//! - Pulls a stream from a configured upstream peer when no local producer
//!   exists — one pull per name, shared by every waiting consumer.
//! - Enforces blacklist/whitelist access control with retroactive eviction.
//!
//! Chunk framing, container muxing and HTTP routing are adapter concerns;
//! adapters implement the narrow [`Producer`] / [`SinkHandler`] /
//! [`UpstreamConnector`] interfaces and move [`Frame`]s through the broker.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use streamhub_rs::{
//!     Frame, Producer, Registry, RegistryConfig, SinkGone, SinkHandler, StreamKey,
//! };
//!
//! struct Publisher;
//!
//! impl Producer for Publisher {
//!     fn on_force_closed(&self) {
//!         // release the ingest transport
//!     }
//! }
//!
//! struct Player;
//!
//! impl SinkHandler for Player {
//!     fn on_start(&self) {}
//!     fn on_stop(&self) {}
//!     fn on_frame(&self, frame: Frame) -> Result<(), SinkGone> {
//!         // push into the play session's own bounded queue
//!         println!("frame at {}ms", frame.timestamp);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), streamhub_rs::RegistryError> {
//!     let registry = Arc::new(Registry::new(RegistryConfig::default()));
//!     let key = StreamKey::parse("live/demo")?;
//!
//!     let (source, generation) = registry
//!         .add_source(&key, Arc::new(Publisher), None)
//!         .await?;
//!     registry.add_sink(&key, "player-1", Arc::new(Player)).await?;
//!
//!     source
//!         .dispatch(Frame::video(0, &b"\x17\x00"[..], false, true))
//!         .await?;
//!
//!     registry.del_source(&key, generation).await?;
//!     Ok(())
//! }
//! ```

pub mod registry;
pub mod upstream;

#[cfg(test)]
mod test_util;

// Re-export main types for convenience
pub use registry::{
    Frame, FrameKind, LiveInfo, Producer, Registry, RegistryConfig, RegistryError, Sink, SinkGone,
    SinkHandler, Source, SourceStats, StreamKey,
};
pub use upstream::{UpstreamApp, UpstreamCatalog, UpstreamConnector, UpstreamSession};
