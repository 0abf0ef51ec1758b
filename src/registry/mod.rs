//! Stream registry and fan-out broker
//!
//! The registry maps a logical stream name to exactly one active producer
//! and fans media frames out to any number of consumers. Protocol adapters
//! on both sides never talk to each other directly.
//!
//! # Architecture
//!
//! ```text
//!                           Arc<Registry>
//!                  ┌───────────────────────────────┐
//!                  │ sources: HashMap<StreamKey,   │
//!                  │   Arc<Source> {               │
//!                  │     producer slot + generation│
//!                  │     init cache,               │
//!                  │     sinks: HashMap<id, Sink>, │
//!                  │   }                           │
//!                  │ >  + access lists + upstreams │
//!                  └───────────────┬───────────────┘
//!                                  │
//!          ┌───────────────────────┼───────────────────────┐
//!          │                       │                       │
//!          ▼                       ▼                       ▼
//!     [Producer]               [Sink]                  [Sink]
//!     dispatch()             on_frame()              on_frame()
//!          │                       ▲                       ▲
//!          └───── Source fan-out ──┴───────────────────────┘
//! ```
//!
//! Fan-out happens inline on the producer's task: the broker holds no
//! per-sink queue, so a consumer that needs buffering keeps its own bounded
//! queue downstream of `on_frame`. Frame payloads are `bytes::Bytes`, so
//! every sink shares one allocation per frame.
//!
//! When `add_sink` finds no producing source, the registry starts a single
//! origin pull for the name (see [`crate::upstream`]) and parks the caller
//! until the pull hands off or times out.

pub(crate) mod access;
pub mod config;
pub mod error;
pub mod frame;
pub mod handler;
pub mod sink;
pub mod source;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use frame::{Frame, FrameKind, StreamKey};
pub use handler::{Producer, SinkGone, SinkHandler};
pub use sink::Sink;
pub use source::{Source, SourceStats};
pub use store::{LiveInfo, Registry};
