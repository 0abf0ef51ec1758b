//! Origin pull: sourcing streams from remote peers
//!
//! When a viewer asks for a stream no local producer feeds, the registry
//! pulls it from a configured upstream peer. The pull is transparent to the
//! egress adapter: its `add_sink` call simply resolves once media is
//! available (or fails `NotFound` once every candidate is exhausted).
//!
//! The wire protocol lives behind [`UpstreamConnector`]; the core only
//! consumes the frames a connector's session yields.

pub mod catalog;
pub mod connector;
pub(crate) mod puller;

pub use catalog::{UpstreamApp, UpstreamCatalog};
pub use connector::{UpstreamConnector, UpstreamSession};
