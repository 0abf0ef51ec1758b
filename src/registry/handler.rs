//! Capability interfaces between the broker and protocol adapters
//!
//! Each adapter implements only the role it plays: an ingest adapter is a
//! [`Producer`], an egress adapter a [`SinkHandler`]. Both contracts are
//! synchronous because `dispatch` fans out inline on the producer's task —
//! the broker holds no per-sink queue, so callbacks must be cheap (typically
//! a push into the adapter's own bounded queue).

use super::frame::Frame;

/// Marker returned by a sink handler whose downstream can no longer accept
/// frames (connection closed, queue gone). The source removes and stops the
/// sink; the error itself is swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkGone;

impl std::fmt::Display for SinkGone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sink downstream is gone")
    }
}

impl std::error::Error for SinkGone {}

/// Capability interface for the adapter currently feeding a source
pub trait Producer: Send + Sync {
    /// The source evicted this producer (administrative override or name
    /// takeover). A hard stop: the registry never re-admits on its own, the
    /// adapter decides whether to release or reconnect its transport.
    fn on_force_closed(&self);
}

/// Notification contract from a source to a downstream protocol adapter
pub trait SinkHandler: Send + Sync {
    /// The stream this sink is attached to started producing
    fn on_start(&self);

    /// The stream stopped producing, or the sink was dropped as dead
    fn on_stop(&self);

    /// One media frame, in dispatch order
    fn on_frame(&self, frame: Frame) -> Result<(), SinkGone>;
}
