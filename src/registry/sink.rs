//! Sink handle
//!
//! Thin wrapper binding a sink id to its downstream notification handle. A
//! sink belongs to exactly one source while attached; the source drives the
//! start/stop lifecycle and frame delivery.

use std::sync::Arc;

use super::frame::Frame;
use super::handler::{SinkGone, SinkHandler};

/// A registered consumer of one stream's frames
pub struct Sink {
    id: String,
    handler: Arc<dyn SinkHandler>,
}

impl Sink {
    pub(crate) fn new(id: impl Into<String>, handler: Arc<dyn SinkHandler>) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }

    /// Sink id (globally unique per attach, chosen by the adapter)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Notify the downstream adapter the stream started
    pub(crate) fn start(&self) {
        tracing::trace!(sink_id = %self.id, "Sink start");
        self.handler.on_start();
    }

    /// Notify the downstream adapter the stream stopped
    pub(crate) fn stop(&self) {
        tracing::trace!(sink_id = %self.id, "Sink stop");
        self.handler.on_stop();
    }

    /// Forward one frame downstream
    pub(crate) fn deliver(&self, frame: Frame) -> Result<(), SinkGone> {
        self.handler.on_frame(frame)
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::test_util::RecordingSink;

    use super::*;

    #[test]
    fn test_sink_forwards_notifications() {
        let recording = Arc::new(RecordingSink::new());
        let sink = Sink::new("s1", recording.clone());

        sink.start();
        sink.deliver(Frame::audio(0, Bytes::from_static(&[0xAF, 0x01]), false))
            .unwrap();
        sink.stop();

        assert_eq!(recording.starts(), 1);
        assert_eq!(recording.stops(), 1);
        assert_eq!(recording.frames().len(), 1);
    }

    #[test]
    fn test_sink_surfaces_dead_downstream() {
        let recording = Arc::new(RecordingSink::new());
        recording.kill();
        let sink = Sink::new("s1", recording.clone());

        let result = sink.deliver(Frame::metadata(Bytes::from_static(b"m")));
        assert_eq!(result, Err(SinkGone));
    }
}
