//! Stream identifiers and the frame type moved by the broker
//!
//! A [`Frame`] is one media access unit crossing the broker. Payloads are
//! `bytes::Bytes`, so handing the same frame to many sinks bumps a reference
//! count instead of copying the media data.

use bytes::Bytes;

use super::error::RegistryError;

/// Unique identifier for a stream (app + stream name)
///
/// Rendered as the two-segment path `app/name`. The app part may itself
/// contain slashes; the final segment is the stream identifier used for
/// routing and access-control checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    /// Application name (e.g., "live")
    pub app: String,
    /// Stream name (e.g., "stream_key_123")
    pub name: String,
}

impl StreamKey {
    /// Create a new stream key
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
        }
    }

    /// Parse a full stream path like `live/foo` or `live/sub/foo`
    ///
    /// The last segment becomes the stream name, everything before it the
    /// app. Fails with `BadName` when there is no separator or a segment is
    /// empty.
    pub fn parse(path: &str) -> Result<Self, RegistryError> {
        match path.rsplit_once('/') {
            Some((app, name)) if !app.is_empty() && !name.is_empty() => Ok(Self::new(app, name)),
            _ => Err(RegistryError::BadName(path.to_string())),
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.app, self.name)
    }
}

/// Kind of media frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Audio frame
    Audio,
    /// Video frame
    Video,
    /// Metadata (e.g. onMetaData script data)
    Metadata,
}

/// One media access unit crossing the broker
///
/// Cheap to clone: the payload is reference-counted, not copied. The payload
/// is immutable from construction on, so a producer can never mutate a
/// buffer a consumer is still reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Kind of frame
    pub kind: FrameKind,
    /// Timestamp in milliseconds
    pub timestamp: u32,
    /// Opaque payload (zero-copy via reference counting)
    pub payload: Bytes,
    /// Whether this is a keyframe (video only)
    pub is_keyframe: bool,
    /// Whether this is an initialization frame (sequence header / decoder config)
    pub is_header: bool,
}

impl Frame {
    /// Create a video frame
    pub fn video(
        timestamp: u32,
        payload: impl Into<Bytes>,
        is_keyframe: bool,
        is_header: bool,
    ) -> Self {
        Self {
            kind: FrameKind::Video,
            timestamp,
            payload: payload.into(),
            is_keyframe,
            is_header,
        }
    }

    /// Create an audio frame
    pub fn audio(timestamp: u32, payload: impl Into<Bytes>, is_header: bool) -> Self {
        Self {
            kind: FrameKind::Audio,
            timestamp,
            payload: payload.into(),
            is_keyframe: false,
            is_header,
        }
    }

    /// Create a metadata frame
    pub fn metadata(payload: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Metadata,
            timestamp: 0,
            payload: payload.into(),
            is_keyframe: false,
            is_header: false,
        }
    }

    /// Copy of this frame with a different timestamp
    ///
    /// Used when replaying cached initialization frames, which are delivered
    /// with timestamp 0.
    pub fn with_timestamp(&self, timestamp: u32) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
