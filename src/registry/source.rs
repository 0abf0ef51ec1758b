//! Per-stream producer slot and fan-out
//!
//! A `Source` is the single producer slot for one stream name. It caches the
//! stream's initialization frames for late joiners, owns the set of attached
//! sinks, and fans dispatched frames out to them inline on the producer's
//! task. All state sits behind one source-local lock, independent of the
//! registry map lock, so fan-out on one stream never blocks admission or
//! removal of another.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::frame::{Frame, FrameKind, StreamKey};
use super::handler::{Producer, SinkHandler};
use super::sink::Sink;

/// Outcome of a generation-guarded producer revocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Revocation {
    /// The supplied generation is older than the current tenure; nothing
    /// changed (a delayed teardown must not evict a newer producer)
    Stale,
    /// Producing state cleared (or was already clear)
    Revoked {
        /// No producer and no sinks remain; the registry drops the source
        now_empty: bool,
    },
}

/// Cached initialization frames, replayed to late-joining sinks
#[derive(Debug, Default)]
struct InitCache {
    metadata: Option<Frame>,
    audio_header: Option<Frame>,
    video_header: Option<Frame>,
    last_keyframe: Option<Frame>,
}

impl InitCache {
    /// Track the most recent initialization frame of each kind, and the most
    /// recent keyframe. Cached headers are re-timestamped to 0 so a late
    /// joiner's decoder initializes from a clean origin.
    fn update(&mut self, frame: &Frame) {
        match frame.kind {
            FrameKind::Audio if frame.is_header => {
                self.audio_header = Some(frame.with_timestamp(0));
            }
            FrameKind::Video if frame.is_header => {
                self.video_header = Some(frame.with_timestamp(0));
            }
            FrameKind::Video if frame.is_keyframe => {
                self.last_keyframe = Some(frame.clone());
            }
            FrameKind::Metadata => {
                self.metadata = Some(frame.clone());
            }
            _ => {}
        }
    }

    /// Replay sequence for a joining sink: metadata, audio header, video
    /// header, optionally the last keyframe.
    fn replay_frames(&self, include_last_keyframe: bool) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(4);
        if let Some(ref meta) = self.metadata {
            frames.push(meta.clone());
        }
        if let Some(ref audio) = self.audio_header {
            frames.push(audio.clone());
        }
        if let Some(ref video) = self.video_header {
            frames.push(video.clone());
        }
        if include_last_keyframe {
            if let Some(ref keyframe) = self.last_keyframe {
                frames.push(keyframe.clone());
            }
        }
        frames
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

struct SourceInner {
    producing: bool,
    generation: u64,
    producer: Option<Arc<dyn Producer>>,
    remote_addr: Option<SocketAddr>,
    cache: InitCache,
    sinks: HashMap<String, Sink>,
}

/// Snapshot of one source's state, for the live list
#[derive(Debug, Clone)]
pub struct SourceStats {
    /// Whether a producer currently feeds this source
    pub producing: bool,
    /// Current producer tenure
    pub generation: u64,
    /// Number of attached sinks
    pub sink_count: usize,
    /// Where the producer connected from, if known
    pub remote_addr: Option<SocketAddr>,
}

/// The single producer slot for one stream name
pub struct Source {
    key: StreamKey,
    replay_last_keyframe: bool,
    inner: RwLock<SourceInner>,
}

impl Source {
    pub(crate) fn new(key: StreamKey, replay_last_keyframe: bool) -> Self {
        Self {
            key,
            replay_last_keyframe,
            inner: RwLock::new(SourceInner {
                producing: false,
                generation: 0,
                producer: None,
                remote_addr: None,
                cache: InitCache::default(),
                sinks: HashMap::new(),
            }),
        }
    }

    /// Stream key this source serves
    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    /// Whether a producer currently feeds this source
    pub async fn is_producing(&self) -> bool {
        self.inner.read().await.producing
    }

    /// Current producer tenure (0 before the first admission)
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Number of attached sinks
    pub async fn sink_count(&self) -> usize {
        self.inner.read().await.sinks.len()
    }

    /// State snapshot for the live list
    pub async fn stats(&self) -> SourceStats {
        let inner = self.inner.read().await;
        SourceStats {
            producing: inner.producing,
            generation: inner.generation,
            sink_count: inner.sinks.len(),
            remote_addr: inner.remote_addr,
        }
    }

    /// Dispatch one frame to every attached sink
    ///
    /// Fails `NotProducing` when the producer slot is clear, which guards
    /// against frames still in flight after a forced teardown. A sink whose
    /// forward call errors is removed and stopped; its failure never reaches
    /// the producer or the remaining sinks.
    pub async fn dispatch(&self, frame: Frame) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;
        if !inner.producing {
            return Err(RegistryError::NotProducing(self.key.clone()));
        }

        inner.cache.update(&frame);

        let key = &self.key;
        inner.sinks.retain(|id, sink| match sink.deliver(frame.clone()) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(stream = %key, sink_id = %id, "Sink delivery failed, removing");
                sink.stop();
                false
            }
        });

        Ok(())
    }

    /// Admit a producer into this slot
    ///
    /// Fails `NameInUse` when the slot is taken. On success the generation
    /// is incremented and every already-attached sink is restarted in place.
    pub(crate) async fn admit_producer(
        &self,
        producer: Arc<dyn Producer>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<u64, RegistryError> {
        let mut inner = self.inner.write().await;
        if inner.producing {
            return Err(RegistryError::NameInUse(self.key.clone()));
        }

        inner.producing = true;
        inner.generation += 1;
        inner.producer = Some(producer);
        inner.remote_addr = remote_addr;

        for sink in inner.sinks.values() {
            sink.start();
        }

        tracing::info!(
            stream = %self.key,
            generation = inner.generation,
            sinks = inner.sinks.len(),
            "Producer admitted"
        );
        Ok(inner.generation)
    }

    /// Revoke the producer, guarded by generation
    ///
    /// `at_generation` below the current tenure is a silent no-op. Pass
    /// `u64::MAX` to bypass the guard (administrative eviction). Clears the
    /// init cache, notifies the outgoing producer it was force-closed, and
    /// stops every attached sink. Sinks stay attached; a later admission
    /// restarts them.
    pub(crate) async fn revoke_producer(&self, at_generation: u64) -> Revocation {
        let mut inner = self.inner.write().await;
        if at_generation < inner.generation {
            tracing::debug!(
                stream = %self.key,
                stale = at_generation,
                current = inner.generation,
                "Stale producer teardown ignored"
            );
            return Revocation::Stale;
        }

        if inner.producing {
            inner.producing = false;
            inner.remote_addr = None;
            inner.cache.clear();
            if let Some(producer) = inner.producer.take() {
                producer.on_force_closed();
            }
            for sink in inner.sinks.values() {
                sink.stop();
            }
            tracing::info!(
                stream = %self.key,
                generation = inner.generation,
                sinks = inner.sinks.len(),
                "Producer removed"
            );
        }

        Revocation::Revoked {
            now_empty: inner.sinks.is_empty(),
        }
    }

    /// Attach a sink
    ///
    /// When producing, the sink is started immediately and the cached
    /// initialization frames are replayed in the fixed order metadata →
    /// audio header → video header (the last keyframe only when the replay
    /// policy is enabled). Replay delivery failures are ignored here; the
    /// next dispatch prunes a dead sink.
    pub(crate) async fn add_sink(
        &self,
        id: &str,
        handler: Arc<dyn SinkHandler>,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;
        if inner.sinks.contains_key(id) {
            return Err(RegistryError::SinkExists(self.key.clone(), id.to_string()));
        }

        let sink = Sink::new(id, handler);
        if inner.producing {
            sink.start();
            for frame in inner.cache.replay_frames(self.replay_last_keyframe) {
                if sink.deliver(frame).is_err() {
                    tracing::debug!(stream = %self.key, sink_id = id, "Replay delivery failed");
                    break;
                }
            }
        }

        inner.sinks.insert(id.to_string(), sink);
        tracing::info!(
            stream = %self.key,
            sink_id = id,
            sinks = inner.sinks.len(),
            "Sink attached"
        );
        Ok(())
    }

    /// Detach a sink without stopping it (the sink stops itself)
    ///
    /// Returns whether the source is now empty (no sinks and no producer).
    pub(crate) async fn remove_sink(&self, id: &str) -> bool {
        let mut inner = self.inner.write().await;
        if inner.sinks.remove(id).is_some() {
            tracing::debug!(stream = %self.key, sink_id = id, "Sink detached");
        }
        inner.sinks.is_empty() && !inner.producing
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").field("key", &self.key).finish()
    }
}
