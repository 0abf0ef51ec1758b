//! Origin puller
//!
//! Ephemeral worker that sources a stream from a remote peer when no local
//! producer exists. Spawned by the first sink waiting on a name; picks an
//! upstream by weighted random draw (falling back to the full catalog in
//! configured order), registers itself as the stream's producer, and streams
//! frames into dispatch until the session ends, it is force-closed, or
//! nobody is watching anymore.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::registry::error::RegistryError;
use crate::registry::frame::StreamKey;
use crate::registry::handler::Producer;
use crate::registry::source::Source;
use crate::registry::store::Registry;

use super::catalog::UpstreamApp;
use super::connector::{UpstreamConnector, UpstreamSession};

/// Producer handle the puller registers with its source
///
/// Eviction (blacklist, takeover override) reaches the streaming loop as a
/// watch signal; the loop observes it between frames, never mid-dispatch.
struct PullerHandle {
    stop: watch::Sender<bool>,
}

impl Producer for PullerHandle {
    fn on_force_closed(&self) {
        let _ = self.stop.send(true);
    }
}

/// Worker pulling one stream from a remote peer
pub(crate) struct OriginPuller {
    registry: Arc<Registry>,
    key: StreamKey,
}

impl OriginPuller {
    pub(crate) fn new(registry: Arc<Registry>, key: StreamKey) -> Self {
        Self { registry, key }
    }

    /// Run the pull to completion
    ///
    /// Always resolves the waiters parked on this name, one way or the
    /// other: success once a producer exists for the name (this puller or a
    /// local one that won the race), failure when every candidate is
    /// exhausted.
    pub(crate) async fn run(self) {
        let Some(connector) = self.registry.connector() else {
            tracing::warn!(stream = %self.key, "No upstream connector configured");
            self.registry.resolve_pull(&self.key, false).await;
            return;
        };

        let Some(session) = self.acquire_session(connector.as_ref()).await else {
            tracing::warn!(stream = %self.key, "Origin pull failed, no reachable upstream");
            self.registry.resolve_pull(&self.key, false).await;
            return;
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = Arc::new(PullerHandle { stop: stop_tx });
        let (source, generation) = match self
            .registry
            .add_source(&self.key, handle, session.remote_addr())
            .await
        {
            Ok(admitted) => admitted,
            Err(RegistryError::NameInUse(_)) => {
                // A local producer took the name while we were connecting;
                // the waiters attach to it and this session is surplus.
                tracing::debug!(stream = %self.key, "Local producer won the pull race");
                self.registry.resolve_pull(&self.key, true).await;
                return;
            }
            Err(e) => {
                tracing::warn!(stream = %self.key, error = %e, "Pull registration failed");
                self.registry.resolve_pull(&self.key, false).await;
                return;
            }
        };

        // add_source already released the waiters; start moving media.
        self.stream(session, source, generation, stop_rx).await;
    }

    /// Weighted random candidate first, then the full catalog in configured
    /// order, stopping at the first success.
    async fn acquire_session(&self, connector: &dyn UpstreamConnector) -> Option<UpstreamSession> {
        let Some(candidate) = self.registry.pick_upstream().await else {
            tracing::warn!(stream = %self.key, "Upstream catalog is empty");
            return None;
        };
        if let Some(session) = self.try_candidate(connector, &candidate).await {
            return Some(session);
        }

        for candidate in self.registry.upstream_list().await {
            if let Some(session) = self.try_candidate(connector, &candidate).await {
                return Some(session);
            }
        }
        None
    }

    async fn try_candidate(
        &self,
        connector: &dyn UpstreamConnector,
        candidate: &UpstreamApp,
    ) -> Option<UpstreamSession> {
        let budget = self.registry.config().connect_timeout();
        match time::timeout(budget, connector.connect(candidate, &self.key)).await {
            Ok(Ok(session)) => {
                tracing::info!(
                    stream = %self.key,
                    upstream = %candidate,
                    remote = ?session.remote_addr(),
                    "Upstream connected"
                );
                Some(session)
            }
            Ok(Err(e)) => {
                tracing::warn!(stream = %self.key, upstream = %candidate, error = %e, "Upstream connect failed");
                None
            }
            Err(_) => {
                tracing::warn!(stream = %self.key, upstream = %candidate, "Upstream connect timed out");
                None
            }
        }
    }

    async fn stream(
        &self,
        mut session: UpstreamSession,
        source: Arc<Source>,
        generation: u64,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let period = self.registry.config().idle_check_interval();
        // First idle check one full period out, so the waiters have attached.
        let mut idle = time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                frame = session.recv() => match frame {
                    Some(frame) => {
                        if let Err(e) = source.dispatch(frame).await {
                            tracing::debug!(stream = %self.key, error = %e, "Pull dispatch stopped");
                            break;
                        }
                    }
                    None => {
                        tracing::info!(stream = %self.key, "Upstream session ended");
                        break;
                    }
                },
                _ = stop_rx.changed() => {
                    // Evicted: the registry already revoked the producer slot.
                    tracing::info!(stream = %self.key, "Origin pull force-closed");
                    return;
                }
                _ = idle.tick() => {
                    if self.registry.consumer_count(&self.key).await == 0 {
                        tracing::info!(stream = %self.key, "No consumers left, stopping origin pull");
                        break;
                    }
                }
            }
        }

        // Generation-guarded teardown: a newer producer is never evicted by
        // this puller winding down late.
        if let Err(e) = self.registry.del_source(&self.key, generation).await {
            tracing::debug!(stream = %self.key, error = %e, "Pull teardown");
        }
    }
}
