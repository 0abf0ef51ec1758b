//! Stream registry implementation
//!
//! The central broker mapping stream names to sources, routing producer
//! admission and eviction, sink attachment, access control, and origin-pull
//! orchestration.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex, RwLock};

use crate::upstream::catalog::{UpstreamApp, UpstreamCatalog};
use crate::upstream::connector::UpstreamConnector;
use crate::upstream::puller::OriginPuller;

use super::access::AccessList;
use super::config::RegistryConfig;
use super::error::RegistryError;
use super::frame::StreamKey;
use super::handler::{Producer, SinkHandler};
use super::source::{Revocation, Source};

/// One row of the live-stream list
#[derive(Debug, Clone)]
pub struct LiveInfo {
    /// Stream key
    pub key: StreamKey,
    /// Number of attached consumers
    pub consumer_count: usize,
    /// Where the producer connected from, if known
    pub remote_addr: Option<SocketAddr>,
}

/// Central registry for all active streams
///
/// Constructed once at startup and passed by `Arc` into every protocol
/// adapter; there is no global instance. The name→source map is guarded by
/// one lock held only for map mutations — origin-pull network work runs in a
/// spawned task that calls back in to register its result.
pub struct Registry {
    /// Map of stream key to source
    sources: RwLock<HashMap<StreamKey, Arc<Source>>>,

    /// Names denied while enabled
    blacklist: RwLock<AccessList>,

    /// The only names allowed while enabled
    whitelist: RwLock<AccessList>,

    /// Upstream peer catalog for origin pulls
    upstreams: RwLock<UpstreamCatalog>,

    /// Single-flight table: sinks waiting on an in-flight origin pull
    pending_pulls: Mutex<HashMap<StreamKey, Vec<oneshot::Sender<bool>>>>,

    /// Protocol seam for origin pulls (none = pulls always fail)
    connector: Option<Arc<dyn UpstreamConnector>>,

    /// Configuration
    config: RegistryConfig,
}

impl Registry {
    /// Create a registry without an upstream connector
    ///
    /// `add_sink` on a missing stream fails `NotFound` without attempting a
    /// pull.
    pub fn new(config: RegistryConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a registry that pulls missing streams through `connector`
    pub fn with_connector(config: RegistryConfig, connector: Arc<dyn UpstreamConnector>) -> Self {
        Self::build(config, Some(connector))
    }

    fn build(config: RegistryConfig, connector: Option<Arc<dyn UpstreamConnector>>) -> Self {
        let mut catalog = UpstreamCatalog::new();
        for app in &config.upstreams {
            if let Err(e) = catalog.add(app.clone()) {
                tracing::warn!(error = %e, "Skipping configured upstream");
            }
        }

        Self {
            sources: RwLock::new(HashMap::new()),
            blacklist: RwLock::new(AccessList::new()),
            whitelist: RwLock::new(AccessList::new()),
            upstreams: RwLock::new(catalog),
            pending_pulls: Mutex::new(HashMap::new()),
            connector,
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub(crate) fn connector(&self) -> Option<Arc<dyn UpstreamConnector>> {
        self.connector.clone()
    }

    /// Register a producer for a stream
    ///
    /// Creates the source when the name is new, reuses an idle source
    /// otherwise (sinks already attached are restarted in place). Fails
    /// `NameRejected` when an enabled access list refuses the name,
    /// `NameInUse` when the source already has a live producer. Returns the
    /// source the producer dispatches into plus the admission generation,
    /// which a later `del_source` must present.
    pub async fn add_source(
        &self,
        key: &StreamKey,
        producer: Arc<dyn Producer>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<(Arc<Source>, u64), RegistryError> {
        if !self.name_allowed(key).await {
            tracing::warn!(stream = %key, "Producer rejected by access list");
            return Err(RegistryError::NameRejected(key.clone()));
        }

        let mut sources = self.sources.write().await;
        let source = match sources.get(key) {
            Some(existing) => Arc::clone(existing),
            None => {
                let source = Arc::new(Source::new(
                    key.clone(),
                    self.config.replay_last_keyframe,
                ));
                sources.insert(key.clone(), Arc::clone(&source));
                source
            }
        };
        let generation = source.admit_producer(producer, remote_addr).await?;
        drop(sources);

        // Sinks parked on an origin pull for this name can attach now.
        self.resolve_pull(key, true).await;

        Ok((source, generation))
    }

    /// Unregister a producer, guarded by generation
    ///
    /// A generation below the source's current one is a silent no-op, so a
    /// delayed teardown from an old producer can never evict a newer one
    /// that already took the name over. The source is dropped from the
    /// registry once it has neither producer nor sinks.
    pub async fn del_source(&self, key: &StreamKey, generation: u64) -> Result<(), RegistryError> {
        let mut sources = self.sources.write().await;
        let source = sources
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.clone()))?;

        match source.revoke_producer(generation).await {
            Revocation::Stale => Ok(()),
            Revocation::Revoked { now_empty } => {
                if now_empty {
                    sources.remove(key);
                    tracing::info!(stream = %key, "Stream removed");
                }
                Ok(())
            }
        }
    }

    /// Attach a sink to a stream
    ///
    /// When a producing source exists the sink attaches directly and the
    /// cached initialization frames are replayed to it. Otherwise the call
    /// joins the single-flight origin pull for the name — the first waiter
    /// spawns the puller — and suspends until the pull hands off or the
    /// timeout expires. Pull failure surfaces as `NotFound`.
    pub async fn add_sink(
        self: &Arc<Self>,
        key: &StreamKey,
        sink_id: &str,
        handler: Arc<dyn SinkHandler>,
    ) -> Result<(), RegistryError> {
        {
            let sources = self.sources.read().await;
            if let Some(source) = sources.get(key) {
                if source.is_producing().await {
                    return source.add_sink(sink_id, handler).await;
                }
            }
        }

        let outcome = self.join_pull(key).await;
        match tokio::time::timeout(self.config.pull_timeout(), outcome).await {
            Ok(Ok(true)) => {}
            Ok(_) => return Err(RegistryError::NotFound(key.clone())),
            Err(_) => {
                tracing::warn!(stream = %key, "Origin pull handoff timed out");
                return Err(RegistryError::Timeout(key.clone()));
            }
        }

        let source = {
            let sources = self.sources.read().await;
            sources
                .get(key)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound(key.clone()))?
        };
        if !source.is_producing().await {
            return Err(RegistryError::NotFound(key.clone()));
        }
        source.add_sink(sink_id, handler).await
    }

    /// Detach a sink
    ///
    /// The sink is not stopped — it initiated the detach and stops itself.
    /// The source is dropped once it has neither producer nor sinks.
    pub async fn del_sink(&self, key: &StreamKey, sink_id: &str) -> Result<(), RegistryError> {
        let mut sources = self.sources.write().await;
        let source = sources
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.clone()))?;

        if source.remove_sink(sink_id).await {
            sources.remove(key);
            tracing::info!(stream = %key, "Stream removed");
        }
        Ok(())
    }

    /// Look up a source by name (whether producing or idle)
    pub async fn get_source(&self, key: &StreamKey) -> Option<Arc<Source>> {
        self.sources.read().await.get(key).cloned()
    }

    /// Number of registered streams
    pub async fn live_count(&self) -> usize {
        self.sources.read().await.len()
    }

    /// Number of consumers attached to a stream (0 when absent)
    pub async fn consumer_count(&self, key: &StreamKey) -> usize {
        match self.get_source(key).await {
            Some(source) => source.sink_count().await,
            None => 0,
        }
    }

    /// Snapshot of every registered stream
    pub async fn live_list(&self) -> Vec<LiveInfo> {
        let snapshot: Vec<(StreamKey, Arc<Source>)> = {
            let sources = self.sources.read().await;
            sources
                .iter()
                .map(|(k, v)| (k.clone(), Arc::clone(v)))
                .collect()
        };

        let mut list = Vec::with_capacity(snapshot.len());
        for (key, source) in snapshot {
            let stats = source.stats().await;
            list.push(LiveInfo {
                key,
                consumer_count: stats.sink_count,
                remote_addr: stats.remote_addr,
            });
        }
        list
    }

    // --- access control ---------------------------------------------------

    /// Enable or disable the blacklist
    ///
    /// Enabling retroactively force-evicts producing streams whose name is
    /// listed, bypassing the generation check.
    pub async fn set_blacklist_enabled(&self, enabled: bool) {
        self.blacklist.write().await.set_enabled(enabled);
        if enabled {
            self.enforce_access().await;
        }
    }

    /// Add names to the blacklist
    ///
    /// While the blacklist is enabled, producing streams with an added name
    /// are force-evicted immediately.
    pub async fn add_blacklist(&self, names: impl IntoIterator<Item = String>) {
        let enabled = {
            let mut list = self.blacklist.write().await;
            for name in names {
                list.insert(name);
            }
            list.is_enabled()
        };
        if enabled {
            self.enforce_access().await;
        }
    }

    /// Remove names from the blacklist
    pub async fn remove_blacklist(&self, names: impl IntoIterator<Item = String>) {
        let mut list = self.blacklist.write().await;
        for name in names {
            list.remove(&name);
        }
    }

    /// Enable or disable the whitelist
    ///
    /// Enabling retroactively force-evicts producing streams whose name is
    /// not listed, bypassing the generation check.
    pub async fn set_whitelist_enabled(&self, enabled: bool) {
        self.whitelist.write().await.set_enabled(enabled);
        if enabled {
            self.enforce_access().await;
        }
    }

    /// Add names to the whitelist
    pub async fn add_whitelist(&self, names: impl IntoIterator<Item = String>) {
        let mut list = self.whitelist.write().await;
        for name in names {
            list.insert(name);
        }
    }

    /// Remove names from the whitelist
    ///
    /// While the whitelist is enabled, producing streams with a removed name
    /// are force-evicted immediately.
    pub async fn remove_whitelist(&self, names: impl IntoIterator<Item = String>) {
        let enabled = {
            let mut list = self.whitelist.write().await;
            for name in names {
                list.remove(&name);
            }
            list.is_enabled()
        };
        if enabled {
            self.enforce_access().await;
        }
    }

    /// Whether an enabled list refuses this stream's name
    async fn name_allowed(&self, key: &StreamKey) -> bool {
        if self.blacklist.read().await.denies(&key.name) {
            return false;
        }
        if self.whitelist.read().await.excludes(&key.name) {
            return false;
        }
        true
    }

    /// Force-evict every producing source that no longer passes the access
    /// check. List locks are released before the sweep.
    async fn enforce_access(&self) {
        let snapshot: Vec<(StreamKey, Arc<Source>)> = {
            let sources = self.sources.read().await;
            sources
                .iter()
                .map(|(k, v)| (k.clone(), Arc::clone(v)))
                .collect()
        };

        for (key, source) in snapshot {
            if self.name_allowed(&key).await || !source.is_producing().await {
                continue;
            }
            tracing::info!(stream = %key, "Force-evicting producer (access control)");
            if let Err(e) = self.del_source(&key, u64::MAX).await {
                tracing::debug!(stream = %key, error = %e, "Eviction sweep");
            }
        }
    }

    // --- upstream catalog -------------------------------------------------

    /// Add an upstream descriptor (weight below 1 is clamped to 1)
    pub async fn add_upstream(&self, app: UpstreamApp) -> Result<(), RegistryError> {
        self.upstreams.write().await.add(app)
    }

    /// Remove an upstream descriptor by full equality
    pub async fn remove_upstream(&self, app: &UpstreamApp) -> Result<(), RegistryError> {
        self.upstreams.write().await.remove(app)
    }

    /// Snapshot of the upstream catalog in configured order
    pub async fn upstream_list(&self) -> Vec<UpstreamApp> {
        self.upstreams.read().await.to_vec()
    }

    pub(crate) async fn pick_upstream(&self) -> Option<UpstreamApp> {
        self.upstreams.read().await.pick_weighted().cloned()
    }

    // --- origin-pull orchestration ----------------------------------------

    /// Join the single-flight pull for a name; the first waiter spawns the
    /// puller task. The returned channel yields the shared outcome.
    async fn join_pull(self: &Arc<Self>, key: &StreamKey) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending_pulls.lock().await;
        match pending.get_mut(key) {
            Some(waiters) => waiters.push(tx),
            None => {
                pending.insert(key.clone(), vec![tx]);
                tracing::info!(stream = %key, "Origin pull started");
                let registry = Arc::clone(self);
                let key = key.clone();
                tokio::spawn(async move {
                    OriginPuller::new(registry, key).run().await;
                });
            }
        }
        rx
    }

    /// Resolve every sink waiting on a pull for this name
    pub(crate) async fn resolve_pull(&self, key: &StreamKey, ok: bool) {
        let waiters = self.pending_pulls.lock().await.remove(key);
        if let Some(waiters) = waiters {
            tracing::debug!(stream = %key, ok, waiters = waiters.len(), "Origin pull resolved");
            for tx in waiters {
                let _ = tx.send(ok);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::registry::frame::Frame;
    use crate::test_util::{RecordingProducer, RecordingSink, StubConnector};

    use super::*;

    fn key(path: &str) -> StreamKey {
        StreamKey::parse(path).unwrap()
    }

    fn upstream(id: &str) -> UpstreamApp {
        UpstreamApp {
            id: id.to_string(),
            app: "live".to_string(),
            protocol: "rtmp".to_string(),
            address: format!("{}.example.com", id),
            port: 1935,
            weight: 1,
        }
    }

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::new(RegistryConfig::default()))
    }

    fn pulling_registry(connector: Arc<StubConnector>) -> Arc<Registry> {
        let config = RegistryConfig::new()
            .pull_timeout_secs(5)
            .connect_timeout_secs(1)
            .upstream(upstream("origin"));
        Arc::new(Registry::with_connector(config, connector))
    }

    #[tokio::test]
    async fn test_add_source_and_collision() {
        let registry = registry();
        let key = key("live/foo");

        let (_, generation) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        assert_eq!(generation, 1);

        let err = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await;
        assert!(matches!(err, Err(RegistryError::NameInUse(_))));
    }

    #[tokio::test]
    async fn test_concurrent_add_source_exactly_one_wins() {
        let registry = registry();
        let key = key("live/foo");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .add_source(&key, Arc::new(RecordingProducer::new()), None)
                    .await
            }));
        }

        let mut won = 0;
        let mut collided = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(RegistryError::NameInUse(_)) => collided += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(collided, 7);
    }

    #[tokio::test]
    async fn test_generation_monotonicity() {
        let registry = registry();
        let key = key("live/foo");
        let sink = Arc::new(RecordingSink::new());

        let (_, gen1) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        registry.add_sink(&key, "s1", sink.clone()).await.unwrap();

        registry.del_source(&key, gen1).await.unwrap();
        let (source, gen2) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        assert_eq!(gen2, 2);

        // A delayed teardown from the first tenure changes nothing
        registry.del_source(&key, gen1).await.unwrap();
        assert!(source.is_producing().await);
    }

    #[tokio::test]
    async fn test_cleanup_on_empty_transition() {
        let registry = registry();
        let key = key("live/foo");

        let (_, generation) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        registry
            .add_sink(&key, "s1", Arc::new(RecordingSink::new()))
            .await
            .unwrap();

        // Still producing after the last sink detaches
        registry.del_sink(&key, "s1").await.unwrap();
        assert!(registry.get_source(&key).await.is_some());

        // Producer gone too: the name is no longer resolvable
        registry.del_source(&key, generation).await.unwrap();
        assert!(registry.get_source(&key).await.is_none());
        assert_eq!(registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_idle_source_with_sinks_survives_del_source() {
        let registry = registry();
        let key = key("live/foo");

        let (_, generation) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        let sink = Arc::new(RecordingSink::new());
        registry.add_sink(&key, "s1", sink.clone()).await.unwrap();

        registry.del_source(&key, generation).await.unwrap();
        assert!(registry.get_source(&key).await.is_some());
        assert_eq!(sink.stops(), 1);

        // The remaining sink detaching removes the idle source
        registry.del_sink(&key, "s1").await.unwrap();
        assert!(registry.get_source(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_blacklist_precedence() {
        let registry = registry();
        let foo = key("live/foo");

        let producer = Arc::new(RecordingProducer::new());
        registry.add_source(&foo, producer.clone(), None).await.unwrap();

        registry.add_blacklist(["foo".to_string()]).await;
        // Not enabled yet: nothing happens
        assert!(registry.get_source(&foo).await.is_some());

        registry.set_blacklist_enabled(true).await;
        assert!(producer.was_force_closed());
        assert!(registry.get_source(&foo).await.is_none());

        let err = registry
            .add_source(&foo, Arc::new(RecordingProducer::new()), None)
            .await;
        assert!(matches!(err, Err(RegistryError::NameRejected(_))));

        // Other names are unaffected
        registry
            .add_source(&key("live/bar"), Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_adding_to_enabled_blacklist_evicts() {
        let registry = registry();
        let key = key("live/foo");

        registry.set_blacklist_enabled(true).await;
        let producer = Arc::new(RecordingProducer::new());
        registry.add_source(&key, producer.clone(), None).await.unwrap();

        registry.add_blacklist(["foo".to_string()]).await;
        assert!(producer.was_force_closed());
        assert!(registry.get_source(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_whitelist_semantics() {
        let registry = registry();

        registry.add_whitelist(["allowed".to_string()]).await;
        registry.set_whitelist_enabled(true).await;

        registry
            .add_source(&key("live/allowed"), Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        let err = registry
            .add_source(&key("live/other"), Arc::new(RecordingProducer::new()), None)
            .await;
        assert!(matches!(err, Err(RegistryError::NameRejected(_))));
    }

    #[tokio::test]
    async fn test_enabling_whitelist_evicts_unlisted() {
        let registry = registry();
        let producer = Arc::new(RecordingProducer::new());
        registry
            .add_source(&key("live/other"), producer.clone(), None)
            .await
            .unwrap();

        registry.add_whitelist(["allowed".to_string()]).await;
        registry.set_whitelist_enabled(true).await;

        assert!(producer.was_force_closed());
        assert!(registry.get_source(&key("live/other")).await.is_none());
    }

    #[tokio::test]
    async fn test_live_list_and_consumer_count() {
        let registry = registry();
        let foo = key("live/foo");

        let addr: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        registry
            .add_source(&foo, Arc::new(RecordingProducer::new()), Some(addr))
            .await
            .unwrap();
        registry
            .add_sink(&foo, "s1", Arc::new(RecordingSink::new()))
            .await
            .unwrap();
        registry
            .add_sink(&foo, "s2", Arc::new(RecordingSink::new()))
            .await
            .unwrap();

        assert_eq!(registry.consumer_count(&foo).await, 2);
        assert_eq!(registry.consumer_count(&key("live/nope")).await, 0);

        let list = registry.live_list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].key, foo);
        assert_eq!(list[0].consumer_count, 2);
        assert_eq!(list[0].remote_addr, Some(addr));
    }

    #[tokio::test]
    async fn test_add_sink_without_connector_fails_not_found() {
        let registry = registry();
        let sink = Arc::new(RecordingSink::new());

        let err = registry.add_sink(&key("live/none"), "s1", sink.clone()).await;
        assert!(matches!(err, Err(RegistryError::NotFound(_))));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_single_flight() {
        let connector = Arc::new(StubConnector::ok());
        let registry = pulling_registry(connector.clone());
        let key = key("live/foo");

        let mut handles = Vec::new();
        let mut sinks = Vec::new();
        for i in 0..5 {
            let sink = Arc::new(RecordingSink::new());
            sinks.push(sink.clone());
            let registry = Arc::clone(&registry);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                registry.add_sink(&key, &format!("s{}", i), sink).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // N concurrent attaches, exactly one upstream connect
        assert_eq!(connector.attempt_count(), 1);
        assert_eq!(registry.consumer_count(&key).await, 5);

        // Every waiter observes the same stream
        connector
            .feeder()
            .send(Frame::video(0, Bytes::from_static(&[0x17, 0x01]), true, false))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        for sink in sinks {
            assert_eq!(sink.frames().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_local_producer_resolves_waiting_pull() {
        let connector = Arc::new(StubConnector::hanging());
        let registry = pulling_registry(connector);
        let key = key("live/foo");

        let sink = Arc::new(RecordingSink::new());
        let attach = {
            let registry = Arc::clone(&registry);
            let key = key.clone();
            let sink = sink.clone();
            tokio::spawn(async move { registry.add_sink(&key, "s1", sink).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        // A local publisher shows up while the pull hangs; the waiter
        // attaches to it instead.
        let (source, _) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        attach.await.unwrap().unwrap();

        assert_eq!(source.sink_count().await, 1);
        assert_eq!(sink.starts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pull_handoff_timeout() {
        let connector = Arc::new(StubConnector::hanging());
        let config = RegistryConfig::new()
            .pull_timeout_secs(1)
            .connect_timeout_secs(600)
            .upstream(upstream("origin"));
        let registry = Arc::new(Registry::with_connector(config, connector));

        let err = registry
            .add_sink(&key("live/foo"), "s1", Arc::new(RecordingSink::new()))
            .await;
        assert!(matches!(err, Err(RegistryError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_upstream_catalog_management() {
        let registry = registry();

        registry.add_upstream(upstream("a")).await.unwrap();
        let err = registry.add_upstream(upstream("a")).await;
        assert!(matches!(err, Err(RegistryError::UpstreamExists(_))));

        assert_eq!(registry.upstream_list().await.len(), 1);
        registry.remove_upstream(&upstream("a")).await.unwrap();
        assert!(registry.upstream_list().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_takeover_scenario() {
        // The full lifecycle: collide, tear down, then a viewer whose pull
        // finds no reachable upstream.
        let connector = Arc::new(StubConnector::failing());
        let config = RegistryConfig::new()
            .pull_timeout_secs(60)
            .connect_timeout_secs(1)
            .upstream(upstream("origin"));
        let registry = Arc::new(Registry::with_connector(config, connector));
        let key = key("live/foo");

        let (_, gen1) = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await
            .unwrap();
        assert_eq!(gen1, 1);

        let err = registry
            .add_source(&key, Arc::new(RecordingProducer::new()), None)
            .await;
        assert!(matches!(err, Err(RegistryError::NameInUse(_))));

        registry.del_source(&key, gen1).await.unwrap();
        assert!(registry.get_source(&key).await.is_none());

        let sink = Arc::new(RecordingSink::new());
        let err = registry.add_sink(&key, "s1", sink.clone()).await;
        assert!(matches!(err, Err(RegistryError::NotFound(_))));
        assert!(sink.frames().is_empty());
        assert_eq!(sink.starts(), 0);
    }
}
