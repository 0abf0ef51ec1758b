//! Shared test doubles
//!
//! Recording implementations of the adapter-facing traits, used across the
//! registry and upstream test modules.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::registry::error::RegistryError;
use crate::registry::frame::{Frame, StreamKey};
use crate::registry::handler::{Producer, SinkGone, SinkHandler};
use crate::upstream::catalog::UpstreamApp;
use crate::upstream::connector::{UpstreamConnector, UpstreamSession};

/// Install a subscriber once so `RUST_LOG=streamhub_rs=trace cargo test`
/// shows broker activity for a failing test.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One observed sink notification
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SinkEvent {
    Start,
    Stop,
    Frame(Frame),
}

/// Sink handler that records every notification
pub(crate) struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    dead: AtomicBool,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            dead: AtomicBool::new(false),
        }
    }

    /// Make every subsequent frame delivery fail
    pub(crate) fn kill(&self) {
        self.dead.store(true, Ordering::SeqCst);
    }

    pub(crate) fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn frames(&self) -> Vec<Frame> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Frame(frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn starts(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Start))
            .count()
    }

    pub(crate) fn stops(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Stop))
            .count()
    }
}

impl SinkHandler for RecordingSink {
    fn on_start(&self) {
        self.events.lock().unwrap().push(SinkEvent::Start);
    }

    fn on_stop(&self) {
        self.events.lock().unwrap().push(SinkEvent::Stop);
    }

    fn on_frame(&self, frame: Frame) -> Result<(), SinkGone> {
        if self.dead.load(Ordering::SeqCst) {
            return Err(SinkGone);
        }
        self.events.lock().unwrap().push(SinkEvent::Frame(frame));
        Ok(())
    }
}

/// Producer handle that records the force-closed notification
pub(crate) struct RecordingProducer {
    force_closed: AtomicBool,
}

impl RecordingProducer {
    pub(crate) fn new() -> Self {
        Self {
            force_closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn was_force_closed(&self) -> bool {
        self.force_closed.load(Ordering::SeqCst)
    }
}

impl Producer for RecordingProducer {
    fn on_force_closed(&self) {
        self.force_closed.store(true, Ordering::SeqCst);
    }
}

/// Scripted upstream connector
///
/// Records every connect attempt. Successful connects hand out a session
/// whose feeder the test drives.
pub(crate) struct StubConnector {
    fail_all: bool,
    hang: bool,
    fail_addresses: HashSet<String>,
    attempts: Mutex<Vec<String>>,
    feeders: Mutex<Vec<mpsc::Sender<Frame>>>,
}

impl StubConnector {
    /// Connector where every candidate succeeds
    pub(crate) fn ok() -> Self {
        Self {
            fail_all: false,
            hang: false,
            fail_addresses: HashSet::new(),
            attempts: Mutex::new(Vec::new()),
            feeders: Mutex::new(Vec::new()),
        }
    }

    /// Connector where every candidate fails immediately
    pub(crate) fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::ok()
        }
    }

    /// Connector that never completes a connect
    pub(crate) fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::ok()
        }
    }

    /// Fail connects to one address while others succeed
    pub(crate) fn fail_address(mut self, address: &str) -> Self {
        self.fail_addresses.insert(address.to_string());
        self
    }

    /// Addresses attempted, in order
    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Number of sessions handed out
    pub(crate) fn session_count(&self) -> usize {
        self.feeders.lock().unwrap().len()
    }

    /// Feeder for the most recent session
    pub(crate) fn feeder(&self) -> mpsc::Sender<Frame> {
        self.feeders
            .lock()
            .unwrap()
            .last()
            .expect("no session established")
            .clone()
    }

    /// Drop every feeder, ending the sessions from the upstream side
    pub(crate) fn close_feeders(&self) {
        self.feeders.lock().unwrap().clear();
    }
}

#[async_trait]
impl UpstreamConnector for StubConnector {
    async fn connect(
        &self,
        upstream: &UpstreamApp,
        key: &StreamKey,
    ) -> Result<UpstreamSession, RegistryError> {
        self.attempts.lock().unwrap().push(upstream.address.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail_all || self.fail_addresses.contains(&upstream.address) {
            return Err(RegistryError::NotFound(key.clone()));
        }

        let (tx, rx) = mpsc::channel(64);
        self.feeders.lock().unwrap().push(tx);
        let addr: SocketAddr = "127.0.0.1:1935".parse().unwrap();
        Ok(UpstreamSession::new(Some(addr), rx))
    }
}
