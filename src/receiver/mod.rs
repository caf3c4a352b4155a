//! UDP receiver with a dedicated background thread
//!
//! The receiver owns a socket and a receive thread that decodes every datagram and
//! writes accepted samples into a shared [`SampleStore`]. It never calls a sink: the
//! publish side reads the store on its own schedule.
//!
//! ## Lifecycle
//!
//! `Idle -> Running -> Stopping -> Stopped`. A failed [`Receiver::start`] leaves the
//! receiver `Idle` with a [`ReceiverStatus::DeviceNotFound`] status and no thread.
//! [`Receiver::stop`] cancels the loop, joins the thread and closes the socket; it is
//! idempotent and also runs on drop.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use freed_link::{Endpoint, Receiver, ReceiverConfig, SampleStore};
//!
//! # fn main() -> freed_link::Result<()> {
//! let store = Arc::new(SampleStore::new());
//! let endpoint: Endpoint = "0.0.0.0:6301".parse()?;
//! let mut receiver = Receiver::new(endpoint, ReceiverConfig::default(), Arc::clone(&store));
//! receiver.start()?;
//! // ... read `store` from another thread ...
//! receiver.stop()?;
//! # Ok(())
//! # }
//! ```

mod socket;
mod stats;

pub use stats::{ReceiverStats, ReceiverStatsSnapshot};

use std::fmt;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mio::{Events, Interest, Poll, Token};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, trace, warn};

use crate::codec;
use crate::config::ReceiverConfig;
use crate::store::SampleStore;
use crate::types::Endpoint;
use crate::{FreedError, Result};

/// Largest datagram we will read; anything bigger than a D1 packet is rejected by length.
const MAX_DATAGRAM_SIZE: usize = 65_536;

/// Consecutive receive errors tolerated in one drain before waiting again.
const MAX_CONSECUTIVE_ERRORS: u32 = 10;

const SOCKET: Token = Token(0);

static THREAD_INDEX: AtomicUsize = AtomicUsize::new(0);

/// Lifecycle state of a [`Receiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl ReceiverState {
    pub fn as_str(self) -> &'static str {
        match self {
            ReceiverState::Idle => "idle",
            ReceiverState::Running => "running",
            ReceiverState::Stopping => "stopping",
            ReceiverState::Stopped => "stopped",
        }
    }
}

/// Human-readable operational status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverStatus {
    /// Not started yet
    NotStarted,
    Receiving,
    /// Socket setup failed; the receiver must be reconstructed
    DeviceNotFound { reason: String },
    Stopped,
}

impl fmt::Display for ReceiverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverStatus::NotStarted => f.write_str("Device Not Found"),
            ReceiverStatus::Receiving => f.write_str("Receiving"),
            ReceiverStatus::DeviceNotFound { reason } => write!(f, "Device Not Found: {}", reason),
            ReceiverStatus::Stopped => f.write_str("Stopped"),
        }
    }
}

/// FreeD UDP receiver.
pub struct Receiver {
    endpoint: Endpoint,
    config: ReceiverConfig,
    store: Arc<SampleStore>,
    stats: Arc<ReceiverStats>,
    state: ReceiverState,
    status: ReceiverStatus,
    local_addr: Option<SocketAddr>,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Create an idle receiver. No socket is opened until [`Self::start`].
    pub fn new(endpoint: Endpoint, config: ReceiverConfig, store: Arc<SampleStore>) -> Self {
        Self {
            endpoint,
            config,
            store,
            stats: Arc::new(ReceiverStats::default()),
            state: ReceiverState::Idle,
            status: ReceiverStatus::NotStarted,
            local_addr: None,
            cancel: CancellationToken::new(),
            thread: None,
        }
    }

    /// Create a receiver and start it immediately.
    pub fn spawn(
        endpoint: Endpoint,
        config: ReceiverConfig,
        store: Arc<SampleStore>,
    ) -> Result<Self> {
        let mut receiver = Self::new(endpoint, config, store);
        receiver.start()?;
        Ok(receiver)
    }

    /// Open the socket and spawn the receive thread.
    ///
    /// On failure the receiver stays `Idle`, its status reports why, and no thread
    /// exists.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ReceiverState::Idle {
            return Err(FreedError::InvalidState { operation: "start", state: self.state.as_str() });
        }

        match self.try_start() {
            Ok(()) => {
                self.state = ReceiverState::Running;
                self.status = ReceiverStatus::Receiving;
                info!(
                    endpoint = %self.endpoint,
                    local_addr = ?self.local_addr,
                    "FreeD receiver started"
                );
                Ok(())
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "FreeD receiver failed to start");
                self.status = ReceiverStatus::DeviceNotFound { reason: e.to_string() };
                Err(e)
            }
        }
    }

    fn try_start(&mut self) -> Result<()> {
        self.config.validate()?;

        let socket = socket::open(&self.endpoint, &self.config)
            .map_err(|e| FreedError::socket_error(self.endpoint, e))?;
        let local_addr = socket.local_addr().ok();

        let rx = RxLoop::new(
            socket,
            Arc::clone(&self.store),
            Arc::clone(&self.stats),
            self.cancel.clone(),
            self.config.wait_timeout(),
        )
        .map_err(|e| FreedError::socket_error(self.endpoint, e))?;

        let span = info_span!("freed_rx", endpoint = %self.endpoint);
        let name = format!("freed-rx-{}", THREAD_INDEX.fetch_add(1, Ordering::Relaxed));
        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || {
                let _entered = span.enter();
                rx.run();
            })
            .map_err(|source| FreedError::ThreadSpawn { source })?;

        self.local_addr = local_addr;
        self.thread = Some(thread);
        Ok(())
    }

    /// Stop the receive thread and release the socket.
    ///
    /// No sample is written to the store after this returns. Safe to call any number
    /// of times; only the call that joins a panicked thread reports an error.
    pub fn stop(&mut self) -> Result<()> {
        self.cancel.cancel();

        let Some(thread) = self.thread.take() else {
            if self.state != ReceiverState::Stopped {
                self.state = ReceiverState::Stopped;
                self.status = ReceiverStatus::Stopped;
            }
            return Ok(());
        };

        self.state = ReceiverState::Stopping;
        debug!(endpoint = %self.endpoint, "Waiting for receive thread");
        let joined = thread.join();

        self.state = ReceiverState::Stopped;
        self.status = ReceiverStatus::Stopped;
        self.local_addr = None;

        let stats = self.stats.snapshot();
        info!(
            endpoint = %self.endpoint,
            accepted = stats.accepted,
            rejected = stats.rejected(),
            "FreeD receiver stopped"
        );

        joined.map_err(|_| {
            error!(endpoint = %self.endpoint, "Receive thread panicked");
            FreedError::ThreadPanicked
        })
    }

    /// True while running with a live receive thread (which owns the open socket).
    pub fn is_valid(&self) -> bool {
        self.state == ReceiverState::Running
            && !self.cancel.is_cancelled()
            && self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    pub fn status(&self) -> &ReceiverStatus {
        &self.status
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Address the socket is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn store(&self) -> &Arc<SampleStore> {
        &self.store
    }

    pub fn stats(&self) -> ReceiverStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("status", &self.status)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

/// State owned by the receive thread. Dropping it closes the socket.
struct RxLoop {
    socket: mio::net::UdpSocket,
    poll: Poll,
    events: Events,
    recv_buf: Vec<u8>,
    store: Arc<SampleStore>,
    stats: Arc<ReceiverStats>,
    cancel: CancellationToken,
    wait: Duration,
    /// Set when the last drain stopped before `WouldBlock`
    backlog: bool,
}

impl RxLoop {
    fn new(
        socket: std::net::UdpSocket,
        store: Arc<SampleStore>,
        stats: Arc<ReceiverStats>,
        cancel: CancellationToken,
        wait: Duration,
    ) -> std::io::Result<Self> {
        let mut socket = mio::net::UdpSocket::from_std(socket);
        let poll = Poll::new()?;
        poll.registry().register(&mut socket, SOCKET, Interest::READABLE)?;

        Ok(Self {
            socket,
            poll,
            events: Events::with_capacity(8),
            recv_buf: vec![0u8; MAX_DATAGRAM_SIZE],
            store,
            stats,
            cancel,
            wait,
            backlog: false,
        })
    }

    fn run(mut self) {
        debug!(wait_ms = self.wait.as_millis() as u64, "Receive loop started");

        while !self.cancel.is_cancelled() {
            if !self.turn() {
                break;
            }
        }

        debug!("Receive loop ended");
    }

    /// One bounded wait followed by a drain if anything is pending. Returns false when the
    /// loop must end.
    fn turn(&mut self) -> bool {
        match self.poll.poll(&mut self.events, Some(self.wait)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => return true,
            Err(e) => {
                error!(error = %e, "Readiness wait failed, ending receive loop");
                return false;
            }
        }

        if self.cancel.is_cancelled() {
            return false;
        }

        // No new readiness edge is raised for datagrams an aborted drain left queued
        if !self.events.is_empty() || self.backlog {
            self.backlog = !self.drain();
        }
        true
    }

    /// Read every pending datagram. Readiness is edge-triggered, so this runs until
    /// `WouldBlock`. Returns false if it gave up on consecutive errors first.
    fn drain(&mut self) -> bool {
        let mut consecutive_errors = 0u32;

        while !self.cancel.is_cancelled() {
            match self.socket.recv_from(&mut self.recv_buf) {
                Ok((len, from)) => {
                    consecutive_errors = 0;
                    self.ingest(len, from);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return true,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.stats.record_io_error();
                    consecutive_errors += 1;
                    warn!(
                        error = %e,
                        "recv_from failed ({}/{})", consecutive_errors, MAX_CONSECUTIVE_ERRORS
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn ingest(&self, len: usize, from: SocketAddr) {
        self.stats.record_datagram(len);

        match codec::decode(&self.recv_buf[..len]) {
            Ok(sample) => {
                self.store.record(sample);
                self.stats.record_accepted();
            }
            Err(error) => {
                self.stats.record_rejected(&error);
                trace!(%from, %error, "Dropping datagram");
            }
        }
    }
}
