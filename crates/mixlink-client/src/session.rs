//! Session and connection management
//!
//! One [`Session`] per configured device. `start` never blocks: it hands
//! back the session and its event stream immediately and drives the
//! connection on a spawned task: validation, DNS resolution, socket bind,
//! then the receive loop. Status is observable at any time and every change
//! is mirrored onto the event stream.
//!
//! Liveness is passive: any inbound datagram while connected counts as
//! proof of life. The one-shot `/sync` probe shortly after connect asks the
//! device for a full state dump; there is no periodic re-sync in steady
//! state. A `/ping` probe can be sent on demand.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use mixlink_core::codec::OscMessage;
use mixlink_core::{device_path, encode_message, variable_id, OscArg, SavedGains, StateStore, StoreUpdate};
use mixlink_transport::{Reassembler, TransportEvent, TransportSender, UdpSender, UdpTransport};

use crate::config::DeviceConfig;
use crate::error::{ClientError, Result};

/// Settle time before the one-shot full-state request
const SYNC_DELAY: Duration = Duration::from_secs(1);

/// Event channel depth; feedback bursts from a full sync fit comfortably
const EVENT_CAPACITY: usize = 256;

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Configuration is missing required fields; nothing will be attempted
    Unconfigured,
    /// Resolving / binding
    Connecting,
    /// Socket is up; refreshed by any inbound datagram
    Connected,
    /// Resolution or bind failed; requires reconfiguration to retry
    Failed,
}

/// Events surfaced to the host environment
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Connection status changed
    Status {
        status: ConnectionStatus,
        label: String,
    },
    /// A variable was registered or its value changed
    Variable { id: String, value: String },
}

pub(crate) struct Shared {
    pub(crate) config: DeviceConfig,
    pub(crate) status: RwLock<ConnectionStatus>,
    pub(crate) store: Mutex<StateStore>,
    pub(crate) saved: Mutex<SavedGains>,
    pub(crate) sender: RwLock<Option<UdpSender>>,
    pub(crate) local_addr: RwLock<Option<SocketAddr>>,
    pub(crate) events: mpsc::Sender<DeviceEvent>,
}

impl Shared {
    fn new(config: DeviceConfig, events: mpsc::Sender<DeviceEvent>) -> Self {
        Self {
            config,
            status: RwLock::new(ConnectionStatus::Unconfigured),
            store: Mutex::new(StateStore::new()),
            saved: Mutex::new(SavedGains::new()),
            sender: RwLock::new(None),
            local_addr: RwLock::new(None),
            events,
        }
    }
}

/// A connection to one device
pub struct Session {
    pub(crate) shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Start a session. Returns immediately; connection progress arrives as
    /// [`DeviceEvent::Status`] events. A config that fails validation
    /// surfaces as a terminal `Unconfigured` status; operations stay
    /// callable but inert.
    pub fn start(config: DeviceConfig) -> (Self, mpsc::Receiver<DeviceEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared::new(config, tx));

        let session = Session {
            shared: shared.clone(),
            tasks: Mutex::new(Vec::new()),
        };

        let run_handle = tokio::spawn(run(shared));
        session.tasks.lock().push(run_handle);

        (session, rx)
    }

    /// Current connection status
    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status.read()
    }

    /// Short display label for status surfaces
    pub fn label(&self) -> String {
        self.shared.config.display_label()
    }

    /// Local feedback address once bound (ephemeral ports become concrete)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.shared.local_addr.read()
    }

    /// Send a liveness probe. The device echoes a path-only `/ping` frame;
    /// any reply datagram refreshes `Connected`.
    pub async fn ping(&self) {
        send_command(&self.shared, "/ping", &[]).await;
    }

    /// Request a full state dump
    pub async fn sync(&self) {
        send_command(&self.shared, "/sync", &[]).await;
    }

    /// Tear the session down: stop the receive loop and pending probes,
    /// drop the socket, clear all in-memory state. Reconfiguration is a
    /// `shutdown` followed by a fresh `start` with the new config.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        *self.shared.sender.write() = None;
        *self.shared.local_addr.write() = None;
        self.shared.store.lock().clear();
        self.shared.saved.lock().clear();
        debug!("session for {} shut down", self.shared.config.display_label());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

/// Connection driver + receive loop; the session's main task
async fn run(shared: Arc<Shared>) {
    if let Err(e) = shared.config.validate() {
        warn!("session not started: {}", e);
        set_status(&shared, ConnectionStatus::Unconfigured).await;
        return;
    }

    set_status(&shared, ConnectionStatus::Connecting).await;

    let host = shared.config.host.trim().to_string();
    let ip = match resolve_host(&host, shared.config.target_port).await {
        Ok(ip) => ip,
        Err(e) => {
            warn!("{}", e);
            set_status(&shared, ConnectionStatus::Failed).await;
            return;
        }
    };
    let remote = SocketAddr::new(IpAddr::V4(ip), shared.config.target_port);

    let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), shared.config.feedback_port);
    let transport = match UdpTransport::bind(bind_addr).await {
        Ok(t) => t,
        Err(e) => {
            warn!("could not open feedback socket on {}: {}", bind_addr, e);
            set_status(&shared, ConnectionStatus::Failed).await;
            return;
        }
    };

    let local = transport.local_addr().ok();
    *shared.local_addr.write() = local;
    *shared.sender.write() = Some(transport.sender_to(remote));
    let mut receiver = transport.start_receiver();

    info!(
        "connected to {} at {} (feedback on {:?})",
        shared.config.display_label(),
        remote,
        local
    );
    set_status(&shared, ConnectionStatus::Connected).await;

    // One-shot full-state request once the device has seen our first packets
    let sync_shared = shared.clone();
    tokio::spawn(async move {
        tokio::time::sleep(SYNC_DELAY).await;
        send_command(&sync_shared, "/sync", &[]).await;
    });

    let mut reassembler = Reassembler::new();
    while let Some((event, from)) = receiver.recv_from().await {
        match event {
            TransportEvent::Data(data) => {
                touch_liveness(&shared).await;
                for msg in reassembler.push(&data) {
                    handle_message(&shared, msg).await;
                }
            }
            TransportEvent::Error(e) => {
                warn!("receive error from {}: {}", from, e);
            }
        }
    }
}

/// Resolve a host to an IPv4 address; literal addresses skip DNS
async fn resolve_host(host: &str, port: u16) -> Result<Ipv4Addr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ClientError::ResolveFailed {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
    addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ClientError::ResolveFailed {
            host: host.to_string(),
            reason: "no A record".to_string(),
        })
}

/// Any inbound datagram is proof of life
async fn touch_liveness(shared: &Arc<Shared>) {
    let refreshed = {
        let status = shared.status.read();
        *status != ConnectionStatus::Connected
    };
    if refreshed {
        set_status(shared, ConnectionStatus::Connected).await;
    }
}

async fn set_status(shared: &Arc<Shared>, status: ConnectionStatus) {
    *shared.status.write() = status;
    let _ = shared
        .events
        .send(DeviceEvent::Status {
            status,
            label: shared.config.display_label(),
        })
        .await;
}

/// Map one inbound message into the store and notify observers
async fn handle_message(shared: &Arc<Shared>, msg: OscMessage) {
    let id = variable_id(&msg.addr, shared.config.trimmed_name());
    if id.is_empty() {
        debug!("ignoring message with empty id from {}", msg.addr);
        return;
    }
    // Argument-less reports (probe echoes) register as an event marker
    let value = msg
        .args
        .first()
        .map(OscArg::format)
        .unwrap_or_else(|| "1".to_string());
    store_and_notify(shared, id, value).await;
}

/// Write to the store; emit a variable event unless the value is unchanged
pub(crate) async fn store_and_notify(shared: &Arc<Shared>, id: String, value: String) {
    let update = shared.store.lock().insert(&id, value.clone());
    if update != StoreUpdate::Unchanged {
        let _ = shared.events.send(DeviceEvent::Variable { id, value }).await;
    }
}

/// Encode and transmit one command, fire-and-forget. Send problems are
/// logged and swallowed (UDP gives no acknowledgment either way), and a
/// session without a socket (failed or unconfigured) drops commands
/// silently, leaving operations registered but inert.
pub(crate) async fn send_command(shared: &Arc<Shared>, logical: &str, args: &[OscArg]) {
    let sender = { shared.sender.read().clone() };
    let Some(sender) = sender else {
        debug!("no socket, dropping command {}", logical);
        return;
    };

    let path = device_path(logical, shared.config.trimmed_name());
    match encode_message(&path, args) {
        Ok(bytes) => {
            if let Err(e) = sender.send(bytes).await {
                warn!("send failed for {}: {}", path, e);
            }
        }
        Err(e) => warn!("could not encode {}: {}", path, e),
    }
}
