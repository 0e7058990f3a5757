use crate::error::{ClientError, Result};
use crate::log_entry::LogEntry;
use crate::protocol::Inbound;
use crate::status::{transition, ConnectionStatus, StatusEvent};
use crate::transport::{self, Connection, TransportEvent};
use crate::view::LogView;
use log::{debug, error, info, warn};

/// Status text shown when `connect` is called while a connection exists.
pub const ALREADY_CONNECTED: &str = "Already connected or connecting.";

/// Log view contents while the handshake is in progress.
pub const CONNECTING_PLACEHOLDER: &str = "Attempting to establish WebSocket connection...";

struct ActiveConnection {
    transport: Connection,
    /// Sent as the first frame once the transport opens, then dropped.
    credential: Option<String>,
    closing: bool,
}

/// Authenticating log-stream client bound to a single view.
///
/// Holds at most one connection. All state changes happen in `connect`,
/// `disconnect` and `handle_event`, which the owner drives from one task.
pub struct LogStreamClient<V: LogView> {
    endpoint: String,
    view: V,
    status: ConnectionStatus,
    connection: Option<ActiveConnection>,
    auth_rejected: bool,
}

impl<V: LogView> LogStreamClient<V> {
    pub fn new(endpoint: impl Into<String>, view: V) -> Self {
        Self {
            endpoint: endpoint.into(),
            view,
            status: ConnectionStatus::default(),
            connection: None,
            auth_rejected: false,
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// True if the server rejected the credential of the latest connection.
    pub fn auth_rejected(&self) -> bool {
        self.auth_rejected
    }

    /// True while the connection slot is occupied.
    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    /// Starts a connection and queues `credential` as the handshake.
    ///
    /// A second call while a connection exists only updates the status text.
    /// Setup failures are shown in the status line and also returned.
    pub fn connect(&mut self, credential: &str) -> Result<()> {
        if self.connection.is_some() {
            warn!("Connect requested while a connection is active");
            self.view.set_status(ALREADY_CONNECTED);
            return Ok(());
        }

        self.auth_rejected = false;
        self.apply(StatusEvent::ConnectRequested);
        self.view.show_placeholder(CONNECTING_PLACEHOLDER);

        let request = match transport::request(&self.endpoint) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to set up connection to {}: {}", self.endpoint, e);
                self.apply(StatusEvent::SetupFailed(e.to_string()));
                return Err(e);
            }
        };

        info!("Connecting to {}", self.endpoint);
        self.connection = Some(ActiveConnection {
            transport: transport::open(request),
            credential: Some(credential.to_string()),
            closing: false,
        });

        Ok(())
    }

    /// Requests a graceful close. Status and slot are updated when the
    /// close event arrives.
    pub fn disconnect(&mut self) {
        let Some(conn) = self.connection.as_mut() else {
            return;
        };

        conn.closing = true;
        match conn.transport.close() {
            Ok(()) => debug!("Close requested"),
            Err(ClientError::ChannelClosed) => debug!("Transport already finished"),
            Err(e) => error!("Failed to request close: {}", e),
        }
    }

    /// Waits for the next event of the current connection.
    ///
    /// Returns `None` when no connection is held. A transport task that
    /// ends without reporting a close is treated as closed.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        let conn = self.connection.as_mut()?;
        Some(conn.transport.recv().await.unwrap_or(TransportEvent::Closed))
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Error(detail) => {
                error!("WebSocket error: {}", detail);
                self.apply(StatusEvent::TransportFailed);
            }
            TransportEvent::Closed => {
                info!("Disconnected from {}", self.endpoint);
                self.connection = None;
                self.apply(StatusEvent::Closed);
            }
        }
    }

    /// Processes events until the connection slot is empty.
    pub async fn run(&mut self) {
        while let Some(event) = self.next_event().await {
            self.handle_event(event);
        }
    }

    fn on_open(&mut self) {
        if self.connection.as_ref().is_some_and(|c| c.closing) {
            debug!("Transport opened after close request, skipping handshake");
            return;
        }

        self.apply(StatusEvent::Opened);

        let Some(conn) = self.connection.as_mut() else {
            return;
        };

        if let Some(credential) = conn.credential.take() {
            debug!("Sending credential");
            if let Err(e) = conn.transport.send(credential) {
                error!("Failed to send credential: {}", e);
            }
        }
    }

    fn on_message(&mut self, text: &str) {
        if self.connection.as_ref().is_some_and(|c| c.closing) {
            debug!("Ignoring message received after close request");
            return;
        }

        match Inbound::parse(text) {
            Inbound::AuthSuccess => {
                info!("Authenticated, streaming logs");
                self.apply(StatusEvent::AuthSucceeded);
                self.view.clear();
            }
            Inbound::AuthFailed => {
                warn!("Server rejected the credential");
                self.auth_rejected = true;
                self.apply(StatusEvent::AuthRejected);
                self.disconnect();
            }
            Inbound::Log(line) => {
                let entry = LogEntry::new(line.to_string());
                self.view.append(&entry);
            }
        }
    }

    fn apply(&mut self, event: StatusEvent) {
        self.status = transition(&self.status, &event);
        self.view.set_status(&self.status.label());
    }
}
