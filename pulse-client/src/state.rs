//! Reconnecting client state machine.
//!
//! [`ClientMachine`] performs no I/O. It consumes [`ClientEvent`]s and
//! returns the [`ClientAction`]s the driver must carry out, which keeps
//! every transition testable without sockets or timers.

use pulse_core::error::NetworkError;
use pulse_core::types::Signal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::message::{Inbound, OutboundMessage, decode_inbound};

/// Connection state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientState {
    /// Not connected. A reconnect may be pending.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Connected and identified.
    Connected,
    /// Shut down. Terminal.
    Stopped,
}

impl ClientState {
    /// Returns true if the connection is active.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if a transport exists or is being opened.
    #[must_use]
    pub fn has_transport(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Input to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Start the first connection attempt.
    Connect,
    /// The transport finished its handshake.
    Opened,
    /// The keep-alive timer fired.
    KeepAliveTick,
    /// A text frame arrived.
    Inbound(String),
    /// The peer closed the transport.
    Closed {
        /// Close reason, if the peer sent one
        reason: Option<String>,
    },
    /// The transport failed or a connection attempt failed.
    Failed(NetworkError),
    /// The reconnect delay elapsed.
    ReconnectFired,
    /// Stop for good.
    Shutdown,
}

/// Side effect requested by the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Open a new transport to the configured endpoint.
    OpenTransport,
    /// Send a message on the open transport.
    Send(OutboundMessage),
    /// Start the periodic keep-alive timer.
    StartKeepAlive(Duration),
    /// Stop the keep-alive timer.
    CancelKeepAlive,
    /// Fire `ReconnectFired` after the delay.
    ScheduleReconnect(Duration),
    /// Drop the pending reconnect.
    CancelReconnect,
    /// Close the open transport.
    CloseTransport,
    /// Hand a received signal to the application.
    Deliver(Box<Signal>),
}

/// Sans-I/O reconnecting client.
#[derive(Debug, Clone)]
pub struct ClientMachine {
    state: ClientState,
    client_name: String,
    keepalive_interval: Duration,
    reconnect_delay: Duration,
    keepalive_active: bool,
    reconnect_pending: bool,
    attempts: u64,
}

impl ClientMachine {
    /// Creates a machine in `Disconnected`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            state: ClientState::Disconnected,
            client_name: config.client_name.clone(),
            keepalive_interval: config.keepalive_interval(),
            reconnect_delay: config.reconnect_delay(),
            keepalive_active: false,
            reconnect_pending: false,
            attempts: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Returns whether a keep-alive timer is running.
    #[must_use]
    pub fn keepalive_active(&self) -> bool {
        self.keepalive_active
    }

    /// Returns whether a reconnect is scheduled.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Returns the number of connection attempts started so far.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Applies one event and returns the actions to perform, in order.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<ClientAction> {
        if self.state == ClientState::Stopped {
            return Vec::new();
        }

        match event {
            ClientEvent::Connect => self.on_connect(),
            ClientEvent::Opened => self.on_opened(),
            ClientEvent::KeepAliveTick => self.on_keepalive_tick(),
            ClientEvent::Inbound(text) => self.on_inbound(&text),
            ClientEvent::Closed { reason } => {
                debug!(reason = reason.as_deref().unwrap_or("none"), "Transport closed");
                self.on_transport_lost()
            }
            ClientEvent::Failed(error) => {
                warn!(error = %error, "Transport error");
                self.on_transport_lost()
            }
            ClientEvent::ReconnectFired => self.on_reconnect_fired(),
            ClientEvent::Shutdown => self.on_shutdown(),
        }
    }

    fn on_connect(&mut self) -> Vec<ClientAction> {
        if self.state != ClientState::Disconnected || self.reconnect_pending {
            return Vec::new();
        }
        self.begin_attempt()
    }

    fn on_opened(&mut self) -> Vec<ClientAction> {
        if self.state != ClientState::Connecting {
            return Vec::new();
        }
        self.state = ClientState::Connected;
        self.keepalive_active = true;
        vec![
            ClientAction::Send(OutboundMessage::hello(self.client_name.clone())),
            ClientAction::StartKeepAlive(self.keepalive_interval),
        ]
    }

    fn on_keepalive_tick(&mut self) -> Vec<ClientAction> {
        if self.state != ClientState::Connected {
            return Vec::new();
        }
        vec![ClientAction::Send(OutboundMessage::ping())]
    }

    fn on_inbound(&mut self, text: &str) -> Vec<ClientAction> {
        if self.state != ClientState::Connected {
            return Vec::new();
        }
        match decode_inbound(text) {
            Inbound::Signal(signal) => vec![ClientAction::Deliver(signal)],
            Inbound::Other { kind } => {
                debug!(kind = kind.as_deref().unwrap_or("untyped"), "Ignoring non-signal message");
                Vec::new()
            }
            Inbound::Malformed { reason } => {
                warn!(reason = %reason, "Ignoring malformed message");
                Vec::new()
            }
        }
    }

    fn on_transport_lost(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if self.state.has_transport() {
            self.state = ClientState::Disconnected;
        }
        if self.keepalive_active {
            self.keepalive_active = false;
            actions.push(ClientAction::CancelKeepAlive);
        }
        if self.state == ClientState::Disconnected && !self.reconnect_pending {
            self.reconnect_pending = true;
            actions.push(ClientAction::ScheduleReconnect(self.reconnect_delay));
        }
        actions
    }

    fn on_reconnect_fired(&mut self) -> Vec<ClientAction> {
        if self.state != ClientState::Disconnected || !self.reconnect_pending {
            return Vec::new();
        }
        self.reconnect_pending = false;
        self.begin_attempt()
    }

    fn on_shutdown(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if self.keepalive_active {
            self.keepalive_active = false;
            actions.push(ClientAction::CancelKeepAlive);
        }
        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(ClientAction::CancelReconnect);
        }
        if self.state.has_transport() {
            actions.push(ClientAction::CloseTransport);
        }
        self.state = ClientState::Stopped;
        actions
    }

    fn begin_attempt(&mut self) -> Vec<ClientAction> {
        self.state = ClientState::Connecting;
        self.attempts += 1;
        vec![ClientAction::OpenTransport]
    }
}
