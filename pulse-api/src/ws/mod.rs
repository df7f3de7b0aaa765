//! WebSocket broadcast channel.
//!
//! ```text
//!   listener ──upgrade──▶ handler ──register──▶ ConnectionRegistry
//!                                                   │ snapshot
//!   trigger / ticker ──▶ SignalBroadcaster ─────────┘
//!                            │ try_send(Arc<str>)
//!                            ▼
//!                  per-connection queue ──▶ writer task ──▶ socket
//! ```
//!
//! A connection is greeted with a `welcome` message, then marked `Open`;
//! only open connections receive signals.

pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod handler;
pub mod message;

pub use broadcaster::SignalBroadcaster;
pub use config::WsConfig;
pub use connection::{ConnectionId, ConnectionRegistry, ListenerConnection, ReadyState};
pub use handler::ws_handler;
pub use message::{ClientMessage, ServerMessage};
