//! # Pulse Client
//!
//! A listener for the Pulse signal channel that survives disconnects.
//!
//! This crate provides:
//! - A sans-I/O state machine for connect, keep-alive and reconnect
//! - An async driver running that machine over tokio-tungstenite
//! - A [`SignalHandler`] trait for surfacing received signals
//!
//! Reconnection is unconditional: after any close or error the client waits
//! a fixed delay and tries again, with no attempt limit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod handler;
pub mod message;
pub mod state;

pub use client::ReconnectingClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use handler::{LoggingHandler, SignalHandler};
pub use message::{Inbound, OutboundMessage, decode_inbound};
pub use state::{ClientAction, ClientEvent, ClientMachine, ClientState};
