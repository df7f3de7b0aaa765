//! # Pulse API
//!
//! The broadcast channel and the HTTP surface hosting it.
//!
//! This crate provides:
//! - A registry of live listener connections
//! - A broadcaster fanning each signal out to every open listener
//! - A signal generator (on demand and on a timer) with its background ticker
//! - The WebSocket endpoint and a small REST surface
//!
//! # Routes
//!
//! - `GET /ws` - WebSocket upgrade into the channel
//! - `POST /api/signals` - Build a signal from the body and broadcast it
//! - `GET /api/status` - Registered connections and uptime
//! - `GET /health` - Liveness

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod ticker;
pub mod ws;

pub use config::{ApiConfig, CorsConfig};
pub use error::ApiError;
pub use generator::{GeneratorConfig, RandomSource, SignalGenerator, SignalRequest, StdRandom};
pub use server::ApiServer;
pub use state::AppState;
pub use ticker::SignalTicker;
pub use ws::{ConnectionRegistry, SignalBroadcaster, WsConfig};
