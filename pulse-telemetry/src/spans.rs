//! Span definitions for tracing.
//!
//! Pre-defined spans for the long-lived units of work in Pulse:
//! - Listener connections on the server
//! - Client sessions against a server

use tracing::{Span, info_span};

/// Create a span covering one listener connection on the server.
///
/// # Example
///
/// ```
/// use pulse_telemetry::spans::connection_span;
///
/// let span = connection_span(42);
/// let _guard = span.enter();
/// ```
#[must_use]
pub fn connection_span(connection_id: u64) -> Span {
    info_span!(
        "ws.connection",
        connection_id = connection_id,
        otel.kind = "server"
    )
}

/// Create a span for HTTP request handling.
#[must_use]
pub fn request_span(method: &str, path: &str) -> Span {
    info_span!(
        "request",
        method = %method,
        path = %path,
        otel.kind = "server"
    )
}

/// Create a span covering one client session (one transport lifetime).
#[must_use]
pub fn client_session_span(url: &str, client_name: &str, attempt: u64) -> Span {
    info_span!(
        "ws.session",
        url = %url,
        client = %client_name,
        attempt = attempt,
        otel.kind = "client"
    )
}
