//! Async driver for the reconnecting client.
//!
//! [`ReconnectingClient`] owns a [`ClientMachine`] and turns its actions into
//! socket writes and tokio timers. Each connection attempt runs inside a
//! fresh `ws.session` span.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use pulse_core::error::NetworkError;
use pulse_telemetry::spans::client_session_span;
use std::future::{Future, pending};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until, timeout};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, Span, debug, info, warn};

use crate::config::ClientConfig;
use crate::handler::SignalHandler;
use crate::message::OutboundMessage;
use crate::state::{ClientAction, ClientEvent, ClientMachine, ClientState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// WebSocket listener that reconnects after a fixed delay, forever.
///
/// # Example
///
/// ```no_run
/// use pulse_client::{ClientConfig, LoggingHandler, ReconnectingClient};
///
/// # async fn demo() {
/// let config = ClientConfig::builder().url("ws://127.0.0.1:8080/ws").build();
/// let client = ReconnectingClient::new(config, LoggingHandler);
/// client.run(async { let _ = tokio::signal::ctrl_c().await; }).await;
/// # }
/// ```
pub struct ReconnectingClient {
    config: ClientConfig,
    handler: Arc<dyn SignalHandler>,
}

impl ReconnectingClient {
    /// Creates a client that reports to `handler`.
    #[must_use]
    pub fn new(config: ClientConfig, handler: impl SignalHandler + 'static) -> Self {
        Self::with_handler(config, Arc::new(handler))
    }

    /// Creates a client sharing an existing handler.
    #[must_use]
    pub fn with_handler(config: ClientConfig, handler: Arc<dyn SignalHandler>) -> Self {
        Self { config, handler }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs until `shutdown` resolves and returns the final machine.
    pub async fn run<F>(self, shutdown: F) -> ClientMachine
    where
        F: Future<Output = ()> + Send,
    {
        let mut driver = Driver::new(self.config, self.handler);
        tokio::pin!(shutdown);

        driver.dispatch(ClientEvent::Connect).await;
        while driver.machine.state() != ClientState::Stopped {
            let span = driver.span.clone();
            let event = driver
                .next_event(shutdown.as_mut())
                .instrument(span.clone())
                .await;
            driver.dispatch(event).instrument(span).await;
        }

        info!(attempts = driver.machine.attempts(), "Client stopped");
        driver.machine
    }
}

struct Driver {
    config: ClientConfig,
    handler: Arc<dyn SignalHandler>,
    machine: ClientMachine,
    sink: Option<WsSink>,
    stream: Option<WsSource>,
    keepalive: Option<Interval>,
    reconnect_at: Option<Instant>,
    open_requested: bool,
    span: Span,
}

impl Driver {
    fn new(config: ClientConfig, handler: Arc<dyn SignalHandler>) -> Self {
        let machine = ClientMachine::new(&config);
        Self {
            config,
            handler,
            machine,
            sink: None,
            stream: None,
            keepalive: None,
            reconnect_at: None,
            open_requested: false,
            span: Span::none(),
        }
    }

    /// Waits for whatever happens next.
    async fn next_event<F>(&mut self, mut shutdown: Pin<&mut F>) -> ClientEvent
    where
        F: Future<Output = ()>,
    {
        if std::mem::take(&mut self.open_requested) {
            let outcome = tokio::select! {
                biased;
                () = &mut shutdown => return ClientEvent::Shutdown,
                outcome = connect(&self.config) => outcome,
            };
            return match outcome {
                Ok(ws) => {
                    let (sink, stream) = ws.split();
                    self.sink = Some(sink);
                    self.stream = Some(stream);
                    ClientEvent::Opened
                }
                Err(e) => ClientEvent::Failed(e),
            };
        }

        tokio::select! {
            biased;
            () = &mut shutdown => ClientEvent::Shutdown,
            event = next_frame(&mut self.stream) => event,
            () = keepalive_tick(&mut self.keepalive) => ClientEvent::KeepAliveTick,
            () = reconnect_due(self.reconnect_at) => ClientEvent::ReconnectFired,
        }
    }

    async fn dispatch(&mut self, event: ClientEvent) {
        let was_connected = self.machine.state().is_connected();
        let opened = event == ClientEvent::Opened;
        let reason = match &event {
            ClientEvent::Closed { reason } => reason.clone(),
            ClientEvent::Failed(e) => Some(e.to_string()),
            ClientEvent::Shutdown => Some("shutdown".to_string()),
            _ => None,
        };
        if event == ClientEvent::ReconnectFired {
            self.reconnect_at = None;
        }

        for action in self.machine.handle(event) {
            self.execute(action).await;
        }

        let state = self.machine.state();
        if !state.has_transport() {
            self.sink = None;
            self.stream = None;
        }
        if opened && state.is_connected() {
            info!("Connected");
            self.handler.on_connected().await;
        }
        if was_connected && !state.is_connected() {
            info!(reason = reason.as_deref().unwrap_or("unknown"), "Disconnected");
            self.handler.on_disconnected(reason).await;
        }
    }

    async fn execute(&mut self, action: ClientAction) {
        match action {
            ClientAction::OpenTransport => {
                self.span = client_session_span(
                    &self.config.url,
                    &self.config.client_name,
                    self.machine.attempts(),
                );
                self.open_requested = true;
            }
            ClientAction::Send(message) => self.send(&message).await,
            ClientAction::StartKeepAlive(period) => {
                let period = period.max(Duration::from_millis(1));
                let mut keepalive = interval_at(Instant::now() + period, period);
                keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.keepalive = Some(keepalive);
            }
            ClientAction::CancelKeepAlive => self.keepalive = None,
            ClientAction::ScheduleReconnect(delay) => {
                info!(delay_ms = delay.as_millis(), "Reconnect scheduled");
                self.reconnect_at = Some(Instant::now() + delay);
            }
            ClientAction::CancelReconnect => self.reconnect_at = None,
            ClientAction::CloseTransport => {
                if let Some(mut sink) = self.sink.take() {
                    if let Err(e) = sink.close().await {
                        debug!(error = %e, "Close handshake failed");
                    }
                }
            }
            ClientAction::Deliver(signal) => self.handler.on_signal(*signal).await,
        }
    }

    async fn send(&mut self, message: &OutboundMessage) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        match message.to_json() {
            Ok(json) => {
                if let Err(e) = sink.send(Message::Text(json.into())).await {
                    warn!(error = %e, "Failed to send message");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize message"),
        }
    }
}

async fn connect(config: &ClientConfig) -> Result<WsStream, NetworkError> {
    debug!(url = %config.url, "Connecting");
    let (ws, _response) = timeout(config.connect_timeout(), connect_async(config.url.as_str()))
        .await
        .map_err(|_| NetworkError::Timeout {
            timeout_ms: config.connect_timeout_ms,
        })?
        .map_err(|e| NetworkError::ConnectionFailed {
            reason: e.to_string(),
        })?;
    Ok(ws)
}

/// Reads until a frame the machine cares about arrives.
async fn next_frame(stream: &mut Option<WsSource>) -> ClientEvent {
    let Some(stream) = stream.as_mut() else {
        return pending().await;
    };
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return ClientEvent::Inbound(text.as_str().to_owned()),
            Some(Ok(Message::Close(frame))) => {
                return ClientEvent::Closed {
                    reason: frame.map(|f| f.reason.as_str().to_owned()),
                };
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return ClientEvent::Failed(NetworkError::WebSocket {
                    reason: e.to_string(),
                });
            }
            None => {
                return ClientEvent::Closed {
                    reason: Some("stream ended".to_string()),
                };
            }
        }
    }
}

async fn keepalive_tick(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(keepalive) => {
            keepalive.tick().await;
        }
        None => pending().await,
    }
}

async fn reconnect_due(at: Option<Instant>) {
    match at {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_keepalive_tick_waits_a_full_period() {
        let period = Duration::from_secs(30);
        let mut keepalive = Some(interval_at(Instant::now() + period, period));
        let start = Instant::now();

        keepalive_tick(&mut keepalive).await;
        assert_eq!(start.elapsed(), period);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_timers_never_fire() {
        let mut keepalive = None;
        let idle = tokio::time::timeout(Duration::from_secs(3600), async {
            tokio::select! {
                () = keepalive_tick(&mut keepalive) => {}
                () = reconnect_due(None) => {}
            }
        })
        .await;
        assert!(idle.is_err());
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_failed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::builder().url(format!("ws://{addr}/ws")).build();
        let err = connect(&config).await.unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionFailed { .. }));
    }

    #[tokio::test]
    async fn test_shutdown_before_connect_completes() {
        let config = ClientConfig::builder()
            .url("ws://127.0.0.1:9/ws")
            .reconnect_delay(Duration::from_secs(60))
            .build();
        let client = ReconnectingClient::new(config, crate::handler::LoggingHandler);

        let machine = client.run(async {}).await;
        assert_eq!(machine.state(), ClientState::Stopped);
        assert!(!machine.reconnect_pending());
        assert!(!machine.keepalive_active());
    }
}
