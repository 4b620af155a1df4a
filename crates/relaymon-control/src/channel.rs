use crate::config::ChannelConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ControlError, Result};
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// Environment variable holding the controller authorization token.
pub const TOKEN_ENV: &str = "RELAYMON_TOKEN";

/// Connection lifecycle of a [`ControlChannel`].
///
/// `Disconnected` and `Connecting` cover the dial phase inside
/// [`ControlChannel::connect`]; a constructed channel starts in `Connected`
/// and [`ControlChannel::run`] drives it through `Closing` to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Closing,
    Closed,
}

/// Establishes transport connections to the controller.
///
/// The channel is generic over this seam so tests can inject dialers that
/// fail on demand; production code uses [`WsDialer`].
#[async_trait]
pub trait Dialer: Send + Sync {
    type Conn: Connection;

    async fn dial(&self, url: &str, token: &str) -> Result<Self::Conn>;
}

/// One established transport connection.
///
/// Owned exclusively by the listener duty once the channel runs; all writes
/// go through this single path.
#[async_trait]
pub trait Connection: Send {
    /// Blocks until the next request arrives.
    async fn read_request(&mut self) -> Result<Request>;

    async fn write_response(&mut self, response: &Response) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

/// Dials WebSocket connections with a bearer-style authorization header.
pub struct WsDialer;

#[async_trait]
impl Dialer for WsDialer {
    type Conn = WsConnection;

    async fn dial(&self, url: &str, token: &str) -> Result<WsConnection> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ControlError::Connect(e.to_string()))?;
        let header = HeaderValue::from_str(&format!("Token {token}"))
            .map_err(|e| ControlError::Connect(e.to_string()))?;
        request.headers_mut().insert("Authorization", header);

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| ControlError::Connect(e.to_string()))?;
        Ok(WsConnection { stream })
    }
}

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn read_request(&mut self) -> Result<Request> {
        loop {
            let message = self
                .stream
                .next()
                .await
                .ok_or_else(|| ControlError::Protocol("connection closed by controller".to_string()))?
                .map_err(|e| ControlError::Protocol(e.to_string()))?;

            match message {
                Message::Text(text) => {
                    return serde_json::from_str(&text)
                        .map_err(|e| ControlError::Protocol(format!("malformed request: {e}")));
                }
                Message::Binary(bytes) => {
                    return serde_json::from_slice(&bytes)
                        .map_err(|e| ControlError::Protocol(format!("malformed request: {e}")));
                }
                Message::Close(_) => {
                    return Err(ControlError::Protocol(
                        "connection closed by controller".to_string(),
                    ));
                }
                // tungstenite answers pings on the next read or write
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn write_response(&mut self, response: &Response) -> Result<()> {
        let payload = serde_json::to_string(response)?;
        self.stream
            .send(Message::Text(payload))
            .await
            .map_err(|e| ControlError::Write(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| ControlError::Write(e.to_string()))
    }
}

/// The persistent channel between this agent and its remote controller.
///
/// [`ControlChannel::connect`] dials until it succeeds or is cancelled;
/// [`ControlChannel::run`] then drives the listener and lifecycle duties
/// until the connection fails or the channel is stopped. Reconnecting after
/// a failure means constructing a fresh channel.
pub struct ControlChannel<C: Connection> {
    config: ChannelConfig,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
    state: ChannelState,
    conn: C,
}

impl<C: Connection> std::fmt::Debug for ControlChannel<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlChannel")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: Connection + 'static> ControlChannel<C> {
    /// Connects to the remote controller.
    ///
    /// The authorization token is read from [`TOKEN_ENV`] and sent on the
    /// handshake. Dial failures are retried every
    /// `config.retry_interval_secs` seconds until the dial succeeds or
    /// `cancel` fires, in which case the last dial error is returned.
    ///
    /// # Errors
    ///
    /// [`ControlError::MissingToken`] if the environment variable is unset
    /// (fatal, never retried); [`ControlError::Connect`] if cancelled while
    /// retrying.
    pub async fn connect<D>(
        config: ChannelConfig,
        dialer: &D,
        dispatcher: Dispatcher,
        cancel: CancellationToken,
    ) -> Result<Self>
    where
        D: Dialer<Conn = C>,
    {
        let token =
            std::env::var(TOKEN_ENV).map_err(|_| ControlError::MissingToken(TOKEN_ENV))?;
        Self::connect_with_token(config, dialer, &token, dispatcher, cancel).await
    }

    pub(crate) async fn connect_with_token<D>(
        mut config: ChannelConfig,
        dialer: &D,
        token: &str,
        dispatcher: Dispatcher,
        cancel: CancellationToken,
    ) -> Result<Self>
    where
        D: Dialer<Conn = C>,
    {
        config.fill_defaults();
        let url = config.url();
        let retry = Duration::from_secs(config.retry_interval_secs);

        tracing::debug!(host = %config.host, "attempting connection to controller");
        let conn = loop {
            match dialer.dial(&url, token).await {
                Ok(conn) => break conn,
                Err(e) => {
                    tracing::error!(
                        host = %config.host,
                        retry_secs = config.retry_interval_secs,
                        error = %e,
                        "failed to connect to controller, retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(e),
                        _ = tokio::time::sleep(retry) => {}
                    }
                }
            }
        };
        tracing::debug!(host = %config.host, "connected to controller");

        Ok(Self {
            config,
            dispatcher,
            cancel,
            state: ChannelState::Connected,
            conn,
        })
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// A handle that stops the channel when cancelled. Cancellation is
    /// one-shot and idempotent; it is safe to trigger from any task.
    pub fn stop_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the channel until the connection fails or the channel is
    /// stopped, then closes the transport exactly once.
    pub async fn run(mut self) -> Result<()> {
        let done = CancellationToken::new();
        let stop = self.cancel.child_token();

        let listener = {
            let done = done.clone();
            let stop = stop.clone();
            let dispatcher = self.dispatcher.clone();
            let conn = self.conn;
            tokio::spawn(async move {
                let _done = done.drop_guard();
                listen(conn, dispatcher, stop).await;
            })
        };

        tokio::select! {
            _ = done.cancelled() => {
                tracing::debug!("listener finished, shutting down channel");
            }
            _ = self.cancel.cancelled() => {
                tracing::info!("closing connection to controller before shutdown");
            }
        }

        self.state = ChannelState::Closing;
        stop.cancel();
        let _ = listener.await;
        self.state = ChannelState::Closed;
        Ok(())
    }
}

/// Inbound listener duty: read one request, dispatch it, write the response.
///
/// Responses are written in the order their requests complete; there is no
/// batching and no concurrent writer. A read failure terminates the loop,
/// which in turn signals the whole channel to stop.
async fn listen<C: Connection>(mut conn: C, dispatcher: Dispatcher, stop: CancellationToken) {
    loop {
        let request = tokio::select! {
            _ = stop.cancelled() => break,
            read = conn.read_request() => match read {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!(error = %e, "error while reading from controller");
                    break;
                }
            }
        };

        tracing::debug!(
            operation = %request.operation,
            uuid = %request.uuid,
            "received request"
        );
        let response = dispatcher.dispatch(&request).await;

        if let Err(e) = conn.write_response(&response).await {
            // the write failure alone does not tear the channel down; a
            // subsequent read failure will
            tracing::warn!(error = %e, uuid = %response.uuid, "failed to write response");
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "error closing connection");
    }
}
