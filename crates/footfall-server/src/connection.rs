//! Per-connection lifecycle: resolve, register, pump, unregister.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use footfall_common::{ConnectionId, PresenceError};
use footfall_config::FootfallConfig;
use footfall_presence::{resolve_country, PresenceHub, Snapshot};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::protocol::{encode_server_message, parse_client_message, ClientMessage, ServerMessage};
use crate::server::ServerContext;

/// Timing knobs for a single connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub handshake_timeout: Duration,
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
    pub geo_timeout: Duration,
    pub trust_forwarded_for: bool,
}

impl ConnectionSettings {
    pub fn from_config(config: &FootfallConfig) -> Self {
        Self {
            handshake_timeout: Duration::from_secs(config.server.handshake_timeout_secs.into()),
            ping_interval: Duration::from_secs(config.server.ping_interval_secs.into()),
            pong_timeout: Duration::from_secs(config.server.pong_timeout_secs.into()),
            geo_timeout: Duration::from_millis(config.geo.timeout_ms.into()),
            trust_forwarded_for: config.server.trust_forwarded_for,
        }
    }
}

/// Why the pump loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    ClientClosed,
    TransportError,
    PongTimeout,
    Shutdown,
    Evicted,
}

/// Drive one visitor connection until it closes.
///
/// The connection is unregistered from the hub on every exit path before
/// the socket is dropped.
pub async fn handle_connection<S>(
    ws: WebSocketStream<S>,
    ip: IpAddr,
    ctx: Arc<ServerContext>,
    shutdown: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Resolve before registering; the lookup must not run under the hub lock.
    let country = resolve_country(ctx.resolver.as_deref(), ip, ctx.settings.geo_timeout).await;
    let (id, mut snapshots) = ctx.hub.connect(country.clone()).await;
    info!(conn = %id, peer = %ip, country = %country, "Visitor connected");

    let (mut sink, mut stream) = ws.split();
    let mut ping = interval(ctx.settings.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first immediate tick.
    ping.tick().await;
    let mut pong_deadline: Option<Instant> = None;

    let reason = loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let frame = CloseFrame {
                    code: CloseCode::Away,
                    reason: "server shutting down".into(),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                break CloseReason::Shutdown;
            }

            // Hub snapshots -> this client.
            snapshot = snapshots.recv() => match snapshot {
                Some(snapshot) => {
                    if let Err(e) = push_snapshot(&mut sink, &id, &snapshot).await {
                        warn!(error = %e, "Snapshot push failed");
                        break CloseReason::TransportError;
                    }
                }
                // Our sender was replaced in the hub.
                None => break CloseReason::Evicted,
            },

            // Client frames. Any frame counts as proof of life.
            frame = stream.next() => {
                pong_deadline = None;
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_text(&ctx.hub, &id, &text).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break CloseReason::ClientClosed,
                    Some(Err(e)) => {
                        debug!(conn = %id, error = %e, "WS error");
                        break CloseReason::TransportError;
                    }
                    Some(Ok(_)) => {}
                }
            }

            _ = ping.tick() => {
                if pong_deadline.is_none() {
                    if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break CloseReason::TransportError;
                    }
                    pong_deadline = Some(Instant::now() + ctx.settings.pong_timeout);
                }
            }

            _ = sleep_until(pong_deadline.unwrap_or_else(Instant::now)), if pong_deadline.is_some() => {
                break CloseReason::PongTimeout;
            }
        }
    };

    if let Err(e) = ctx.hub.disconnect(&id).await {
        debug!(error = %e, "Disconnect for already removed connection");
    }
    info!(conn = %id, reason = ?reason, "Visitor disconnected");
}

async fn handle_client_text(hub: &PresenceHub, id: &ConnectionId, text: &str) {
    match parse_client_message(text) {
        Ok(ClientMessage::PageVisit { page }) => match hub.visit(id, &page).await {
            Ok(report) => {
                debug!(conn = %id, page = %page, delivered = report.delivered, "Page visit");
            }
            Err(e @ PresenceError::InvalidPage(_)) => {
                warn!(conn = %id, error = %e, "Ignoring page visit");
            }
            Err(e) => {
                debug!(conn = %id, error = %e, "Ignoring page visit");
            }
        },
        Err(e) => {
            debug!(
                conn = %id,
                error = %e,
                "Ignoring unrecognised frame: {}",
                text.chars().take(100).collect::<String>()
            );
        }
    }
}

async fn push_snapshot<K>(
    sink: &mut K,
    id: &ConnectionId,
    snapshot: &Snapshot,
) -> Result<(), PresenceError>
where
    K: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let push_failed = |reason: String| PresenceError::PushFailed {
        id: id.clone(),
        reason,
    };
    let json = encode_server_message(&ServerMessage::VisitorsUpdate(snapshot))
        .map_err(|e| push_failed(e.to_string()))?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| push_failed(e.to_string()))
}
