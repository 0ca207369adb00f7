//! Accept loop and shared server state.

use std::sync::Arc;

use footfall_presence::{GeoResolver, PresenceHub};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::connection::{handle_connection, ConnectionSettings};
use crate::handshake::{accept, client_ip};

/// State shared by every connection task.
pub struct ServerContext {
    pub hub: PresenceHub,
    pub resolver: Option<Arc<dyn GeoResolver>>,
    pub settings: ConnectionSettings,
}

/// Accept connections until `shutdown` fires, then wait for every
/// connection task to unregister.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>, shutdown: CancellationToken) {
    let tracker = TaskTracker::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let ctx = Arc::clone(&ctx);
                    let shutdown = shutdown.clone();
                    tracker.spawn(async move {
                        match timeout(ctx.settings.handshake_timeout, accept(stream)).await {
                            Ok(Ok((ws, forwarded_for))) => {
                                let ip = client_ip(
                                    peer,
                                    forwarded_for.as_deref(),
                                    ctx.settings.trust_forwarded_for,
                                );
                                handle_connection(ws, ip, ctx, shutdown).await;
                            }
                            Ok(Err(e)) => {
                                warn!(peer = %peer, error = %e, "WS handshake failed");
                            }
                            Err(_) => {
                                warn!(peer = %peer, "WS handshake timed out");
                            }
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "TCP accept error");
                }
            },
        }
    }

    info!(open = tracker.len(), "Shutting down, closing connections");
    tracker.close();
    tracker.wait().await;
    let remaining = ctx.hub.connection_count().await;
    debug!(remaining, "All connections closed");
}
