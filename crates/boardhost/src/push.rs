//! WebSocket push channel
//!
//! Every connection is registered with the broadcaster as soon as the upgrade
//! completes and unregistered when it closes. Each connection runs in its own
//! task, so a slow client only ever delays itself.
//!
//! Inbound text frames are decoded as [`ClientMessage`]s; a subscribe to the
//! board channel gets one acknowledgement. Everything else is ignored.
//!
//! [`ClientMessage`]: pixelboard_core::ClientMessage

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    Router,
};
use pixelboard_core::{Broadcaster, MessageCodec, ServerMessage};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Push server for board change notifications
pub struct PushServer {
    broadcaster: Broadcaster,
}

impl PushServer {
    pub fn new(broadcaster: Broadcaster) -> Self {
        Self { broadcaster }
    }

    /// Router upgrading any path to a push connection
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(upgrade)
            .with_state(self.broadcaster.clone())
    }

    /// Bind and start serving
    ///
    /// Returns the bound address and the server task. A bind failure is
    /// returned to the caller.
    pub async fn start(
        self,
        addr: SocketAddr,
    ) -> Result<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind push listener on {}", addr))?;
        let local_addr = listener.local_addr()?;

        let app = self.router();
        let handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Push server listening on ws://{}", local_addr);
        Ok((local_addr, handle))
    }
}

/// WebSocket upgrade handler
async fn upgrade(ws: WebSocketUpgrade, State(broadcaster): State<Broadcaster>) -> Response {
    ws.on_upgrade(move |socket| serve_subscriber(socket, broadcaster))
}

/// Pump events out and handshake replies back until the socket closes
async fn serve_subscriber(mut socket: WebSocket, broadcaster: Broadcaster) {
    let (id, mut events) = broadcaster.register().await;
    info!("Push subscriber {} connected", id);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };

                if let Err(e) = send(&mut socket, &ServerMessage::from(event)).await {
                    warn!("Delivery to subscriber {} failed: {}", id, e);
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let Some(reply) = MessageCodec::reply_to(&text) else { continue };

                    if let Err(e) = send(&mut socket, &reply).await {
                        warn!("Acknowledgement to subscriber {} failed: {}", id, e);
                        break;
                    }
                    debug!("Subscriber {} subscribed", id);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Subscriber {} read error: {}", id, e);
                    break;
                }
            }
        }
    }

    broadcaster.unregister(id).await;
    info!("Push subscriber {} disconnected", id);
}

async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> Result<()> {
    let text = MessageCodec::encode(msg)?;
    socket.send(Message::Text(text)).await?;
    Ok(())
}
