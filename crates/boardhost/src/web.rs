//! HTTP front end
//!
//! | Route | Behavior |
//! |-------|----------|
//! | `GET /` | Homepage with a live canvas |
//! | `GET /board` | Text snapshot, one line per column |
//! | `GET /palette` | JSON array of `[r, g, b]` |
//! | `POST /paint` | JSON `{x, y, color}`, token from `?token=` or the `token` cookie |
//! | `POST /resetToken` | Fresh random token, also set as cookie |
//!
//! Anything else is a plain 404.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use pixelboard_core::{
    snapshot, IdentityToken, PaintError, PaintPipeline, PaintRequest, Rgb, PALETTE,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::error::PaintRejection;

/// Cookie carrying the identity token
const TOKEN_COOKIE: &str = "token";

/// Settings shown on the homepage
#[derive(Debug, Clone)]
pub struct PageParams {
    pub push_port: u16,
    pub cooldown: Duration,
    pub restricted: bool,
}

/// State shared across HTTP handlers
#[derive(Clone)]
pub struct WebState {
    pipeline: PaintPipeline,
    page: Arc<PageParams>,
}

impl WebState {
    pub fn new(pipeline: PaintPipeline, page: PageParams) -> Self {
        Self {
            pipeline,
            page: Arc::new(page),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaintBody {
    x: i64,
    y: i64,
    color: i64,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

/// Homepage renderer
pub struct HtmlTemplate;

impl HtmlTemplate {
    /// Render the board page for the given dimensions and settings
    pub fn render(width: usize, height: usize, page: &PageParams) -> String {
        let palette = serde_json::to_string(&PALETTE.to_vec()).unwrap_or_else(|_| "[]".into());
        let limit = if page.restricted {
            format!("One pixel every {} ms per token", page.cooldown.as_millis())
        } else {
            "No cooldown".to_string()
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pixelboard</title>
    <style>
        body {{
            background-color: #1E1E2E;
            color: #CDD6F4;
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            display: flex;
            flex-direction: column;
            align-items: center;
            margin: 0;
            padding: 20px;
        }}
        canvas {{
            image-rendering: pixelated;
            width: min(90vw, 800px);
            border: 1px solid #45475A;
            cursor: crosshair;
        }}
        #palette {{ display: flex; flex-wrap: wrap; max-width: 800px; margin: 1rem 0; }}
        #palette div {{ width: 24px; height: 24px; margin: 2px; cursor: pointer; border: 2px solid transparent; }}
        #palette div.selected {{ border-color: #CBA6F7; }}
        .info {{ font-size: 0.8rem; opacity: 0.6; }}
    </style>
</head>
<body>
    <h1>Pixelboard</h1>
    <p class="info">{width}x{height} &middot; {limit}</p>
    <canvas id="board" width="{width}" height="{height}"></canvas>
    <div id="palette"></div>
    <p id="status" class="info"></p>
    <script>
        const PALETTE = {palette};
        const PUSH_PORT = {push_port};
        const canvas = document.getElementById('board');
        const ctx = canvas.getContext('2d');
        const statusEl = document.getElementById('status');
        let selected = 0;

        function rgb(index) {{
            const [r, g, b] = PALETTE[index];
            return `rgb(${{r}},${{g}},${{b}})`;
        }}

        function draw(x, y, color) {{
            ctx.fillStyle = rgb(color);
            ctx.fillRect(x, y, 1, 1);
        }}

        PALETTE.forEach((_, index) => {{
            const swatch = document.createElement('div');
            swatch.style.background = rgb(index);
            swatch.onclick = () => {{
                document.querySelectorAll('#palette div').forEach(d => d.classList.remove('selected'));
                swatch.classList.add('selected');
                selected = index;
            }};
            document.getElementById('palette').appendChild(swatch);
        }});

        fetch('/board').then(r => r.text()).then(text => {{
            text.trim().split('\n').forEach((line, x) => {{
                [...line].forEach((digit, y) => draw(x, y, parseInt(digit, PALETTE.length)));
            }});
        }});

        const socket = new WebSocket(`ws://${{location.hostname}}:${{PUSH_PORT}}/`);
        socket.onopen = () => socket.send(JSON.stringify({{ type: 'subscribe', channel: 'board' }}));
        socket.onmessage = (event) => {{
            const msg = JSON.parse(event.data);
            if (msg.type === 'paint') draw(msg.x, msg.y, msg.color);
        }};

        canvas.onclick = async (event) => {{
            const rect = canvas.getBoundingClientRect();
            const x = Math.floor((event.clientX - rect.left) * canvas.width / rect.width);
            const y = Math.floor((event.clientY - rect.top) * canvas.height / rect.height);
            const response = await fetch('/paint', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ x, y, color: selected }}),
            }});
            statusEl.textContent = await response.text();
        }};

        if (!document.cookie.includes('token=')) fetch('/resetToken', {{ method: 'POST' }});
    </script>
</body>
</html>"#,
            width = width,
            height = height,
            limit = limit,
            palette = palette,
            push_port = page.push_port,
        )
    }
}

/// Build the HTTP router
pub fn router(state: WebState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/", get(homepage))
        .route("/board", get(board_snapshot))
        .route("/palette", get(palette))
        .route("/paint", post(paint))
        .route("/resetToken", post(reset_token))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Homepage route handler
pub async fn homepage(State(state): State<WebState>) -> Html<String> {
    let board = state.pipeline.board();
    Html(HtmlTemplate::render(
        board.width(),
        board.height(),
        &state.page,
    ))
}

/// Text snapshot of the board
pub async fn board_snapshot(State(state): State<WebState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        snapshot::encode(state.pipeline.board()),
    )
}

/// Palette as JSON
pub async fn palette() -> Json<Vec<Rgb>> {
    Json(PALETTE.to_vec())
}

/// Paint submission
///
/// Responds only after the paint has been applied and handed to the push
/// subscribers, or rejected.
pub async fn paint(
    State(state): State<WebState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    body: Result<Json<PaintBody>, JsonRejection>,
) -> Result<&'static str, PaintRejection> {
    let Json(body) = body.map_err(|e| PaintError::InvalidRequest(e.body_text()))?;

    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| cookie_token(&headers));
    let request = PaintRequest::new(body.x, body.y, body.color, token);

    state.pipeline.submit(request).await?;
    Ok("Pixel painted")
}

/// Issue a fresh identity token
pub async fn reset_token() -> impl IntoResponse {
    let token = IdentityToken::generate().to_hex();
    info!("Issued token {}", token);

    (
        [(
            header::SET_COOKIE,
            format!("{}={}; Path=/", TOKEN_COOKIE, token),
        )],
        token,
    )
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Extract the identity token from `Cookie` headers
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// HTTP server for board queries and paints
pub struct WebServer {
    state: WebState,
}

impl WebServer {
    pub fn new(state: WebState) -> Self {
        Self { state }
    }

    /// Bind and start serving
    ///
    /// Returns the bound address (useful when binding port 0) and the server
    /// task. A bind failure is returned to the caller.
    pub async fn start(
        self,
        addr: SocketAddr,
    ) -> Result<(SocketAddr, JoinHandle<std::io::Result<()>>)> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;
        let local_addr = listener.local_addr()?;

        let app = router(self.state);
        let handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("HTTP server listening on http://{}", local_addr);
        Ok((local_addr, handle))
    }
}
