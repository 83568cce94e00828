use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Bucket for new peers once the table is full of live windows, and for
/// requests that arrive without connection info.
const SHARED_BUCKET: Option<IpAddr> = None;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

#[derive(Debug)]
struct WindowTable {
    windows: HashMap<Option<IpAddr>, WindowState>,
    pruned_at: Instant,
}

/// Fixed one-second window per peer address. The table never tracks more
/// than `MAX_TRACKED_CLIENTS` peers.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    table: Arc<Mutex<WindowTable>>,
}

impl RateLimiter {
    pub fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            table: Arc::new(Mutex::new(WindowTable {
                windows: HashMap::new(),
                pruned_at: Instant::now(),
            })),
        }
    }

    fn allow(&self, client: Option<IpAddr>) -> bool {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let table = &mut *table;
        let now = Instant::now();

        let mut key = client;
        if !table.windows.contains_key(&key) && table.windows.len() >= MAX_TRACKED_CLIENTS {
            // at most one sweep per window
            if now.duration_since(table.pruned_at) >= WINDOW {
                table.windows.retain(|_, w| now.duration_since(w.start) < WINDOW);
                table.pruned_at = now;
            }
            if table.windows.len() >= MAX_TRACKED_CLIENTS {
                key = SHARED_BUCKET;
            }
        }

        let window = table.windows.entry(key).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(window.start) >= WINDOW {
            window.start = now;
            window.count = 0;
        }
        if window.count < self.rps {
            window.count += 1;
            true
        } else {
            false
        }
    }

    fn tracked(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .windows
            .len()
    }
}

fn client_ip(req: &Request<Body>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.allow(client_ip(&req)) {
        tracing::debug!(peer = ?client_ip(&req), tracked = limiter.tracked(), "rate limit hit");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "rate_limit_exceeded" })),
        )
            .into_response();
    }
    next.run(req).await
}
