use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Sliding-window limiter: each client may make `max_requests` in any `window`
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
    started: Instant,
    /// Milliseconds since `started` at which idle clients are next dropped
    next_sweep_ms: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Arc::new(DashMap::new()),
            started: Instant::now(),
            next_sweep_ms: Arc::new(AtomicU64::new(window_ms(window))),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Option<Self> {
        api.enable_rate_limiting.then(|| {
            Self::new(Duration::from_secs(api.rate_limit_window_secs), api.rate_limit_requests)
        })
    }

    /// Records the request if allowed; returns the slots left afterwards
    pub fn allow(&self, client: &str) -> Option<u32> {
        let now = Instant::now();
        let window = self.window;
        self.maybe_sweep(now);

        let mut entry = self.buckets.entry(client.to_string()).or_default();
        entry.retain(|instant| now.duration_since(*instant) < window);

        let remaining = self.max_requests.saturating_sub(entry.len() as u32);
        if remaining == 0 {
            return None;
        }

        entry.push(now);
        Some(remaining - 1)
    }

    /// At most once per window, drops clients whose requests have all expired.
    /// Must not run while a bucket entry is held.
    fn maybe_sweep(&self, now: Instant) {
        let elapsed_ms = now.duration_since(self.started).as_millis() as u64;
        let due = self.next_sweep_ms.load(Ordering::Relaxed);
        if elapsed_ms < due {
            return;
        }
        let next = elapsed_ms.saturating_add(window_ms(self.window));
        if self
            .next_sweep_ms
            .compare_exchange(due, next, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let window = self.window;
        let before = self.buckets.len();
        self.buckets.retain(|_, hits| {
            hits.retain(|instant| now.duration_since(*instant) < window);
            !hits.is_empty()
        });
        debug!("rate limiter dropped {} idle clients", before.saturating_sub(self.buckets.len()));
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}

fn window_ms(window: Duration) -> u64 {
    (window.as_millis() as u64).max(1)
}

pub async fn rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(request).await;
    };

    let client = client_key(&request);
    match limiter.allow(&client) {
        Some(remaining) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", limiter.limit().into());
            headers.insert("x-ratelimit-remaining", remaining.into());
            response
        }
        None => {
            debug!("rate limit exceeded for {}", client);
            ApiError::too_many_requests("Too many requests, please try again later", limiter.retry_after_secs())
                .into_response()
        }
    }
}

/// First `x-forwarded-for` hop, then the peer address
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}
