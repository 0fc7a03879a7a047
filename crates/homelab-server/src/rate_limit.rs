use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::ConnectInfo,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use homelab_shared::ViewerId;

use crate::auth::viewer_from_headers;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn try_consume(&mut self, rate: f64, capacity: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.last_refill = now;

        self.tokens = (self.tokens + elapsed * rate).min(capacity);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Who a bucket belongs to: the signed-in viewer, or the client address
/// for anonymous requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientKey {
    Viewer(ViewerId),
    Ip(IpAddr),
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientKey::Viewer(id) => write!(f, "viewer:{id}"),
            ClientKey::Ip(ip) => write!(f, "ip:{ip}"),
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<ClientKey, TokenBucket>>>,
    rate: f64,
    capacity: f64,
}

impl RateLimiter {
    pub fn new(rate: f64, capacity: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            rate,
            capacity,
        }
    }

    pub async fn check(&self, key: &ClientKey) -> bool {
        let mut buckets = self.buckets.lock().await;
        if let Some(bucket) = buckets.get_mut(key) {
            return bucket.try_consume(self.rate, self.capacity);
        }
        let mut bucket = TokenBucket::new(self.capacity);
        let allowed = bucket.try_consume(self.rate, self.capacity);
        buckets.insert(key.clone(), bucket);
        allowed
    }

    pub async fn purge_stale(&self, max_idle_secs: f64) {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();
        let before = buckets.len();
        buckets.retain(|_, bucket| {
            now.duration_since(bucket.last_refill).as_secs_f64() < max_idle_secs
        });
        let purged = before - buckets.len();
        if purged > 0 {
            tracing::debug!(purged, remaining = buckets.len(), "Purged idle rate limit buckets");
        }
    }
}

pub async fn rate_limit_middleware(
    axum::extract::State(limiter): axum::extract::State<RateLimiter>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    for key in client_keys(&req) {
        if !limiter.check(&key).await {
            warn!(client = %key, "Rate limit exceeded");
            return Err(StatusCode::TOO_MANY_REQUESTS);
        }
    }

    Ok(next.run(req).await)
}

/// Every bucket a request draws from: the viewer's and the client address's.
///
/// The viewer header is supplied by the proxy in front of the service, but
/// the address bucket still applies so rotating viewer ids from one client
/// gains nothing.
fn client_keys<B>(req: &Request<B>) -> Vec<ClientKey> {
    let mut keys = Vec::with_capacity(2);
    if let Some(viewer) = viewer_from_headers(req.headers()) {
        keys.push(ClientKey::Viewer(viewer.id));
    }
    if let Some(ip) = extract_client_ip(req) {
        keys.push(ClientKey::Ip(ip));
    }
    keys
}

/// Try ConnectInfo first, then X-Forwarded-For, then X-Real-IP.
fn extract_client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    if let Some(connect_info) = req.extensions().get::<ConnectInfo<std::net::SocketAddr>>() {
        return Some(connect_info.0.ip());
    }

    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if let Ok(ip) = value.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    None
}
