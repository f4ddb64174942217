use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request};

use crate::auth::Identity;

/// Throttle key for a caller: its identity when known, otherwise its address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitKey {
    Identity(String),
    Ip(IpAddr),
    Unknown,
}

impl RateLimitKey {
    pub fn for_request(request: &Request) -> Self {
        if let Some(identity) = request.extensions().get::<Identity>() {
            return RateLimitKey::Identity(identity.id.clone());
        }

        match client_ip(request) {
            Some(ip) => RateLimitKey::Ip(ip),
            None => RateLimitKey::Unknown,
        }
    }

    /// Cache key scoped to one operation so limits for different routes do not
    /// share a counter.
    pub fn scoped(&self, operation: &str) -> String {
        match self {
            RateLimitKey::Identity(id) => format!("{}:id:{}", operation, id),
            RateLimitKey::Ip(ip) => format!("{}:ip:{}", operation, ip),
            RateLimitKey::Unknown => format!("{}:unknown", operation),
        }
    }
}

fn client_ip(request: &Request) -> Option<IpAddr> {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.ip());
    }

    // Proxied requests: first hop of X-Forwarded-For, then X-Real-IP.
    forwarded_for(request).or_else(|| header_ip(request, "x-real-ip"))
}

fn forwarded_for(request: &Request) -> Option<IpAddr> {
    let value = request.headers().get("x-forwarded-for")?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

fn header_ip(request: &Request, name: &str) -> Option<IpAddr> {
    request.headers().get(name)?.to_str().ok()?.trim().parse().ok()
}
