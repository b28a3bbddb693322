// src/client_ip.rs
// Best-effort client IP resolution over a fixed list of sources.

use crate::request::RequestContext;
use crate::security::ip::canonical_ip;

/// Returned when no source yields a valid address.
pub const UNKNOWN_IP: &str = "0.0.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpSource {
    /// The directly observed peer address.
    RemoteAddr,
    /// A proxy-supplied header (lowercase name); may hold a comma-separated list.
    Header(&'static str),
}

/// Order used by the gate when matching the allow-list.
pub const GATE_PRIORITY: [IpSource; 3] = [
    IpSource::Header("client-ip"),
    IpSource::Header("x-forwarded-for"),
    IpSource::RemoteAddr,
];

/// Order used by the admin "current IP" hint: peer address first, proxies as fallback.
pub const ADMIN_PRIORITY: [IpSource; 4] = [
    IpSource::RemoteAddr,
    IpSource::Header("cf-connecting-ip"),
    IpSource::Header("x-forwarded-for"),
    IpSource::Header("client-ip"),
];

fn first_valid(raw: &str) -> Option<String> {
    raw.split(',').find_map(canonical_ip)
}

/// Returns the first valid IP found walking `order`, or `UNKNOWN_IP`.
pub fn resolve_client_ip(ctx: &RequestContext, order: &[IpSource]) -> String {
    order
        .iter()
        .filter_map(|source| match source {
            IpSource::RemoteAddr => ctx.remote_addr.as_deref(),
            IpSource::Header(name) => ctx.proxy_header(name),
        })
        .find_map(first_valid)
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

pub fn gate_client_ip(ctx: &RequestContext) -> String {
    resolve_client_ip(ctx, &GATE_PRIORITY)
}

pub fn admin_client_ip(ctx: &RequestContext) -> String {
    resolve_client_ip(ctx, &ADMIN_PRIORITY)
}
