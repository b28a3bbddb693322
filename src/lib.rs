// src/lib.rs
// Entry point for the maintenance-mode gate Spin component

use spin_sdk::http::{Request, Response};
#[cfg(target_arch = "wasm32")]
use spin_sdk::http_component;
use std::time::{SystemTime, UNIX_EPOCH};

mod admin; // Settings API and lifecycle endpoints
mod client_ip; // Client IP resolution orders
pub mod config; // Persisted settings and runtime env
pub mod gate; // Allow / unlock / deny decision
mod input_validation; // Body size limits and form decoding
mod lifecycle; // Activate / deactivate hooks
mod maintenance_page; // 503 page rendering
mod observability; // tracing subscriber
pub mod request; // Transport-free request view
pub mod security; // IP lists, nonces, passwords, HTML
pub mod store; // Key-value store seam

#[cfg(test)]
mod test_support;

pub use config::{Config, DisplayType, RuntimeEnv};
pub use gate::{AllowReason, GateDecision, MaintenanceGate};
pub use request::RequestContext;
pub use store::{KeyValueStore, StoreError};

/// Current unix time in seconds. A clock before the epoch reads as 0.
pub fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Handles one request against the given store: admin routes first, then the gate.
pub fn handle_request(
    store: &dyn KeyValueStore,
    req: &Request,
    env: &RuntimeEnv,
    now: u64,
) -> Response {
    if let Some(resp) = admin::maybe_handle_admin_route(store, req, env) {
        return resp;
    }

    let cfg = Config::load_or_default(store);
    let ctx = RequestContext::from_spin(req, env);
    MaintenanceGate::new(&cfg, env).respond(&ctx, now)
}

pub fn handle_maintenance_impl(req: &Request) -> Response {
    observability::init_logging();
    let store = store::open_default_store();
    let env = RuntimeEnv::from_env();
    handle_request(store.as_ref(), req, &env, now_ts())
}

#[cfg_attr(target_arch = "wasm32", http_component)]
pub fn spin_entrypoint(req: Request) -> Response {
    handle_maintenance_impl(&req)
}
