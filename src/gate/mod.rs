// src/gate/mod.rs
// Maintenance access gate: per-request Allow / Unlock / Deny decision.

use once_cell::sync::OnceCell;
use spin_sdk::http::Response;
use tracing::{debug, warn};

use crate::client_ip::gate_client_ip;
use crate::config::{Config, RuntimeEnv};
use crate::maintenance_page::render_maintenance_page;
use crate::request::RequestContext;
use crate::security::ip::ip_in_list;
use crate::security::nonce;

pub mod unlock;

use unlock::{has_unlock_cookie, try_unlock, UnlockGrant, PASSWORD_FORM_ACTION};

pub const NO_CACHE_CONTROL: &str = "no-cache, must-revalidate, max-age=0, no-store, private";
pub const EXPIRES_IN_PAST: &str = "Wed, 11 Jan 1984 05:00:00 GMT";

static MISSING_SECRET_WARNED: OnceCell<()> = OnceCell::new();

/// Warns about a missing nonce secret once per instance. Returns true only for the call that logged.
fn warn_missing_nonce_secret() -> bool {
    let mut logged = false;
    MISSING_SECRET_WARNED.get_or_init(|| {
        warn!("access password configured but PDMIUC_NONCE_SECRET is unset; unlock form cannot validate");
        logged = true;
    });
    logged
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    Disabled,
    UnlockCookie,
    AllowListedIp,
}

impl AllowReason {
    pub fn as_str(self) -> &'static str {
        match self {
            AllowReason::Disabled => "disabled",
            AllowReason::UnlockCookie => "unlock_cookie",
            AllowReason::AllowListedIp => "allow_listed_ip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(AllowReason),
    Unlock(UnlockGrant),
    Deny,
}

/// The gate for one request, built from the loaded settings and runtime env.
pub struct MaintenanceGate<'a> {
    config: &'a Config,
    env: &'a RuntimeEnv,
}

impl<'a> MaintenanceGate<'a> {
    pub fn new(config: &'a Config, env: &'a RuntimeEnv) -> Self {
        Self { config, env }
    }

    pub fn evaluate(&self, ctx: &RequestContext, now: u64) -> GateDecision {
        if !self.config.enabled {
            return GateDecision::Allow(AllowReason::Disabled);
        }

        if let Some(grant) = try_unlock(self.config, ctx, self.env, now) {
            return GateDecision::Unlock(grant);
        }

        if has_unlock_cookie(self.config, ctx) {
            return GateDecision::Allow(AllowReason::UnlockCookie);
        }

        if !self.config.allowed_ips.is_empty() {
            let ip = gate_client_ip(ctx);
            if ip_in_list(&ip, &self.config.allowed_ips) {
                return GateDecision::Allow(AllowReason::AllowListedIp);
            }
            debug!(ip = %ip, "client ip not on maintenance allow-list");
        }

        GateDecision::Deny
    }

    /// Evaluates and turns the decision into the final response.
    pub fn respond(&self, ctx: &RequestContext, now: u64) -> Response {
        match self.evaluate(ctx, now) {
            GateDecision::Allow(reason) => Response::builder()
                .status(200)
                .header("X-Pdmiuc-Gate", reason.as_str())
                .body("OK (maintenance gate passed)")
                .build(),
            GateDecision::Unlock(grant) => Response::builder()
                .status(302)
                .header("Location", grant.location.as_str())
                .header("Set-Cookie", grant.set_cookie.as_str())
                .header("Cache-Control", NO_CACHE_CONTROL)
                .body(Vec::new())
                .build(),
            GateDecision::Deny => self.maintenance_response(now),
        }
    }

    fn maintenance_response(&self, now: u64) -> Response {
        let token = match (self.config.has_password(), self.env.nonce_secret.as_deref()) {
            (true, Some(secret)) => nonce::create_nonce(secret, PASSWORD_FORM_ACTION, now),
            (true, None) => {
                if !warn_missing_nonce_secret() {
                    debug!("rendering unlock form without anti-forgery token");
                }
                String::new()
            }
            (false, _) => String::new(),
        };
        Response::builder()
            .status(503)
            .header("Content-Type", "text/html; charset=utf-8")
            .header("Cache-Control", NO_CACHE_CONTROL)
            .header("Expires", EXPIRES_IN_PAST)
            .body(render_maintenance_page(self.config, &token))
            .build()
    }
}
