// src/admin/mod.rs
// Authenticated settings surface: read, save, activate and deactivate.

use serde_json::json;
use spin_sdk::http::{Method, Request, Response};
use tracing::{info, warn};

use crate::client_ip::admin_client_ip;
use crate::config::{Config, ConfigError, RuntimeEnv, PLUGIN_VERSION, VERSION_KEY};
use crate::input_validation::{enforce_body_size, parse_form_body, parse_json_body, MAX_ADMIN_BODY_BYTES};
use crate::lifecycle::{run_lifecycle, LifecycleEvent};
use crate::request::RequestContext;
use crate::security::ip::format_ip_list;
use crate::store::KeyValueStore;

pub mod auth;
pub mod sanitize;

use auth::{is_admin_authorized, FORBIDDEN_MESSAGE};
use sanitize::{sanitize_settings, SettingsInput};

pub const SETTINGS_PATH: &str = "/admin/settings";
pub const ACTIVATE_PATH: &str = "/admin/activate";
pub const DEACTIVATE_PATH: &str = "/admin/deactivate";

fn json_response(status: u16, body: serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Cache-Control", "no-store")
        .body(body.to_string())
        .build()
}

fn is_json_request(req: &Request) -> bool {
    req.header("content-type")
        .and_then(|v| v.as_str())
        .map(|ct| ct.to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

fn settings_view(cfg: &Config, installed_version: Option<String>, current_ip: &str) -> serde_json::Value {
    json!({
        "enabled": cfg.enabled,
        "allowed_ips": cfg.allowed_ips,
        "allowed_ips_text": format_ip_list(&cfg.allowed_ips),
        "display_type": cfg.display_type.as_str(),
        "text_content": cfg.text_content,
        "image_url": cfg.image_url,
        "has_password": cfg.has_password(),
        "current_ip": current_ip,
        "version": installed_version,
    })
}

fn installed_version(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(VERSION_KEY) {
        Ok(raw) => raw.and_then(|raw| String::from_utf8(raw).ok()),
        Err(err) => {
            warn!(error = %err, "reading installed version failed");
            None
        }
    }
}

/// Existing record for a save. An unreadable record is replaced rather than blocking the save.
fn load_for_update(store: &dyn KeyValueStore) -> Result<Config, ConfigError> {
    match Config::load(store) {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::Invalid(err)) => {
            warn!(error = %err, "stored maintenance settings unreadable; replacing on save");
            Ok(Config::default())
        }
        Err(err) => Err(err),
    }
}

fn read_settings_input(req: &Request) -> Result<SettingsInput, Response> {
    let body = req.body();
    if enforce_body_size(body, MAX_ADMIN_BODY_BYTES).is_err() {
        return Err(Response::new(413, "Payload too large"));
    }
    if is_json_request(req) {
        let value = parse_json_body(body, MAX_ADMIN_BODY_BYTES).map_err(|msg| Response::new(400, msg))?;
        SettingsInput::from_json(&value).map_err(|msg| Response::new(400, msg))
    } else {
        let form = parse_form_body(body, MAX_ADMIN_BODY_BYTES).map_err(|msg| Response::new(400, msg))?;
        Ok(SettingsInput::from_form(&form))
    }
}

fn handle_settings(store: &dyn KeyValueStore, req: &Request, env: &RuntimeEnv) -> Response {
    let ctx = RequestContext::from_spin(req, env);
    let current_ip = admin_client_ip(&ctx);

    match req.method() {
        Method::Get => {
            let cfg = match Config::load(store) {
                Ok(cfg) => cfg,
                Err(err) => return Response::new(500, err.user_message()),
            };
            json_response(200, settings_view(&cfg, installed_version(store), &current_ip))
        }
        Method::Post => {
            let input = match read_settings_input(req) {
                Ok(input) => input,
                Err(resp) => return resp,
            };
            let existing = match load_for_update(store) {
                Ok(cfg) => cfg,
                Err(err) => return Response::new(500, err.user_message()),
            };
            let cfg = match sanitize_settings(&input, &existing) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!(error = %err, "could not hash access password");
                    return Response::new(500, "Could not store access password");
                }
            };
            if let Err(err) = cfg.save(store) {
                warn!(error = %err, "saving maintenance settings failed");
                return Response::new(500, err.user_message());
            }
            info!(
                enabled = cfg.enabled,
                allowed_ips = cfg.allowed_ips.len(),
                display_type = cfg.display_type.as_str(),
                has_password = cfg.has_password(),
                admin_ip = %current_ip,
                "maintenance settings saved"
            );
            json_response(200, settings_view(&cfg, installed_version(store), &current_ip))
        }
        _ => Response::new(405, "Method Not Allowed"),
    }
}

fn handle_lifecycle(store: &dyn KeyValueStore, req: &Request, event: LifecycleEvent) -> Response {
    if *req.method() != Method::Post {
        return Response::new(405, "Method Not Allowed");
    }
    match run_lifecycle(event, store) {
        Ok(()) => json_response(
            200,
            json!({
                "event": event.as_str(),
                "version": (event == LifecycleEvent::Activate).then_some(PLUGIN_VERSION),
            }),
        ),
        Err(err) => {
            warn!(error = %err, event = event.as_str(), "lifecycle hook failed");
            Response::new(500, err.user_message())
        }
    }
}

/// Routes admin paths. `None` means the path is not an admin route and the gate should handle it.
pub fn maybe_handle_admin_route(
    store: &dyn KeyValueStore,
    req: &Request,
    env: &RuntimeEnv,
) -> Option<Response> {
    let path = req.path();
    if path != SETTINGS_PATH && path != ACTIVATE_PATH && path != DEACTIVATE_PATH {
        return None;
    }
    if !is_admin_authorized(req, env) {
        return Some(Response::new(403, FORBIDDEN_MESSAGE));
    }
    Some(match path {
        SETTINGS_PATH => handle_settings(store, req, env),
        ACTIVATE_PATH => handle_lifecycle(store, req, LifecycleEvent::Activate),
        _ => handle_lifecycle(store, req, LifecycleEvent::Deactivate),
    })
}
