use spin_sdk::http::Request;

use crate::config::RuntimeEnv;
use crate::security::constant_time_eq;

pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to view this page.";

fn bearer_token(req: &Request) -> Option<String> {
    let header = req.header("authorization")?.as_str()?;
    let token = header.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// True when the request carries the configured admin key. An unset key locks the admin surface.
pub fn is_admin_authorized(req: &Request, env: &RuntimeEnv) -> bool {
    let Some(expected) = env.admin_api_key.as_deref() else {
        return false;
    };
    let Some(candidate) = bearer_token(req) else {
        return false;
    };
    constant_time_eq(&candidate, expected)
}
