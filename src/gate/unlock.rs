// src/gate/unlock.rs
// Password unlock: form submission check and the long-lived bypass cookie.

use tracing::{debug, info};

use crate::config::{Config, RuntimeEnv};
use crate::request::RequestContext;
use crate::security::{nonce, password};

pub const UNLOCK_COOKIE_NAME: &str = "pdmiuc_access";
pub const UNLOCK_COOKIE_VALUE: &str = "1";
pub const UNLOCK_COOKIE_MAX_AGE_SECONDS: u64 = 86_400;

pub const PASSWORD_FIELD: &str = "pdmiuc_password";
pub const NONCE_FIELD: &str = "pdmiuc_password_nonce";
pub const PASSWORD_FORM_ACTION: &str = "pdmiuc_password_form";

/// Successful unlock: where to send the visitor and the cookie to set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockGrant {
    pub location: String,
    pub set_cookie: String,
}

pub fn unlock_cookie(env: &RuntimeEnv, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path={}",
        UNLOCK_COOKIE_NAME, UNLOCK_COOKIE_VALUE, UNLOCK_COOKIE_MAX_AGE_SECONDS, env.cookie_path
    );
    if let Some(domain) = env.cookie_domain.as_deref() {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie.push_str("; HttpOnly; SameSite=Lax");
    cookie
}

/// Only same-site paths are honoured as redirect targets.
pub(crate) fn safe_redirect_target(uri: &str) -> String {
    let local = uri.starts_with('/')
        && !uri.starts_with("//")
        && !uri.contains('\\')
        && !uri.chars().any(|c| c.is_control());
    if local {
        uri.to_string()
    } else {
        "/".to_string()
    }
}

pub(crate) fn has_unlock_cookie(config: &Config, ctx: &RequestContext) -> bool {
    config.has_password() && ctx.cookie(UNLOCK_COOKIE_NAME) == Some(UNLOCK_COOKIE_VALUE)
}

/// Checks this request for a valid unlock submission. Every failure returns
/// `None` without telling the visitor which check failed.
pub(crate) fn try_unlock(
    config: &Config,
    ctx: &RequestContext,
    env: &RuntimeEnv,
    now: u64,
) -> Option<UnlockGrant> {
    if !config.has_password() || !ctx.is_post {
        return None;
    }
    let submitted = ctx.form_field(PASSWORD_FIELD).filter(|v| !v.is_empty())?;
    let token = ctx.form_field(NONCE_FIELD).filter(|v| !v.is_empty())?;

    let Some(secret) = env.nonce_secret.as_deref() else {
        debug!("unlock attempt ignored: no nonce secret configured");
        return None;
    };
    if !nonce::verify_nonce(secret, token.trim(), PASSWORD_FORM_ACTION, now) {
        debug!("unlock attempt ignored: anti-forgery token rejected");
        return None;
    }
    if !password::verify_password(submitted, &config.access_password_hash) {
        debug!("unlock attempt ignored: wrong password");
        return None;
    }

    info!(secure = ctx.is_secure, "maintenance unlock granted");
    Some(UnlockGrant {
        location: safe_redirect_target(&ctx.request_uri),
        set_cookie: unlock_cookie(env, ctx.is_secure),
    })
}
