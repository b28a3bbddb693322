// src/config/runtime.rs
// Deployment settings read from the component environment.

use std::env;

const DEFAULT_COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub admin_api_key: Option<String>,
    pub nonce_secret: Option<String>,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub trust_forwarded_proto: bool,
}

impl Default for RuntimeEnv {
    fn default() -> Self {
        Self {
            admin_api_key: None,
            nonce_secret: None,
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            cookie_domain: None,
            trust_forwarded_proto: true,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_bool_env(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => false,
        _ => default,
    }
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cookie_path =
            non_empty(lookup("PDMIUC_COOKIE_PATH")).unwrap_or_else(|| DEFAULT_COOKIE_PATH.to_string());
        Self {
            admin_api_key: non_empty(lookup("PDMIUC_ADMIN_API_KEY")),
            nonce_secret: non_empty(lookup("PDMIUC_NONCE_SECRET")),
            cookie_path,
            cookie_domain: non_empty(lookup("PDMIUC_COOKIE_DOMAIN")),
            trust_forwarded_proto: parse_bool_env(
                lookup("PDMIUC_TRUST_FORWARDED_PROTO").as_deref(),
                true,
            ),
        }
    }
}
