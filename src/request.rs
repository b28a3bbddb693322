// src/request.rs
// Per-request view of everything the gate looks at, extracted once from the
// Spin request so the decision logic never touches the transport.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use spin_sdk::http::{Method, Request};

use crate::config::RuntimeEnv;
use crate::input_validation::{parse_form_body, MAX_UNLOCK_FORM_BYTES};

/// Header Spin uses to pass the peer socket address.
const CLIENT_ADDR_HEADER: &str = "spin-client-addr";
const FULL_URL_HEADER: &str = "spin-full-url";

/// Proxy-supplied headers that may carry a client IP. Names are lowercase.
pub const PROXY_IP_HEADERS: [&str; 3] = ["client-ip", "x-forwarded-for", "cf-connecting-ip"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub remote_addr: Option<String>,
    pub proxy_headers: HashMap<String, String>,
    pub is_post: bool,
    pub cookies: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub is_secure: bool,
    pub request_uri: String,
}

fn header_str<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.header(name).and_then(|v| v.as_str())
}

/// Strips a port (and IPv6 brackets) from a peer address if present.
pub(crate) fn normalize_remote_addr(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(sock) = raw.parse::<SocketAddr>() {
        return sock.ip().to_string();
    }
    if let Ok(ip) = raw.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        return ip.to_string();
    }
    raw.to_string()
}

/// Parses a `Cookie` header. The first occurrence of a name wins.
pub(crate) fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for part in header.split(';') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        cookies
            .entry(key.to_string())
            .or_insert_with(|| value.trim().to_string());
    }
    cookies
}

fn is_form_content(req: &Request) -> bool {
    match header_str(req, "content-type") {
        Some(ct) => ct
            .to_ascii_lowercase()
            .starts_with("application/x-www-form-urlencoded"),
        None => true,
    }
}

impl RequestContext {
    pub fn from_spin(req: &Request, env: &RuntimeEnv) -> Self {
        let is_post = *req.method() == Method::Post;

        let proxy_headers = PROXY_IP_HEADERS
            .iter()
            .filter_map(|name| {
                header_str(req, name)
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();

        let cookies = header_str(req, "cookie")
            .map(parse_cookie_header)
            .unwrap_or_default();

        // Oversized or undecodable bodies are treated as no submission at all.
        let form = if is_post && is_form_content(req) {
            parse_form_body(req.body(), MAX_UNLOCK_FORM_BYTES).unwrap_or_default()
        } else {
            HashMap::new()
        };

        let via_tls = header_str(req, FULL_URL_HEADER)
            .map(|url| url.to_ascii_lowercase().starts_with("https://"))
            .unwrap_or(false);
        let via_proxy_tls = env.trust_forwarded_proto
            && header_str(req, "x-forwarded-proto")
                .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
                .unwrap_or(false);

        let query = req.query();
        let request_uri = if query.is_empty() {
            req.path().to_string()
        } else {
            format!("{}?{}", req.path(), query)
        };

        Self {
            remote_addr: header_str(req, CLIENT_ADDR_HEADER).map(normalize_remote_addr),
            proxy_headers,
            is_post,
            cookies,
            form,
            is_secure: via_tls || via_proxy_tls,
            request_uri,
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    pub fn proxy_header(&self, name: &str) -> Option<&str> {
        self.proxy_headers.get(name).map(String::as_str)
    }
}
