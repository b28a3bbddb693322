// End-to-end flows through the public request handler with an in-memory store.

use std::collections::HashMap;
use std::sync::Mutex;

use pdmi_maintenance_gate::gate::unlock::{NONCE_FIELD, PASSWORD_FIELD, PASSWORD_FORM_ACTION};
use pdmi_maintenance_gate::security::nonce::create_nonce;
use pdmi_maintenance_gate::{handle_request, Config, KeyValueStore, RuntimeEnv, StoreError};
use spin_sdk::http::{Method, Request, Response};

const ADMIN_KEY: &str = "integration-admin-key";
const NONCE_SECRET: &str = "integration-nonce-secret";
const NOW: u64 = 1_760_000_000;

#[derive(Default)]
struct MemoryStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.map.lock().unwrap().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}

fn env() -> RuntimeEnv {
    RuntimeEnv {
        admin_api_key: Some(ADMIN_KEY.to_string()),
        nonce_secret: Some(NONCE_SECRET.to_string()),
        ..RuntimeEnv::default()
    }
}

fn request(method: Method, path: &str, headers: &[(&str, &str)], body: &[u8]) -> Request {
    let mut builder = Request::builder();
    builder.method(method).uri(path);
    for (key, value) in headers {
        builder.header(*key, *value);
    }
    builder.body(body.to_vec());
    builder.build()
}

fn visit(store: &MemoryStore, ip: &str, path: &str, cookie: Option<&str>) -> Response {
    let addr = format!("{}:40000", ip);
    let mut headers = vec![("spin-client-addr", addr.as_str())];
    if let Some(cookie) = cookie {
        headers.push(("cookie", cookie));
    }
    handle_request(store, &request(Method::Get, path, &headers, b""), &env(), NOW)
}

fn save_settings(store: &MemoryStore, form: &str) -> Response {
    let auth = format!("Bearer {}", ADMIN_KEY);
    let req = request(
        Method::Post,
        "/admin/settings",
        &[
            ("authorization", auth.as_str()),
            ("content-type", "application/x-www-form-urlencoded"),
        ],
        form.as_bytes(),
    );
    handle_request(store, &req, &env(), NOW)
}

fn header(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, value)| value.as_str().map(str::to_string))
}

fn body(resp: &Response) -> String {
    String::from_utf8_lossy(resp.body()).to_string()
}

#[test]
fn fresh_install_lets_everyone_through() {
    let store = MemoryStore::default();
    let resp = visit(&store, "192.0.2.50", "/", None);
    assert_eq!(*resp.status(), 200u16);
    assert_eq!(header(&resp, "x-pdmiuc-gate").as_deref(), Some("disabled"));
}

#[test]
fn admin_requires_key() {
    let store = MemoryStore::default();
    let req = request(Method::Get, "/admin/settings", &[], b"");
    let resp = handle_request(&store, &req, &env(), NOW);
    assert_eq!(*resp.status(), 403u16);
    assert_eq!(body(&resp), "You do not have permission to view this page.");
}

#[test]
fn enabled_gate_denies_strangers_and_admits_allow_listed_ip() {
    let store = MemoryStore::default();
    let resp = save_settings(&store, "enabled=1&allowed_ips=203.0.113.5");
    assert_eq!(*resp.status(), 200u16);

    let denied = visit(&store, "192.0.2.50", "/", None);
    assert_eq!(*denied.status(), 503u16);
    assert!(body(&denied).contains("We zijn zo terug"));
    assert!(header(&denied, "cache-control").unwrap_or_default().contains("no-store"));

    let allowed = visit(&store, "203.0.113.5", "/", None);
    assert_eq!(*allowed.status(), 200u16);
    assert_eq!(header(&allowed, "x-pdmiuc-gate").as_deref(), Some("allow_listed_ip"));
}

#[test]
fn ipv6_allow_list_saved_by_admin_admits_peer() {
    let store = MemoryStore::default();
    let resp = save_settings(&store, "enabled=1&allowed_ips=2001%3ADB8%3A%3A1%0A2001%3A0db8%3A%3A1");
    assert_eq!(*resp.status(), 200u16);
    assert_eq!(Config::load(&store).unwrap().allowed_ips, vec!["2001:db8::1"]);

    let req = request(Method::Get, "/", &[("spin-client-addr", "[2001:DB8::1]:443")], b"");
    let resp = handle_request(&store, &req, &env(), NOW);
    assert_eq!(*resp.status(), 200u16);
    assert_eq!(header(&resp, "x-pdmiuc-gate").as_deref(), Some("allow_listed_ip"));
}

#[test]
fn password_unlock_sets_cookie_that_later_admits() {
    let store = MemoryStore::default();
    let resp = save_settings(&store, "enabled=1&access_password=letmein");
    assert_eq!(*resp.status(), 200u16);
    let stored = Config::load(&store).unwrap();
    assert!(stored.has_password());
    assert_ne!(stored.access_password_hash, "letmein");

    let page = visit(&store, "192.0.2.50", "/shop", None);
    assert_eq!(*page.status(), 503u16);
    assert!(body(&page).contains(PASSWORD_FIELD));

    let token = create_nonce(NONCE_SECRET, PASSWORD_FORM_ACTION, NOW);
    let form = format!("{}=letmein&{}={}", PASSWORD_FIELD, NONCE_FIELD, token);
    let unlock = request(
        Method::Post,
        "/shop",
        &[
            ("spin-client-addr", "192.0.2.50:40000"),
            ("content-type", "application/x-www-form-urlencoded"),
        ],
        form.as_bytes(),
    );
    let resp = handle_request(&store, &unlock, &env(), NOW);
    assert_eq!(*resp.status(), 302u16);
    assert_eq!(header(&resp, "location").as_deref(), Some("/shop"));
    let cookie = header(&resp, "set-cookie").unwrap_or_default();
    assert!(cookie.starts_with("pdmiuc_access=1;"));

    let again = visit(&store, "192.0.2.50", "/shop", Some("pdmiuc_access=1"));
    assert_eq!(*again.status(), 200u16);
    assert_eq!(header(&again, "x-pdmiuc-gate").as_deref(), Some("unlock_cookie"));

    let wrong = format!("{}=nope&{}={}", PASSWORD_FIELD, NONCE_FIELD, token);
    let bad = request(
        Method::Post,
        "/shop",
        &[("content-type", "application/x-www-form-urlencoded")],
        wrong.as_bytes(),
    );
    let resp = handle_request(&store, &bad, &env(), NOW);
    assert_eq!(*resp.status(), 503u16);
    assert!(header(&resp, "set-cookie").is_none());
}

#[test]
fn disabling_restores_access() {
    let store = MemoryStore::default();
    save_settings(&store, "enabled=1");
    assert_eq!(*visit(&store, "192.0.2.50", "/", None).status(), 503u16);
    save_settings(&store, "enabled=0");
    assert_eq!(*visit(&store, "192.0.2.50", "/", None).status(), 200u16);
}
