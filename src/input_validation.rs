use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::HashMap;

pub const MAX_ADMIN_BODY_BYTES: usize = 64 * 1024;
pub const MAX_UNLOCK_FORM_BYTES: usize = 8 * 1024;

pub fn enforce_body_size(body: &[u8], max_bytes: usize) -> Result<(), &'static str> {
    if body.len() > max_bytes {
        return Err("Payload too large");
    }
    Ok(())
}

pub fn parse_json_body(body: &[u8], max_bytes: usize) -> Result<Value, &'static str> {
    enforce_body_size(body, max_bytes)?;
    serde_json::from_slice::<Value>(body).map_err(|_| "Invalid JSON")
}

/// Decodes one `application/x-www-form-urlencoded` component.
pub fn url_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().to_string()
}

/// Parses a urlencoded body into a field map. Later duplicates overwrite earlier ones.
pub fn parse_form_body(body: &[u8], max_bytes: usize) -> Result<HashMap<String, String>, &'static str> {
    enforce_body_size(body, max_bytes)?;
    let form = std::str::from_utf8(body).map_err(|_| "Invalid form encoding")?;
    Ok(form
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = url_decode(parts.next().unwrap_or(""));
            let value = url_decode(parts.next().unwrap_or(""));
            (key, value)
        })
        .collect())
}
