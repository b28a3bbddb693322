// src/admin/sanitize.rs
// Turns one submitted settings form into a complete settings record.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::{Config, DisplayType};
use crate::security::html::{sanitize_post_html, sanitize_url};
use crate::security::ip::sanitize_ip_list;
use crate::security::password::{hash_password, PasswordError};

/// Raw admin submission. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsInput {
    pub enabled: Option<String>,
    pub allowed_ips: Option<String>,
    pub display_type: Option<String>,
    pub text_content: Option<String>,
    pub image_url: Option<String>,
    pub access_password: Option<String>,
}

fn json_field(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => None,
    }
}

impl SettingsInput {
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let field = |name: &str| form.get(name).cloned();
        Self {
            enabled: field("enabled"),
            allowed_ips: field("allowed_ips"),
            display_type: field("display_type"),
            text_content: field("text_content"),
            image_url: field("image_url"),
            access_password: field("access_password"),
        }
    }

    pub fn from_json(body: &Value) -> Result<Self, &'static str> {
        let Some(obj) = body.as_object() else {
            return Err("Expected a JSON object");
        };
        let field = |name: &str| obj.get(name).and_then(json_field);
        Ok(Self {
            enabled: field("enabled"),
            allowed_ips: field("allowed_ips"),
            display_type: field("display_type"),
            text_content: field("text_content"),
            image_url: field("image_url"),
            access_password: field("access_password"),
        })
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

/// Builds the record to persist. The previous password hash is kept unless
/// a new non-empty password was submitted.
pub fn sanitize_settings(input: &SettingsInput, existing: &Config) -> Result<Config, PasswordError> {
    let access_password_hash = match input.access_password.as_deref() {
        Some(password) if !password.is_empty() => hash_password(password)?,
        _ => existing.access_password_hash.clone(),
    };

    Ok(Config {
        enabled: is_truthy(input.enabled.as_deref()),
        allowed_ips: sanitize_ip_list(input.allowed_ips.as_deref().unwrap_or("")),
        display_type: input
            .display_type
            .as_deref()
            .and_then(DisplayType::parse)
            .unwrap_or_default(),
        text_content: input
            .text_content
            .as_deref()
            .map(sanitize_post_html)
            .unwrap_or_default(),
        image_url: input
            .image_url
            .as_deref()
            .map(sanitize_url)
            .unwrap_or_default(),
        access_password_hash,
    })
}
