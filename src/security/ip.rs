// src/security/ip.rs
// IP syntax checks and allow-list sanitation for the admin textarea.

use std::collections::HashSet;
use std::net::IpAddr;

use tracing::debug;

/// True when `candidate` is a literal IPv4 or IPv6 address.
pub fn is_valid_ip(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.parse::<IpAddr>().is_ok()
}

/// Parses `candidate` and returns its one canonical text form.
pub fn canonical_ip(candidate: &str) -> Option<String> {
    candidate.trim().parse::<IpAddr>().ok().map(|addr| addr.to_string())
}

/// True when `ip` names the same address as any entry of `list`, whatever their spelling.
pub fn ip_in_list(ip: &str, list: &[String]) -> bool {
    let Ok(addr) = ip.trim().parse::<IpAddr>() else {
        return false;
    };
    list.iter()
        .any(|entry| entry.trim().parse::<IpAddr>().is_ok_and(|allowed| allowed == addr))
}

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

/// Turns free-form admin input into an ordered list of unique, valid IPs.
///
/// Any run of commas and whitespace separates entries. Invalid entries are
/// dropped without an error. Entries are stored canonically, so equivalent
/// spellings count as duplicates and the first occurrence wins.
pub fn sanitize_ip_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in input.split(is_separator).map(str::trim) {
        if candidate.is_empty() {
            continue;
        }
        let Some(ip) = canonical_ip(candidate) else {
            debug!(entry = candidate, "dropping invalid allow-list entry");
            continue;
        };
        if seen.insert(ip.clone()) {
            out.push(ip);
        }
    }
    out
}

/// Renders a stored allow-list back into the textarea format.
pub fn format_ip_list(ips: &[String]) -> String {
    ips.join(", ")
}
