// src/security/mod.rs
// Stateless helpers shared by the admin sanitizer and the gate.

pub mod html;
pub mod ip;
pub mod nonce;
pub mod password;

/// Compares two strings without short-circuiting on the first differing byte.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
