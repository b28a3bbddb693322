// src/security/nonce.rs
// Anti-forgery tokens for the unlock form. A token is an HMAC over the
// current half-day tick and the form action, so it stays valid for 12-24h
// without any server-side state.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::constant_time_eq;

pub const NONCE_LIFETIME_SECONDS: u64 = 86_400;
const TOKEN_LEN: usize = 22;

fn tick(now: u64) -> u64 {
    now.div_ceil(NONCE_LIFETIME_SECONDS / 2)
}

fn sign(secret: &str, tick: u64, action: &str) -> String {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(format!("{}|{}", tick, action).as_bytes());
    let mut token = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    token.truncate(TOKEN_LEN);
    token
}

/// Issues a token for `action` at time `now` (unix seconds).
pub fn create_nonce(secret: &str, action: &str, now: u64) -> String {
    sign(secret, tick(now), action)
}

/// Accepts tokens minted in the current or the previous tick.
pub fn verify_nonce(secret: &str, nonce: &str, action: &str, now: u64) -> bool {
    if secret.is_empty() || nonce.len() != TOKEN_LEN {
        return false;
    }
    let current = tick(now);
    if constant_time_eq(nonce, &sign(secret, current, action)) {
        return true;
    }
    current > 0 && constant_time_eq(nonce, &sign(secret, current - 1, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-nonce-secret";
    const ACTION: &str = "pdmiuc_password_form";
    const NOW: u64 = 1_760_000_000;

    #[test]
    fn fresh_token_validates_for_its_action() {
        let nonce = create_nonce(SECRET, ACTION, NOW);
        assert_eq!(nonce.len(), TOKEN_LEN);
        assert!(verify_nonce(SECRET, &nonce, ACTION, NOW));
    }

    #[test]
    fn token_is_bound_to_action_and_secret() {
        let nonce = create_nonce(SECRET, ACTION, NOW);
        assert!(!verify_nonce(SECRET, &nonce, "other_form", NOW));
        assert!(!verify_nonce("other-secret", &nonce, ACTION, NOW));
    }

    #[test]
    fn token_survives_one_tick_then_expires() {
        let nonce = create_nonce(SECRET, ACTION, NOW);
        let half_day = NONCE_LIFETIME_SECONDS / 2;
        assert!(verify_nonce(SECRET, &nonce, ACTION, NOW + half_day));
        assert!(!verify_nonce(SECRET, &nonce, ACTION, NOW + NONCE_LIFETIME_SECONDS + 1));
    }

    #[test]
    fn empty_secret_or_malformed_token_never_validates() {
        let nonce = create_nonce("", ACTION, NOW);
        assert!(!verify_nonce("", &nonce, ACTION, NOW));
        assert!(!verify_nonce(SECRET, "", ACTION, NOW));
        assert!(!verify_nonce(SECRET, "short", ACTION, NOW));
    }
}
