//! Activation key generation
//!
//! An activation key is the lowercase hex SHA-256 digest of a random salt followed by
//! the username. The salt carries 128 bits of entropy so keys cannot be guessed from
//! the username alone.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of an activation key in characters
pub const ACTIVATION_KEY_LENGTH: usize = 64;

/// Generate a fresh activation key for `username`
pub fn generate_activation_key(username: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(hex::encode(salt).as_bytes());
    hasher.update(username.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `key` has the shape of an activation key
///
/// Checked before any lookup so malformed input never reaches storage.
pub fn is_activation_key(key: &str) -> bool {
    key.len() == ACTIVATION_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_activation_key_format() {
        let key = generate_activation_key("alice");
        assert_eq!(key.len(), ACTIVATION_KEY_LENGTH);
        assert!(is_activation_key(&key));
    }

    #[test]
    fn test_activation_keys_are_salted() {
        assert_ne!(
            generate_activation_key("alice"),
            generate_activation_key("alice")
        );
    }

    #[test]
    fn test_is_activation_key_rejects_malformed() {
        assert!(!is_activation_key(""));
        assert!(!is_activation_key("ALREADY_ACTIVATED"));
        assert!(!is_activation_key(&"A".repeat(ACTIVATION_KEY_LENGTH)));
        assert!(!is_activation_key(&"a".repeat(ACTIVATION_KEY_LENGTH - 1)));
        assert!(is_activation_key(&"0f".repeat(ACTIVATION_KEY_LENGTH / 2)));
    }
}
