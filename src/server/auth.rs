//! Password hashing and bearer tokens.

use crate::constants::{PASSWORD_HASH_ROUNDS, SALT_BYTES};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Random per-user salt, hex encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Salted, iterated SHA-256 of a password, hex encoded.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..PASSWORD_HASH_ROUNDS {
        digest = Sha256::new()
            .chain_update(digest.as_slice())
            .chain_update(password.as_bytes())
            .finalize();
    }
    to_hex(&digest)
}

/// Check a password against a stored salt and hash.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let computed = hash_password(password, salt);
    if computed.len() != expected_hash.len() {
        return false;
    }
    // Compare every byte regardless of where the first mismatch is
    computed
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Fresh session token.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extract the token from an `Authorization` header value.
///
/// The header must be exactly two space-separated parts (`Bearer <token>`);
/// anything else yields no token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?;
    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return None;
    }
    Some(parts[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_per_salt() {
        let a = hash_password("secret", "abcd");
        let b = hash_password("secret", "abcd");
        let c = hash_password("secret", "abce");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt();
        let hash = hash_password("pw", &salt);
        assert!(verify_password("pw", &salt, &hash));
        assert!(!verify_password("pW", &salt, &hash));
        assert!(!verify_password("pw", &salt, "short"));
    }

    #[test]
    fn test_salts_and_tokens_are_unique() {
        assert_eq!(generate_salt().len(), SALT_BYTES * 2);
        assert_ne!(generate_salt(), generate_salt());
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(Some("Token abc123")), Some("abc123"));
        assert_eq!(bearer_token(Some("abc123")), None);
        assert_eq!(bearer_token(Some("Bearer a b")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(None), None);
    }
}
