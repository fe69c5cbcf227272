//! Password policy, hashing, and verification.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Registration password policy: at least 8 characters, a digit, and an
/// uppercase letter. Checked before any hashing happens.
#[must_use]
pub fn acceptable(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(char::is_uppercase)
}

/// Hash a password into an Argon2id PHC string with a fresh random salt.
///
/// # Errors
///
/// Returns an error if the hashing backend fails
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;

    Ok(digest.to_string())
}

/// Verify a password against a stored digest.
///
/// Malformed digests verify as false rather than erroring; the caller
/// only ever learns that the pair did not match.
#[must_use]
pub fn verify(password: &str, digest: &str) -> bool {
    PasswordHash::new(digest).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_rejects_short_passwords() {
        assert!(!acceptable("short1A"));
    }

    #[test]
    fn policy_rejects_missing_uppercase() {
        assert!(!acceptable("alllowercase1"));
    }

    #[test]
    fn policy_rejects_missing_digit() {
        assert!(!acceptable("NoDigitsHere"));
    }

    #[test]
    fn policy_accepts_valid_password() {
        assert!(acceptable("ValidPass1"));
        assert!(acceptable("Abcdefg1"));
    }

    #[test]
    fn hash_then_verify_round_trip() {
        let digest = hash("Abcdefg1").unwrap();
        assert!(digest.starts_with("$argon2"));
        assert!(verify("Abcdefg1", &digest));
        assert!(!verify("Abcdefg2", &digest));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash("Abcdefg1").unwrap();
        let second = hash("Abcdefg1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_malformed_digest() {
        assert!(!verify("Abcdefg1", "not-a-phc-string"));
    }
}
