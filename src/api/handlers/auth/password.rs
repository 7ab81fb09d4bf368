//! Password hashing, treated as a black-box primitive by the rest of the
//! auth stack.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a plaintext password with argon2id and a random salt.
///
/// # Errors
/// Returns an error if hashing fails.
pub(super) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash.
///
/// Unparseable hashes verify as false rather than erroring; a corrupt stored
/// hash must not be distinguishable from a wrong password.
pub(super) fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("pw12345678").expect("hash");
        assert!(verify_password("pw12345678", &hash));
        assert!(!verify_password("pw12345679", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("pw12345678").expect("hash");
        let second = hash_password("pw12345678").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("pw12345678", "not-a-phc-string"));
        assert!(!verify_password("pw12345678", ""));
    }
}
