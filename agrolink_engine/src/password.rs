//! Argon2 password hashing.
//!
//! Hashes are salted per-call, so the same password hashes differently on every registration.
//! Login verifies against a dummy hash when the email is unknown, so an attacker cannot tell a
//! wrong password from a missing account by timing.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::traits::IdentityApiError;

/// A syntactically valid hash that no password verifies against. Used to equalize the work done
/// for unknown emails at login.
pub const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

pub fn hash_password(plain: &str) -> Result<String, IdentityApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| IdentityApiError::PasswordHashError(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn same_password_different_salts() {
        let h1 = hash_password("repetido").unwrap();
        let h2 = hash_password("repetido").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("repetido", &h1));
        assert!(verify_password("repetido", &h2));
    }

    #[test]
    fn dummy_hash_never_verifies() {
        assert!(!verify_password("anything", DUMMY_HASH));
    }
}
