//! Argon2 password hashing shared by the server and the admin CLI.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::{EngineError, ResultEngine};

/// Hashes a plaintext password with a fresh random salt.
pub fn hash(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Invalid(format!("failed to hash password: {err}")))
}

/// Verifies a plaintext password against a stored hash.
///
/// An unparsable stored hash counts as a mismatch.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
