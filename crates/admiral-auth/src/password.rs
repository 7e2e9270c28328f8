//! Password hashing and verification using Argon2id.
//!
//! The default [`Argon2`] parameters (19 MiB, t=2, p=1) follow the
//! current OWASP recommendation. An optional pepper is prepended to the
//! password on both sides; it must be identical at hash and verify time.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use admiral_core::{AppError, AppResult};

fn peppered<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{password}");
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a plaintext password into PHC string form.
pub fn hash_password(password: &str, pepper: Option<&str>) -> AppResult<String> {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(input, &salt)
        .map_err(|e| AppError::Crypto(format!("hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or an error
/// if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> AppResult<bool> {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AppError::Crypto(format!("invalid hash format: {e}")))?;
    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Crypto(format!("verify error: {e}"))),
    }
}
