//! Password hashing and password-reset tokens.
//!
//! New hashes are argon2id PHC strings (`$argon2id$v=19$...`). Accounts
//! created before the switch carry `blake3$<rounds>$<salt hex>$<hash hex>`,
//! which [`verify_password`] still accepts.

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::AuthError;

const LEGACY_SCHEME: &str = "blake3";

/// Hash `password` with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against an encoded hash.
///
/// Returns `Ok(false)` on mismatch and an error only when `encoded` is not a
/// hash this module understands.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, AuthError> {
    if encoded.starts_with("$argon2") {
        let parsed = PasswordHash::new(encoded).map_err(|_| AuthError::MalformedHash)?;
        return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::MalformedHash),
        };
    }
    verify_legacy(password, encoded)
}

fn verify_legacy(password: &str, encoded: &str) -> Result<bool, AuthError> {
    let mut parts = encoded.split('$');
    let (Some(LEGACY_SCHEME), Some(rounds), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(AuthError::MalformedHash);
    };
    let rounds: u32 = rounds.parse().map_err(|_| AuthError::MalformedHash)?;
    let salt = uuid::Uuid::try_parse(salt).map_err(|_| AuthError::MalformedHash)?;
    let expected = blake3::Hash::from_hex(hash).map_err(|_| AuthError::MalformedHash)?;

    // blake3::Hash equality is constant-time.
    Ok(legacy_derive(password, salt.as_bytes(), rounds) == expected)
}

fn legacy_derive(password: &str, salt: &[u8], rounds: u32) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key("mindwell password v1");
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut hash = hasher.finalize();
    for _ in 1..rounds {
        let mut hasher = blake3::Hasher::new();
        hasher.update(salt);
        hasher.update(hash.as_bytes());
        hash = hasher.finalize();
    }
    hash
}

/// A fresh password-reset token and the hash to store for it.
///
/// The token goes out by email; only the hash is persisted.
pub fn new_reset_token() -> (String, String) {
    let token = format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    );
    let hash = hash_reset_token(&token);
    (token, hash)
}

/// Hash a reset token for storage or lookup.
pub fn hash_reset_token(token: &str) -> String {
    blake3::hash(token.trim().as_bytes()).to_hex().to_string()
}
