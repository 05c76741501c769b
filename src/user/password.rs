use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::Rng;

use crate::error::Error;

const SALT_BYTES: usize = 16;

/// Hashes the password into a PHC string, e.g. `$argon2id$v=19$...`.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let bytes: [u8; SALT_BYTES] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&bytes)?;

    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(password_hash)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
