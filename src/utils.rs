use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            AppError::PasswordError(e.to_string())
        })
}

/// `Ok(false)` on a wrong password, `Err` only when the stored hash is unusable.
pub fn verify_password(provided: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        log::error!("Stored password hash is malformed: {}", e);
        AppError::PasswordError(e.to_string())
    })?;
    match Argon2::default().verify_password(provided.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::PasswordError(e.to_string())),
    }
}

/// Decoded size of a base64 payload, without decoding it.
pub fn byte_size(base64: &str) -> String {
    let trimmed = base64.trim();
    let padding = trimmed.chars().rev().take_while(|c| *c == '=').count();
    let size = (trimmed.len() / 4 * 3).saturating_sub(padding);
    format!("{size} bytes")
}

pub fn decode_document(base64: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(base64.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse battery", &hash).unwrap());
    }

    #[test]
    fn plain_text_is_not_a_hash() {
        assert!(verify_password("secret", "secret").is_err());
    }

    #[test]
    fn byte_size_matches_decoded_length() {
        for payload in [&b""[..], b"a", b"ab", b"abc", b"%PDF-1.4 document"] {
            let encoded = STANDARD.encode(payload);
            assert_eq!(byte_size(&encoded), format!("{} bytes", payload.len()));
            assert_eq!(decode_document(&encoded).unwrap(), payload);
        }
    }
}
