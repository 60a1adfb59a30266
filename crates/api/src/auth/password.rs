//! Argon2id password hashing and the password rules applied at
//! registration and password change.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use folio_core::error::CoreError;

/// Hash a plaintext password with Argon2id and a random salt, returning the
/// PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only for an unparseable stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check a new password and its confirmation.
pub fn validate_new_password(
    password: &str,
    confirmation: &str,
    min_length: usize,
) -> Result<(), CoreError> {
    if password != confirmation {
        return Err(CoreError::Validation("Passwords do not match".into()));
    }
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct-horse-battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        assert_matches!(
            validate_new_password("longenough1", "longenough2", 8),
            Err(CoreError::Validation(msg)) if msg.contains("match")
        );
    }

    #[test]
    fn short_password_is_rejected() {
        assert_matches!(
            validate_new_password("short", "short", 8),
            Err(CoreError::Validation(msg)) if msg.contains("at least 8")
        );
        assert!(validate_new_password("exactly8", "exactly8", 8).is_ok());
    }
}
