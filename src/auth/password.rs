use bcrypt::{hash, verify, DEFAULT_COST};

use super::AuthError;

/// Adaptive bcrypt hash; the salt and cost are embedded in the output
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// False for a wrong password and for anything that is not a bcrypt hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    verify(password, stored).unwrap_or(false)
}
