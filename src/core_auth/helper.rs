use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use log::warn;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// A malformed hash never authenticates anyone.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or_else(|e| {
        warn!("Configured password hash is unusable: {}", e);
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_round_trip() {
        let hashed = hash_password_with_cost("s3cret", 4).unwrap();
        assert!(verify_password("s3cret", &hashed));
        assert!(!verify_password("secret", &hashed));
    }

    #[test]
    fn test_malformed_hash_rejects() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
