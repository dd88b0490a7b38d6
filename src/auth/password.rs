use crate::error::{AppError, AppResult};

/// Salted bcrypt hash. `cost` is the configured work factor (4..=31).
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Constant-time via bcrypt. A malformed hash verifies as false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> AppResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))??;
    Ok(hash)
}

/// `verify_password` on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[test]
    fn hash_verifies_original_password_only() {
        let hash = hash_password("pw12345", COST).unwrap();
        assert_ne!(hash, "pw12345");
        assert!(verify_password("pw12345", &hash));
        assert!(!verify_password("pw123456", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let h1 = hash_password("same", COST).unwrap();
        let h2 = hash_password("same", COST).unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same", &h1));
        assert!(verify_password("same", &h2));
    }

    #[test]
    fn malformed_hash_is_false_not_panic() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "not-a-bcrypt-hash"));
    }

    #[test]
    fn cost_is_encoded_in_the_hash() {
        let hash = hash_password("pw", COST).unwrap();
        assert!(hash.starts_with("$2b$04$"));
        assert!(hash_password("pw", 3).is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_versions() {
        let hash = hash_password_blocking("secret".to_string(), COST).await.unwrap();
        assert!(verify_password_blocking("secret".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("wrong".to_string(), hash)
            .await
            .unwrap());
    }
}
