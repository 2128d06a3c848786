//! services/api/src/services/password.rs
//!
//! Salted, adaptive password hashing with Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::error;

use crate::error::ServiceError;

/// Hashes and verifies passwords off the async executor.
#[derive(Clone, Debug)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    /// Builds the hasher from optional cost overrides, falling back to the argon2 defaults.
    pub fn from_costs(
        memory_kib: Option<u32>,
        iterations: Option<u32>,
    ) -> Result<Self, ServiceError> {
        let params = Params::new(
            memory_kib.unwrap_or(Params::DEFAULT_M_COST),
            iterations.unwrap_or(Params::DEFAULT_T_COST),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| ServiceError::Internal(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Self::with_params(params))
    }

    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a PHC string. Blocks the calling thread for the full hashing cost.
    pub fn hash_blocking(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                ServiceError::Internal("Failed to hash password".to_string())
            })
    }

    /// Checks `password` against a PHC string using the parameters embedded in it.
    pub fn verify_blocking(&self, password: &str, phc: &str) -> Result<bool, ServiceError> {
        let parsed_hash = PasswordHash::new(phc).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            ServiceError::Internal("Stored password hash is unreadable".to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub async fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify(&self, password: &str, phc: &str) -> Result<bool, ServiceError> {
        let hasher = self.clone();
        let password = password.to_string();
        let phc = phc.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&password, &phc))
            .await
            .map_err(|e| ServiceError::Internal(format!("Verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHashing {
        PasswordHashing::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[tokio::test]
    async fn hash_is_salted_and_verifies() {
        let hasher = cheap();
        let first = hasher.hash("secret123").await.unwrap();
        let second = hasher.hash("secret123").await.unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("secret123"));
        assert!(first.starts_with("$argon2id$"));
        assert!(hasher.verify("secret123", &first).await.unwrap());
        assert!(!hasher.verify("wrong", &first).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_is_an_internal_error() {
        let result = cheap().verify("secret123", "not-a-phc-string").await;
        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        assert!(PasswordHashing::from_costs(None, Some(0)).is_err());
        assert!(PasswordHashing::from_costs(Some(8), Some(1)).is_ok());
    }
}
