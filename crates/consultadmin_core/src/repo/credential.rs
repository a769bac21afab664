//! Credential hashing for the SQLite account store.
//!
//! # Invariants
//! - Plaintext credentials never leave this module; only PHC-format hash
//!   strings are persisted.
//! - Every hash uses a fresh random salt.

use crate::repo::{RepoError, RepoResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};

/// Argon2id hasher with configurable cost.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher {
    /// Builds a hasher with explicit memory (KiB) and iteration costs.
    ///
    /// Low costs are meant for fixtures and bulk imports of throwaway data.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> RepoResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| RepoError::Credential(format!("invalid argon2 params: {err}")))?;
        Ok(Self { params })
    }

    /// Hashes `credential` into a PHC string.
    pub fn hash(&self, credential: &str) -> RepoResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(credential.as_bytes(), &salt)
            .map_err(|err| RepoError::Credential(format!("failed to hash credential: {err}")))?;
        Ok(hash.to_string())
    }

    /// Checks `credential` against a stored PHC string.
    ///
    /// Returns `Ok(false)` on mismatch and `Err` only for unparsable hashes.
    pub fn verify(&self, credential: &str, stored_hash: &str) -> RepoResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| RepoError::InvalidData(format!("invalid password hash: {err}")))?;
        Ok(self
            .argon2()
            .verify_password(credential.as_bytes(), &parsed)
            .is_ok())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::CredentialHasher;

    #[test]
    fn hash_verifies_and_rejects_wrong_credential() {
        let hasher = CredentialHasher::with_cost(8, 1).expect("cheap params should be valid");
        let hash = hasher.hash("Password123!").expect("hashing should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Password123!"));
        assert!(hasher.verify("Password123!", &hash).expect("hash should parse"));
        assert!(!hasher.verify("wrong", &hash).expect("hash should parse"));
    }

    #[test]
    fn same_credential_hashes_differently() {
        let hasher = CredentialHasher::with_cost(8, 1).expect("cheap params should be valid");
        let first = hasher.hash("secret").expect("hashing should succeed");
        let second = hasher.hash("secret").expect("hashing should succeed");
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        let hasher = CredentialHasher::default();
        assert!(hasher.verify("secret", "not-a-phc-string").is_err());
    }
}
