//! Password hashing using Argon2
//!
//! Digests are PHC strings carrying their own salt and parameters, so a
//! digest produced under one [`HashingConfig`] still verifies after the
//! configuration changes.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use std::fmt::Debug;
use tracing::warn;

use crate::error::{AccountError, AccountResult};

/// One-way hashing of plaintext credentials
pub trait CredentialHasher: Send + Sync + Debug {
    /// Hash a plaintext password into a digest
    fn hash(&self, plaintext: &str) -> AccountResult<String>;

    /// Check a plaintext password against a digest. Malformed digests never
    /// verify.
    fn verify(&self, digest: &str, plaintext: &str) -> bool;
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashingConfig {
    /// Create a new HashingConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PASSWORD_HASH_MEMORY_KIB`: Memory cost in KiB (default: 19456)
    /// - `PASSWORD_HASH_ITERATIONS`: Time cost (default: 2)
    /// - `PASSWORD_HASH_PARALLELISM`: Lanes (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let memory_kib = std::env::var("PASSWORD_HASH_MEMORY_KIB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.memory_kib);

        let iterations = std::env::var("PASSWORD_HASH_ITERATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.iterations);

        let parallelism = std::env::var("PASSWORD_HASH_PARALLELISM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.parallelism);

        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// Smallest parameters Argon2 accepts. Only for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id credential hasher
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with the given cost parameters
    pub fn new(config: HashingConfig) -> AccountResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AccountError::Hashing(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AccountResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountError::Hashing(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, digest: &str, plaintext: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Refusing to verify against malformed password digest: {}", e);
                return false;
            }
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new(HashingConfig::minimal()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("foobar").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert_ne!(digest, "foobar");
        assert!(hasher.verify(&digest, "foobar"));
        assert!(!hasher.verify(&digest, "foobaz"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = hasher();
        let first = hasher.hash("foobar").unwrap();
        let second = hasher.hash("foobar").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "foobar"));
        assert!(hasher.verify(&second, "foobar"));
    }

    #[test]
    fn test_verify_malformed_digest() {
        let hasher = hasher();
        assert!(!hasher.verify("", ""));
        assert!(!hasher.verify("not-a-digest", "foobar"));
    }

    #[test]
    fn test_digest_verifies_under_other_parameters() {
        let digest = hasher().hash("foobar").unwrap();
        let stronger = Argon2Hasher::new(HashingConfig {
            memory_kib: 64,
            iterations: 3,
            parallelism: 1,
        })
        .unwrap();

        assert!(stronger.verify(&digest, "foobar"));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let result = Argon2Hasher::new(HashingConfig {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(AccountError::Hashing(_))));
    }

    #[test]
    #[serial]
    fn test_hashing_config_from_env() {
        unsafe {
            std::env::remove_var("PASSWORD_HASH_MEMORY_KIB");
            std::env::set_var("PASSWORD_HASH_ITERATIONS", "4");
            std::env::set_var("PASSWORD_HASH_PARALLELISM", "not-a-number");
        }

        let config = HashingConfig::from_env();
        assert_eq!(config.memory_kib, Params::DEFAULT_M_COST);
        assert_eq!(config.iterations, 4);
        assert_eq!(config.parallelism, Params::DEFAULT_P_COST);

        unsafe {
            std::env::remove_var("PASSWORD_HASH_ITERATIONS");
            std::env::remove_var("PASSWORD_HASH_PARALLELISM");
        }
    }
}
