//! Password hashing

use crate::{AuthError, AuthResult};

#[cfg(feature = "argon2")]
use rand::thread_rng;

#[cfg(feature = "argon2")]
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

#[cfg(feature = "bcrypt")]
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes and verifies account passwords
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool>;

    fn hasher_name(&self) -> &str;
}

/// Argon2id password hasher
#[cfg(feature = "argon2")]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

#[cfg(feature = "argon2")]
impl Argon2Hasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    pub fn production() -> Self {
        Self::new(65536, 4, 4)
    }

    /// Cheap parameters for development and tests
    pub fn development() -> Self {
        Self::new(4096, 2, 2)
    }

    fn argon2(&self) -> AuthResult<Argon2<'static>> {
        let params = argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

#[cfg(feature = "argon2")]
impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(65536, 3, 4)
    }
}

#[cfg(feature = "argon2")]
impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut thread_rng());
        let password_hash = self.argon2()?.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(hash)?;
        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn hasher_name(&self) -> &str {
        "argon2"
    }
}

/// bcrypt password hasher
#[cfg(feature = "bcrypt")]
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn production() -> Self {
        Self { cost: 12 }
    }

    pub fn development() -> Self {
        Self { cost: 4 }
    }
}

#[cfg(feature = "bcrypt")]
impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        hash(password, self.cost).map_err(AuthError::from)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        verify(password, hash).map_err(AuthError::from)
    }

    fn hasher_name(&self) -> &str {
        "bcrypt"
    }
}

/// Pick a hasher by algorithm name; `development` selects the cheap presets
pub fn hasher_for(algorithm: &str, development: bool) -> AuthResult<Box<dyn PasswordHasher>> {
    match algorithm {
        #[cfg(feature = "argon2")]
        "argon2" if development => Ok(Box::new(Argon2Hasher::development())),
        #[cfg(feature = "argon2")]
        "argon2" => Ok(Box::new(Argon2Hasher::production())),
        #[cfg(feature = "bcrypt")]
        "bcrypt" if development => Ok(Box::new(BcryptHasher::development())),
        #[cfg(feature = "bcrypt")]
        "bcrypt" => Ok(Box::new(BcryptHasher::production())),
        _ => Err(AuthError::config_error(format!(
            "Unknown password hashing algorithm: {} (or feature not enabled)",
            algorithm
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "argon2")]
    #[test]
    fn test_argon2_round_trip() {
        let hasher = Argon2Hasher::development();
        let hash = hasher.hash_password("mwenyezi123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("mwenyezi123", &hash).unwrap());
        assert!(!hasher.verify_password("wrong", &hash).unwrap());
    }

    #[cfg(feature = "bcrypt")]
    #[test]
    fn test_bcrypt_round_trip() {
        let hasher = BcryptHasher::development();
        let hash = hasher.hash_password("mwenyezi123").unwrap();

        assert!(hasher.verify_password("mwenyezi123", &hash).unwrap());
        assert!(!hasher.verify_password("wrong", &hash).unwrap());
        assert_eq!(hasher.hasher_name(), "bcrypt");
    }

    #[test]
    fn test_unknown_algorithm() {
        assert!(hasher_for("md5", true).is_err());
        #[cfg(feature = "argon2")]
        assert_eq!(hasher_for("argon2", true).unwrap().hasher_name(), "argon2");
    }
}
