//! Port for password hashing and verification.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a password hash.
    pub enum CredentialHashError {
        Hashing { message: String } => "password hashing failed: {message}"; InternalError,
    }
}

/// Produces and checks PHC-format password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHashError>;

    /// Whether `password` matches `hash`. Malformed hashes never match.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}

/// Reversible stand-in for tests that do not exercise real hashing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

impl FixtureCredentialHasher {
    const PREFIX: &'static str = "fixture$";
}

impl CredentialHasher for FixtureCredentialHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHashError> {
        Ok(PasswordHash::new(format!("{}{password}", Self::PREFIX)))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        hash.as_ref()
            .strip_prefix(Self::PREFIX)
            .is_some_and(|stored| stored == password)
    }
}
