//! Password hashing adapter.
//!
//! Staff credentials are stored as PBKDF2-SHA256 strings in PHC format, for
//! example `$pbkdf2-sha256$i=600000,l=32$<salt>$<hash>`. The round count is
//! encoded in each hash, so raising it only affects new credentials.

use pbkdf2::Pbkdf2;
use pbkdf2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use rand::RngCore;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Default PBKDF2 iteration count for new hashes.
pub const DEFAULT_ROUNDS: u32 = 600_000;
const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;

/// [`CredentialHasher`] backed by PBKDF2-HMAC-SHA256.
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2CredentialHasher {
    rounds: u32,
}

impl Pbkdf2CredentialHasher {
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    fn salt() -> Result<SaltString, CredentialHashError> {
        let mut bytes = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes).map_err(|err| CredentialHashError::hashing(err.to_string()))
    }
}

impl Default for Pbkdf2CredentialHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl CredentialHasher for Pbkdf2CredentialHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHashError> {
        let salt = Self::salt()?;
        let params = pbkdf2::Params {
            rounds: self.rounds,
            output_length: OUTPUT_LEN,
        };
        let hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(hash.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        let Ok(parsed) = PhcString::new(hash.as_ref()) else {
            return false;
        };
        Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
