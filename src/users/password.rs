use argon2::Argon2;
use base64ct::{Base64Unpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use tracing::error;

use crate::users::error::{UserError, UserResult};

pub const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Fixed-length salt, so argon2's salt length check can never trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SALT_LEN]> for Salt {
    fn from(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Salt {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(<[u8; SALT_LEN]>::try_from(bytes)?))
    }
}

/// Produces salts and salted hashes. Hashing must be deterministic for a given
/// (plain, salt) pair: the stored hash is looked up by exact match.
pub trait PasswordHasher: Send + Sync {
    fn generate_salt(&self) -> UserResult<Salt>;
    fn hash_password(&self, plain: &str, salt: &Salt) -> UserResult<String>;
}

#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2Hasher {
    fn generate_salt(&self) -> UserResult<Salt> {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            error!(error = %e, "os entropy source failed");
            UserError::FatalConfig(format!("salt generation failed: {e}"))
        })?;
        Ok(Salt(bytes))
    }

    fn hash_password(&self, plain: &str, salt: &Salt) -> UserResult<String> {
        let mut out = [0u8; HASH_LEN];
        self.argon2
            .hash_password_into(plain.as_bytes(), salt.as_bytes(), &mut out)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password_into error");
                UserError::FatalConfig(format!("password hashing failed: {e}"))
            })?;
        Ok(Base64Unpadded::encode_string(&out))
    }
}
