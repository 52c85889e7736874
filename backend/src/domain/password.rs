//! Credential store: salted Argon2id hashing and verification.
//!
//! Plaintext passwords only ever live inside [`Password`], which zeroes its
//! buffer on drop and never prints its contents. Hashes are stored in PHC
//! string format so verification reads algorithm, parameters and salt from
//! the stored value.

use std::fmt;
use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::{NewUser, User};

/// Failures raised while hashing or parsing credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// Argon2 parameters were rejected.
    #[error("invalid password hashing parameters: {message}")]
    Parameters { message: String },
    /// Hashing failed.
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
    /// A stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {message}")]
    MalformedHash { message: String },
}

/// Plaintext password supplied by a user.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap caller-provided plaintext without altering whitespace.
    pub fn new(plaintext: impl Into<String>) -> Self {
        Self(Zeroizing::new(plaintext.into()))
    }

    /// Borrow the plaintext.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// True when the plaintext is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Stored password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Accept a stored PHC string after checking that it parses.
    pub fn from_phc(phc: impl Into<String>) -> Result<Self, CredentialError> {
        let phc = phc.into();
        argon2::PasswordHash::new(&phc).map_err(|err| CredentialError::MalformedHash {
            message: err.to_string(),
        })?;
        Ok(Self(phc))
    }

    /// PHC representation for persistence.
    pub fn as_phc(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

const DUMMY_PASSWORD: &str = "carelog-timing-equaliser";

/// Slow, salted one-way hashing of user passwords.
///
/// # Examples
/// ```
/// use carelog::domain::{CredentialStore, Password};
///
/// let store = CredentialStore::low_cost();
/// let hash = store.hash(&Password::new("s3cret")).expect("hash");
/// assert!(store.verify(&hash, &Password::new("s3cret")));
/// assert!(!store.verify(&hash, &Password::new("guess")));
/// ```
pub struct CredentialStore {
    params: Params,
    dummy: OnceLock<Option<PasswordHash>>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::with_params(Params::DEFAULT)
    }
}

impl CredentialStore {
    /// Store using the given Argon2 cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            dummy: OnceLock::new(),
        }
    }

    /// Build a store from raw cost values.
    pub fn from_costs(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(m_cost, t_cost, p_cost, None).map_err(|err| {
            CredentialError::Parameters {
                message: err.to_string(),
            }
        })?;
        Ok(Self::with_params(params))
    }

    /// Minimum-cost store for tests and doc examples.
    pub fn low_cost() -> Self {
        Self::with_params(
            Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
                .unwrap_or_default(),
        )
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| CredentialError::Hashing {
                message: err.to_string(),
            })?;
        Ok(PasswordHash(hash.to_string()))
    }

    /// True iff `password` matches `hash`. The digest comparison is constant time.
    pub fn verify(&self, hash: &PasswordHash, password: &Password) -> bool {
        match argon2::PasswordHash::new(hash.as_phc()) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.expose().as_bytes(), &parsed)
                .is_ok(),
            Err(err) => {
                tracing::warn!(error = %err, "stored password hash failed to parse");
                false
            }
        }
    }

    /// Hash `plaintext` into the pending user record.
    pub fn set_password(&self, user: &mut NewUser, plaintext: &Password) -> Result<(), CredentialError> {
        let hash = self.hash(plaintext)?;
        user.replace_password_hash(hash);
        Ok(())
    }

    /// True iff `plaintext` matches the user's stored hash.
    pub fn check_password(&self, user: &User, plaintext: &Password) -> bool {
        self.verify(user.password_hash(), plaintext)
    }

    /// Spend the same effort as a real check when the user does not exist.
    pub fn burn_verification(&self, plaintext: &Password) {
        let dummy = self
            .dummy
            .get_or_init(|| self.hash(&Password::new(DUMMY_PASSWORD)).ok());
        if let Some(hash) = dummy {
            let _ = self.verify(hash, plaintext);
        }
    }
}
