//! Credential storage policy.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::password::{hash_password, verify_password, PasswordError};

/// How the datastore keeps user credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStorage {
    /// Store the password as given and compare by exact string equality.
    #[default]
    Plaintext,
    /// Store a salted Argon2id hash and verify against it.
    Argon2,
}

impl CredentialStorage {
    /// Configuration string for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialStorage::Plaintext => "plaintext",
            CredentialStorage::Argon2 => "argon2",
        }
    }

    /// Turn a password into the credential kept by the store.
    pub fn seal(&self, password: &str) -> Result<StoredCredential, PasswordError> {
        match self {
            CredentialStorage::Plaintext => Ok(StoredCredential::Plaintext(password.to_string())),
            CredentialStorage::Argon2 => Ok(StoredCredential::Argon2(hash_password(password)?)),
        }
    }
}

impl fmt::Display for CredentialStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CredentialStorage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plaintext" => Ok(CredentialStorage::Plaintext),
            "argon2" => Ok(CredentialStorage::Argon2),
            _ => Err(format!("unknown credential storage: {s}")),
        }
    }
}

/// A credential as held by the datastore.
///
/// The variant records the policy that produced it, so a credential keeps
/// verifying the same way even if a store is reconfigured.
#[derive(Clone, PartialEq, Eq)]
pub enum StoredCredential {
    /// Password kept verbatim.
    Plaintext(String),
    /// Argon2id PHC string.
    Argon2(String),
}

impl StoredCredential {
    /// Check a candidate password against this credential.
    pub fn matches(&self, password: &str) -> bool {
        match self {
            StoredCredential::Plaintext(expected) => expected == password,
            StoredCredential::Argon2(hash) => verify_password(password, hash).is_ok(),
        }
    }
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredCredential::Plaintext(_) => f.write_str("StoredCredential::Plaintext(..)"),
            StoredCredential::Argon2(_) => f.write_str("StoredCredential::Argon2(..)"),
        }
    }
}
