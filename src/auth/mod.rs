//! Authentication module for Snail Mail.
//!
//! This module provides the credential storage policy and Argon2id
//! password hashing used by the datastore.

mod credential;
mod password;

pub use credential::{CredentialStorage, StoredCredential};
pub use password::{hash_password, verify_password, PasswordError};
