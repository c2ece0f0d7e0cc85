//! User types for Snail Mail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserGuid(Uuid);

impl UserGuid {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for UserGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserGuid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A registered user.
///
/// Every user may act as a courier, carrying up to `mail_carry_capacity`
/// pieces of mail at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub user_guid: UserGuid,
    /// Login username (unique).
    pub username: String,
    /// Maximum number of mail items carried simultaneously.
    pub mail_carry_capacity: u32,
}

impl User {
    /// Create a new user with a freshly generated identifier.
    pub fn new(username: impl Into<String>, mail_carry_capacity: u32) -> Self {
        Self {
            user_guid: UserGuid::new(),
            username: username.into(),
            mail_carry_capacity,
        }
    }

    /// Use a specific identifier instead of the generated one.
    pub fn with_guid(mut self, user_guid: UserGuid) -> Self {
        self.user_guid = user_guid;
        self
    }

    /// Check whether a courier manifest of `carried` items is full.
    pub fn is_carrying_full_load(&self, carried: usize) -> bool {
        carried >= self.mail_carry_capacity as usize
    }
}
