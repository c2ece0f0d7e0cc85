//! Mail types for Snail Mail.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserGuid;

/// Globally unique mail identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailGuid(Uuid);

impl MailGuid {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MailGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MailGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for MailGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MailGuid {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A piece of physical mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
    /// Mail ID.
    pub mail_guid: MailGuid,
    /// Sender user.
    pub from: UserGuid,
    /// Recipient user.
    pub to: UserGuid,
    /// User currently carrying the mail; `None` while it rests in a mailbox
    /// or with its recipient.
    pub carrier: Option<UserGuid>,
    /// When the mail first reached its recipient's mailbox.
    pub delivered_on: Option<DateTime<Utc>>,
    /// When the recipient last opened the mail.
    pub opened_on: Option<DateTime<Utc>>,
}

impl Mail {
    /// Create new, undelivered mail from `from` to `to`.
    pub fn new(from: UserGuid, to: UserGuid) -> Self {
        Self {
            mail_guid: MailGuid::new(),
            from,
            to,
            carrier: None,
            delivered_on: None,
            opened_on: None,
        }
    }

    /// Use a specific identifier instead of the generated one.
    pub fn with_guid(mut self, mail_guid: MailGuid) -> Self {
        self.mail_guid = mail_guid;
        self
    }

    /// Check whether the mail has reached its recipient's mailbox.
    pub fn is_delivered(&self) -> bool {
        self.delivered_on.is_some()
    }

    /// Check whether the recipient has opened the mail.
    pub fn is_opened(&self) -> bool {
        self.opened_on.is_some()
    }

    /// Check whether a courier currently holds the mail.
    pub fn is_carried(&self) -> bool {
        self.carrier.is_some()
    }
}
