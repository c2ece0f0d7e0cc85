//! Mailbox types for Snail Mail.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::user::UserGuid;

/// A physical mailbox at a named address.
///
/// A mailbox without an owner is a public exchange: any courier may drop
/// off or pick up any mail there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mailbox {
    /// Unique mailbox address.
    pub address: String,
    /// Owning user, if any.
    pub owner: Option<UserGuid>,
    /// Maximum number of resident mail items.
    pub capacity: u32,
    /// Where the mailbox stands.
    pub location: Coordinate,
}

impl Mailbox {
    /// Create a new public mailbox.
    pub fn new(address: impl Into<String>, capacity: u32, location: Coordinate) -> Self {
        Self {
            address: address.into(),
            owner: None,
            capacity,
            location,
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner: UserGuid) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Check whether this is a public exchange mailbox.
    pub fn is_public(&self) -> bool {
        self.owner.is_none()
    }

    /// Check whether `user` owns this mailbox.
    pub fn is_owned_by(&self, user: UserGuid) -> bool {
        self.owner == Some(user)
    }

    /// Check whether a resident list of `resident` items is full.
    pub fn is_full(&self, resident: usize) -> bool {
        resident >= self.capacity as usize
    }

    /// Check whether the mailbox accepts drop-off of mail addressed to `to`.
    ///
    /// Owned mailboxes only accept mail for their owner.
    pub fn accepts_mail_for(&self, to: UserGuid) -> bool {
        match self.owner {
            Some(owner) => owner == to,
            None => true,
        }
    }

    /// Check whether the mailbox lies within `radius_meters` of `location`.
    pub fn is_nearby(&self, location: &Coordinate, radius_meters: f64) -> bool {
        self.location.is_within(location, radius_meters)
    }
}
