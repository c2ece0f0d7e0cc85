//! Test helpers for datastore integration tests.
//!
//! Provides a small world builder on top of `InMemory`.

#![allow(dead_code)]

use snailmail::{Context, Coordinate, InMemory, Mail, MailGuid, Mailbox, User, UserGuid};

/// Password used for every fixture user.
pub const PASSWORD: &str = "password123";

/// A datastore with a shared context.
pub struct World {
    pub store: InMemory,
    pub ctx: Context,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            store: InMemory::new(),
            ctx: Context::new(),
        }
    }

    /// Create a user and return their guid.
    pub fn user(&self, username: &str, mail_carry_capacity: u32) -> UserGuid {
        let user = User::new(username, mail_carry_capacity);
        let guid = user.user_guid;
        self.store.create_user(&self.ctx, user, PASSWORD).unwrap();
        guid
    }

    /// Create a public mailbox at the origin.
    pub fn public_mailbox(&self, address: &str, capacity: u32) {
        self.store
            .create_mailbox(&self.ctx, Mailbox::new(address, capacity, Coordinate::default()))
            .unwrap();
    }

    /// Create a mailbox owned by `owner` at the origin.
    pub fn home_mailbox(&self, address: &str, capacity: u32, owner: UserGuid) {
        self.store
            .create_mailbox(
                &self.ctx,
                Mailbox::new(address, capacity, Coordinate::default()).with_owner(owner),
            )
            .unwrap();
    }

    /// Write mail from `from` to `to` and return its guid.
    pub fn write_mail(&self, from: UserGuid, to: UserGuid) -> MailGuid {
        let mail = Mail::new(from, to);
        let guid = mail.mail_guid;
        self.store.create_mail(&self.ctx, mail).unwrap();
        guid
    }

    /// Guids the user is carrying.
    pub fn carried(&self, user: UserGuid) -> Vec<MailGuid> {
        guids(self.store.get_carried_mail(&self.ctx, user).unwrap())
    }

    /// Guids the user holds at rest.
    pub fn at_rest(&self, user: UserGuid) -> Vec<MailGuid> {
        guids(self.store.get_user_mail(&self.ctx, user).unwrap())
    }

    /// Guids resident in a mailbox.
    pub fn resident(&self, address: &str) -> Vec<MailGuid> {
        guids(self.store.get_mailbox_mail(&self.ctx, address).unwrap())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Map mail values to their guids, keeping order.
pub fn guids(mail: Vec<Mail>) -> Vec<MailGuid> {
    mail.into_iter().map(|m| m.mail_guid).collect()
}
