//! Datastore trait definition for Snail Mail.
//!
//! Request handlers talk to the datastore only through this trait, so the
//! volatile in-memory backend can be replaced by a durable one without
//! changing any call contract.
//!
//! # Locking contract
//!
//! Implementations keep three independent domains: users, mail and
//! mailboxes. Operations that span mailboxes and mail (drop-off, pick-up
//! and creating mail under a reused guid) take the mailbox domain before
//! the mail domain. The user domain is only ever the innermost lock.

use chrono::{DateTime, Utc};

use super::context::Context;
use super::error::DbResult;
use crate::geo::Coordinate;
use crate::mail::{Mail, MailGuid};
use crate::mailbox::Mailbox;
use crate::user::{User, UserGuid};

/// Record counts of a datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatastoreStats {
    /// Number of users.
    pub users: usize,
    /// Number of mail records.
    pub mail: usize,
    /// Number of mailboxes.
    pub mailboxes: usize,
}

/// Storage operations for users, mail and mailboxes.
pub trait Datastore: Send + Sync {
    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Register a new user together with their credential.
    ///
    /// Fails with `UserGuidExists` or `UsernameExists`.
    fn create_user(&self, ctx: &Context, user: User, password: &str) -> DbResult<()>;

    /// Get a user by guid.
    fn get_user(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<User>;

    /// Get the mail a user holds at rest, in arrival order.
    fn get_user_mail(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Vec<Mail>>;

    /// Get the mail a user is carrying as courier, in manifest order.
    fn get_carried_mail(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Vec<Mail>>;

    /// Look up a user by username and credential.
    ///
    /// An unknown username and a wrong password both fail with `UserNotFound`.
    fn auth_user(&self, ctx: &Context, username: &str, password: &str) -> DbResult<User>;

    /// Replace a user record wholesale.
    fn update_user(&self, ctx: &Context, user: User) -> DbResult<()>;

    /// Delete a user. Deleting an unknown user succeeds.
    ///
    /// The user's mail and mailbox are left in place.
    fn delete_user(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<()>;

    // ------------------------------------------------------------------
    // Mail
    // ------------------------------------------------------------------

    /// Store new mail and put it on the sender's courier manifest.
    fn create_mail(&self, ctx: &Context, mail: Mail) -> DbResult<()>;

    /// Get mail by guid.
    fn get_mail(&self, ctx: &Context, mail_guid: MailGuid) -> DbResult<Mail>;

    /// Delete mail. Deleting unknown mail succeeds.
    fn delete_mail(&self, ctx: &Context, mail_guid: MailGuid) -> DbResult<()>;

    /// Record that mail was opened at `opened_at`, replacing any earlier time.
    fn open_mail(&self, ctx: &Context, mail_guid: MailGuid, opened_at: DateTime<Utc>)
        -> DbResult<()>;

    // ------------------------------------------------------------------
    // Mailboxes
    // ------------------------------------------------------------------

    /// Create a mailbox with an empty resident list.
    fn create_mailbox(&self, ctx: &Context, mailbox: Mailbox) -> DbResult<()>;

    /// Get a mailbox by address.
    fn get_mailbox(&self, ctx: &Context, address: &str) -> DbResult<Mailbox>;

    /// Delete a mailbox. Deleting an unknown address succeeds.
    fn delete_mailbox(&self, ctx: &Context, address: &str) -> DbResult<()>;

    /// Get the mailbox owned by a user.
    fn get_user_mailbox(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Mailbox>;

    /// List mailboxes within `radius_meters` of `location`, nearest first.
    fn get_nearby_mailboxes(
        &self,
        ctx: &Context,
        location: &Coordinate,
        radius_meters: f64,
    ) -> DbResult<Vec<Mailbox>>;

    /// Get the mail resident in a mailbox, in arrival order.
    fn get_mailbox_mail(&self, ctx: &Context, address: &str) -> DbResult<Vec<Mail>>;

    // ------------------------------------------------------------------
    // Exchange
    // ------------------------------------------------------------------

    /// Move mail from a courier's manifest into a mailbox.
    ///
    /// Returns the guids dropped off, in manifest order.
    fn drop_off_mail(
        &self,
        ctx: &Context,
        carrier_guid: UserGuid,
        address: &str,
    ) -> DbResult<Vec<MailGuid>>;

    /// Move mail from a mailbox to a courier (or, for the owner, home).
    ///
    /// Returns the guids picked up, in resident order.
    fn pick_up_mail(
        &self,
        ctx: &Context,
        carrier_guid: UserGuid,
        address: &str,
    ) -> DbResult<Vec<MailGuid>>;

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Count the records held by the datastore.
    fn stats(&self, ctx: &Context) -> DbResult<DatastoreStats>;
}
