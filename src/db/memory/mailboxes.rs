//! Mailbox domain operations.

use std::cmp::Ordering;

use tracing::debug;

use super::{read, write, InMemory};
use crate::db::context::Context;
use crate::db::error::{DatastoreError, DbResult, ErrorKind};
use crate::geo::Coordinate;
use crate::mail::Mail;
use crate::mailbox::Mailbox;
use crate::user::UserGuid;

impl InMemory {
    /// Create a mailbox with an empty resident list.
    pub fn create_mailbox(&self, ctx: &Context, mailbox: Mailbox) -> DbResult<()> {
        let mut mailboxes = write(&self.mailboxes);

        if mailboxes.by_address.contains_key(&mailbox.address) {
            return Err(DatastoreError::new(
                "create-mailbox-address-conflict",
                ErrorKind::MailboxAddressExists,
            ));
        }

        if let Some(owner) = mailbox.owner {
            if mailboxes.address_by_owner.contains_key(&owner) {
                return Err(DatastoreError::new(
                    "create-mailbox-user-mailbox-conflict",
                    ErrorKind::UserMailboxExists,
                ));
            }
            // Users is the innermost lock.
            if !read(&self.users).by_guid.contains_key(&owner) {
                return Err(DatastoreError::new(
                    "create-mailbox-owner-not-found",
                    ErrorKind::UserNotFound,
                ));
            }
            mailboxes
                .address_by_owner
                .insert(owner, mailbox.address.clone());
        }

        debug!(
            request_id = %ctx.request_id(),
            address = %mailbox.address,
            capacity = mailbox.capacity,
            public = mailbox.is_public(),
            "created mailbox"
        );
        mailboxes
            .resident
            .insert(mailbox.address.clone(), Vec::new());
        mailboxes.by_address.insert(mailbox.address.clone(), mailbox);

        Ok(())
    }

    /// Get a mailbox by address.
    pub fn get_mailbox(&self, _ctx: &Context, address: &str) -> DbResult<Mailbox> {
        read(&self.mailboxes)
            .by_address
            .get(address)
            .cloned()
            .ok_or_else(|| DatastoreError::new("get-mailbox-not-found", ErrorKind::MailboxNotFound))
    }

    /// Delete a mailbox with its owner entry and resident list.
    ///
    /// Resident mail records are kept.
    pub fn delete_mailbox(&self, ctx: &Context, address: &str) -> DbResult<()> {
        let mut mailboxes = write(&self.mailboxes);

        if let Some(deleted) = mailboxes.by_address.remove(address) {
            if let Some(owner) = deleted.owner {
                if mailboxes.address_by_owner.get(&owner).map(String::as_str) == Some(address) {
                    mailboxes.address_by_owner.remove(&owner);
                }
            }
            mailboxes.resident.remove(address);
            debug!(request_id = %ctx.request_id(), address, "deleted mailbox");
        }

        Ok(())
    }

    /// Get the mailbox owned by a user.
    pub fn get_user_mailbox(&self, _ctx: &Context, user_guid: UserGuid) -> DbResult<Mailbox> {
        let mailboxes = read(&self.mailboxes);

        let address = mailboxes.address_by_owner.get(&user_guid).ok_or_else(|| {
            DatastoreError::new(
                "get-user-mailbox-user-mailbox-not-found",
                ErrorKind::MailboxNotFound,
            )
        })?;

        mailboxes.by_address.get(address).cloned().ok_or_else(|| {
            DatastoreError::new(
                "get-user-mailbox-address-not-found",
                ErrorKind::MailboxNotFound,
            )
        })
    }

    /// List mailboxes within `radius_meters` of `location`.
    ///
    /// Scans every mailbox. Results are ordered by great-circle distance,
    /// ties broken by address.
    pub fn get_nearby_mailboxes(
        &self,
        ctx: &Context,
        location: &Coordinate,
        radius_meters: f64,
    ) -> Vec<Mailbox> {
        let mut nearby: Vec<(f64, Mailbox)> = read(&self.mailboxes)
            .by_address
            .values()
            .filter(|mailbox| mailbox.is_nearby(location, radius_meters))
            .map(|mailbox| (mailbox.location.distance_meters(location), mailbox.clone()))
            .collect();

        nearby.sort_by(|(a_distance, a), (b_distance, b)| {
            a_distance
                .partial_cmp(b_distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.address.cmp(&b.address))
        });

        debug!(
            request_id = %ctx.request_id(),
            latitude = location.latitude,
            longitude = location.longitude,
            radius_meters,
            found = nearby.len(),
            "searched nearby mailboxes"
        );
        nearby.into_iter().map(|(_, mailbox)| mailbox).collect()
    }

    /// Get the mail resident in a mailbox.
    pub fn get_mailbox_mail(&self, _ctx: &Context, address: &str) -> DbResult<Vec<Mail>> {
        let mailboxes = read(&self.mailboxes);

        if !mailboxes.by_address.contains_key(address) {
            return Err(DatastoreError::new(
                "get-mailbox-mail-not-found",
                ErrorKind::MailboxNotFound,
            ));
        }

        let mail = read(&self.mail);
        Ok(mail.resolve(mailboxes.resident.get(address)))
    }
}
