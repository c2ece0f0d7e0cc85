//! Drop-off and pick-up: moving mail between couriers and mailboxes.
//!
//! Both operations make a single ordered pass over the source list while
//! holding the mailbox and mail write locks. Once the destination is full
//! every remaining item stays where it was; items are never reordered.

use chrono::Utc;
use tracing::{info, warn};

use super::InMemory;
use crate::db::context::Context;
use crate::db::error::{DatastoreError, DbResult, ErrorKind};
use crate::mail::MailGuid;
use crate::user::UserGuid;

impl InMemory {
    /// Drop off as much of the carrier's manifest as the mailbox accepts.
    ///
    /// Owned mailboxes only take mail addressed to their owner; mail that
    /// reaches its recipient's mailbox for the first time is stamped as
    /// delivered.
    pub fn drop_off_mail(
        &self,
        ctx: &Context,
        carrier_guid: UserGuid,
        address: &str,
    ) -> DbResult<Vec<MailGuid>> {
        self.get_user(ctx, carrier_guid)
            .map_err(|e| e.propagate("drop-off-mail-user-not-found"))?;
        self.get_mailbox(ctx, address)
            .map_err(|e| e.propagate("drop-off-mail-mailbox-not-found"))?;

        let (mut mailboxes, mut mail) = self.lock_exchange();
        let mailboxes = &mut *mailboxes;
        let mail = &mut *mail;

        // The mailbox may have been deleted since the check above.
        let mailbox = mailboxes.by_address.get(address).ok_or_else(|| {
            DatastoreError::new(
                "drop-off-mail-mailbox-deleted",
                ErrorKind::MailboxNotFound,
            )
        })?;
        let resident = mailboxes.resident.entry(address.to_string()).or_default();

        let manifest = mail.manifests.remove(&carrier_guid).unwrap_or_default();
        let mut carried_forward = Vec::with_capacity(manifest.len());
        let mut dropped_off = Vec::with_capacity(manifest.len());
        let now = Utc::now();

        for mail_guid in manifest {
            if mailbox.is_full(resident.len()) {
                carried_forward.push(mail_guid);
                continue;
            }

            let Some(item) = mail.by_guid.get_mut(&mail_guid) else {
                warn!(
                    request_id = %ctx.request_id(),
                    %carrier_guid,
                    %mail_guid,
                    "purging deleted mail from courier manifest"
                );
                continue;
            };

            if !mailbox.accepts_mail_for(item.to) {
                carried_forward.push(mail_guid);
                continue;
            }

            item.carrier = None;
            if mailbox.is_owned_by(item.to) && item.delivered_on.is_none() {
                item.delivered_on = Some(now);
            }
            resident.push(mail_guid);
            dropped_off.push(mail_guid);
        }

        info!(
            request_id = %ctx.request_id(),
            %carrier_guid,
            address,
            dropped_off = dropped_off.len(),
            carried_forward = carried_forward.len(),
            resident = resident.len(),
            "dropped off mail"
        );
        mail.manifests.insert(carrier_guid, carried_forward);

        Ok(dropped_off)
    }

    /// Pick up mail from a mailbox.
    ///
    /// The owner takes everything home, without a capacity limit. Anyone
    /// else picks up in order until their carry capacity is reached.
    pub fn pick_up_mail(
        &self,
        ctx: &Context,
        carrier_guid: UserGuid,
        address: &str,
    ) -> DbResult<Vec<MailGuid>> {
        self.get_mailbox(ctx, address)
            .map_err(|e| e.propagate("pick-up-mail-mailbox-not-found"))?;
        let carrier = self
            .get_user(ctx, carrier_guid)
            .map_err(|e| e.propagate("pick-up-mail-user-not-found"))?;

        let (mut mailboxes, mut mail) = self.lock_exchange();
        let mailboxes = &mut *mailboxes;
        let mail = &mut *mail;

        let mailbox = mailboxes.by_address.get(address).ok_or_else(|| {
            DatastoreError::new("pick-up-mail-mailbox-deleted", ErrorKind::MailboxNotFound)
        })?;
        let resident = mailboxes.resident.remove(address).unwrap_or_default();
        let mut left_behind = Vec::new();
        let mut picked_up = Vec::with_capacity(resident.len());

        if mailbox.is_owned_by(carrier_guid) {
            let at_rest = mail.at_rest.entry(carrier_guid).or_default();
            for mail_guid in resident {
                if !mail.by_guid.contains_key(&mail_guid) {
                    warn!(
                        request_id = %ctx.request_id(),
                        address,
                        %mail_guid,
                        "purging deleted mail from mailbox"
                    );
                    continue;
                }
                at_rest.push(mail_guid);
                picked_up.push(mail_guid);
            }
        } else {
            let manifest = mail.manifests.entry(carrier_guid).or_default();
            for mail_guid in resident {
                if carrier.is_carrying_full_load(manifest.len()) {
                    left_behind.push(mail_guid);
                    continue;
                }

                let Some(item) = mail.by_guid.get_mut(&mail_guid) else {
                    warn!(
                        request_id = %ctx.request_id(),
                        address,
                        %mail_guid,
                        "purging deleted mail from mailbox"
                    );
                    continue;
                };

                item.carrier = Some(carrier_guid);
                manifest.push(mail_guid);
                picked_up.push(mail_guid);
            }
        }

        info!(
            request_id = %ctx.request_id(),
            %carrier_guid,
            address,
            owner = mailbox.is_owned_by(carrier_guid),
            picked_up = picked_up.len(),
            left_behind = left_behind.len(),
            "picked up mail"
        );
        mailboxes.resident.insert(address.to_string(), left_behind);

        Ok(picked_up)
    }
}
