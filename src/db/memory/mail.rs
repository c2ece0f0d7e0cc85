//! Mail domain operations.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{read, write, InMemory};
use crate::db::context::Context;
use crate::db::error::{DatastoreError, DbResult, ErrorKind};
use crate::mail::{Mail, MailGuid};

impl InMemory {
    /// Store new mail and put it on the sender's courier manifest.
    ///
    /// The sender's carry capacity is not checked here. Reusing the guid of
    /// deleted mail first clears the references the deleted mail left
    /// behind, so the guid is never listed twice.
    pub fn create_mail(&self, ctx: &Context, mut new_mail: Mail) -> DbResult<()> {
        let (mut mailboxes, mut mail) = self.lock_exchange();

        if mail.by_guid.contains_key(&new_mail.mail_guid) {
            return Err(DatastoreError::new(
                "create-mail-guid-conflict",
                ErrorKind::MailGuidExists,
            ));
        }

        if mail.deleted.remove(&new_mail.mail_guid) {
            warn!(
                request_id = %ctx.request_id(),
                mail_guid = %new_mail.mail_guid,
                "reusing deleted mail guid, clearing stale references"
            );
            mail.forget(new_mail.mail_guid);
            mailboxes.forget(new_mail.mail_guid);
        }
        drop(mailboxes);

        new_mail.carrier = Some(new_mail.from);
        mail.manifests
            .entry(new_mail.from)
            .or_default()
            .push(new_mail.mail_guid);

        debug!(
            request_id = %ctx.request_id(),
            mail_guid = %new_mail.mail_guid,
            from = %new_mail.from,
            to = %new_mail.to,
            "created mail"
        );
        mail.by_guid.insert(new_mail.mail_guid, new_mail);

        Ok(())
    }

    /// Get mail by guid.
    pub fn get_mail(&self, _ctx: &Context, mail_guid: MailGuid) -> DbResult<Mail> {
        read(&self.mail)
            .by_guid
            .get(&mail_guid)
            .cloned()
            .ok_or_else(|| DatastoreError::new("get-mail-not-found", ErrorKind::MailNotFound))
    }

    /// Delete the mail record.
    ///
    /// Manifest and mailbox entries pointing at it stay until the next
    /// exchange touching them purges them, or until the guid is reused.
    pub fn delete_mail(&self, ctx: &Context, mail_guid: MailGuid) -> DbResult<()> {
        let mut mail = write(&self.mail);

        if mail.by_guid.remove(&mail_guid).is_some() {
            mail.deleted.insert(mail_guid);
            debug!(request_id = %ctx.request_id(), %mail_guid, "deleted mail");
        }
        Ok(())
    }

    /// Set the opened timestamp, overwriting any previous one.
    pub fn open_mail(
        &self,
        ctx: &Context,
        mail_guid: MailGuid,
        opened_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut mail = write(&self.mail);

        let opened = mail
            .by_guid
            .get_mut(&mail_guid)
            .ok_or_else(|| DatastoreError::new("open-mail-not-found", ErrorKind::MailNotFound))?;
        opened.opened_on = Some(opened_at);

        debug!(request_id = %ctx.request_id(), %mail_guid, %opened_at, "opened mail");
        Ok(())
    }
}
