//! Volatile in-memory datastore.
//!
//! State is split into three domains, each behind its own `RwLock`:
//!
//! | Domain    | Primary map              | Indices                                            |
//! |-----------|--------------------------|----------------------------------------------------|
//! | users     | guid -> user             | username -> guid, guid -> credential               |
//! | mail      | guid -> mail             | courier -> manifest, user -> at-rest mail          |
//! | mailboxes | address -> mailbox       | owner -> address, address -> resident mail         |
//!
//! A domain's indices are only touched while holding that domain's write
//! lock, so readers never see a primary map and its indices disagree.
//!
//! Lock order is mailboxes, then mail, then users. The users lock is only
//! ever taken on its own or as the innermost lock.

mod exchange;
mod mail;
mod mailboxes;
mod users;

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::context::Context;
use super::error::DbResult;
use super::traits::{Datastore, DatastoreStats};
use crate::auth::{CredentialStorage, StoredCredential};
use crate::config::DatastoreConfig;
use crate::geo::Coordinate;
use crate::mail::{Mail, MailGuid};
use crate::mailbox::Mailbox;
use crate::user::{User, UserGuid};

/// User domain.
#[derive(Debug, Default)]
struct UserTables {
    by_guid: HashMap<UserGuid, User>,
    guid_by_username: HashMap<String, UserGuid>,
    credentials: HashMap<UserGuid, StoredCredential>,
}

/// Mail domain.
#[derive(Debug, Default)]
struct MailTables {
    by_guid: HashMap<MailGuid, Mail>,
    /// Courier manifests, in pick-up order.
    manifests: HashMap<UserGuid, Vec<MailGuid>>,
    /// Mail retrieved by owners from their own mailbox.
    at_rest: HashMap<UserGuid, Vec<MailGuid>>,
    /// Deleted guids that manifests, at-rest lists or mailboxes may still
    /// reference.
    deleted: HashSet<MailGuid>,
}

impl MailTables {
    /// Resolve guids to mail values, skipping guids whose mail was deleted.
    fn resolve(&self, guids: Option<&Vec<MailGuid>>) -> Vec<Mail> {
        guids
            .map(|guids| {
                guids
                    .iter()
                    .filter_map(|guid| self.by_guid.get(guid).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every manifest and at-rest reference to `mail_guid`.
    fn forget(&mut self, mail_guid: MailGuid) {
        for guids in self.manifests.values_mut().chain(self.at_rest.values_mut()) {
            guids.retain(|guid| *guid != mail_guid);
        }
    }
}

/// Mailbox domain.
#[derive(Debug, Default)]
struct MailboxTables {
    by_address: HashMap<String, Mailbox>,
    address_by_owner: HashMap<UserGuid, String>,
    /// Resident mail, in drop-off order.
    resident: HashMap<String, Vec<MailGuid>>,
}

impl MailboxTables {
    /// Drop every resident reference to `mail_guid`.
    fn forget(&mut self, mail_guid: MailGuid) {
        for guids in self.resident.values_mut() {
            guids.retain(|guid| *guid != mail_guid);
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory datastore.
///
/// Share it between request handlers with `Arc<InMemory>` (or
/// `Arc<dyn Datastore>`); all methods take `&self`.
#[derive(Debug, Default)]
pub struct InMemory {
    users: RwLock<UserTables>,
    mail: RwLock<MailTables>,
    mailboxes: RwLock<MailboxTables>,
    credential_storage: CredentialStorage,
}

impl InMemory {
    /// Create an empty datastore storing plaintext credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty datastore with the given credential storage.
    pub fn with_credential_storage(credential_storage: CredentialStorage) -> Self {
        Self {
            credential_storage,
            ..Self::default()
        }
    }

    /// Create an empty datastore from configuration.
    pub fn from_config(config: &DatastoreConfig) -> Self {
        debug!(
            credential_storage = %config.credential_storage,
            "creating in-memory datastore"
        );
        Self::with_credential_storage(config.credential_storage)
    }

    /// The credential storage policy in use.
    pub fn credential_storage(&self) -> CredentialStorage {
        self.credential_storage
    }

    /// Count records in each domain.
    pub fn stats(&self, _ctx: &Context) -> DbResult<DatastoreStats> {
        let mailboxes = read(&self.mailboxes).by_address.len();
        let mail = read(&self.mail).by_guid.len();
        let users = read(&self.users).by_guid.len();

        Ok(DatastoreStats {
            users,
            mail,
            mailboxes,
        })
    }

    /// Acquire both exchange locks in the global order.
    fn lock_exchange(
        &self,
    ) -> (
        RwLockWriteGuard<'_, MailboxTables>,
        RwLockWriteGuard<'_, MailTables>,
    ) {
        let mailboxes = write(&self.mailboxes);
        let mail = write(&self.mail);
        (mailboxes, mail)
    }
}

impl Datastore for InMemory {
    fn create_user(&self, ctx: &Context, user: User, password: &str) -> DbResult<()> {
        InMemory::create_user(self, ctx, user, password)
    }

    fn get_user(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<User> {
        InMemory::get_user(self, ctx, user_guid)
    }

    fn get_user_mail(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Vec<Mail>> {
        InMemory::get_user_mail(self, ctx, user_guid)
    }

    fn get_carried_mail(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Vec<Mail>> {
        InMemory::get_carried_mail(self, ctx, user_guid)
    }

    fn auth_user(&self, ctx: &Context, username: &str, password: &str) -> DbResult<User> {
        InMemory::auth_user(self, ctx, username, password)
    }

    fn update_user(&self, ctx: &Context, user: User) -> DbResult<()> {
        InMemory::update_user(self, ctx, user)
    }

    fn delete_user(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<()> {
        InMemory::delete_user(self, ctx, user_guid)
    }

    fn create_mail(&self, ctx: &Context, mail: Mail) -> DbResult<()> {
        InMemory::create_mail(self, ctx, mail)
    }

    fn get_mail(&self, ctx: &Context, mail_guid: MailGuid) -> DbResult<Mail> {
        InMemory::get_mail(self, ctx, mail_guid)
    }

    fn delete_mail(&self, ctx: &Context, mail_guid: MailGuid) -> DbResult<()> {
        InMemory::delete_mail(self, ctx, mail_guid)
    }

    fn open_mail(
        &self,
        ctx: &Context,
        mail_guid: MailGuid,
        opened_at: DateTime<Utc>,
    ) -> DbResult<()> {
        InMemory::open_mail(self, ctx, mail_guid, opened_at)
    }

    fn create_mailbox(&self, ctx: &Context, mailbox: Mailbox) -> DbResult<()> {
        InMemory::create_mailbox(self, ctx, mailbox)
    }

    fn get_mailbox(&self, ctx: &Context, address: &str) -> DbResult<Mailbox> {
        InMemory::get_mailbox(self, ctx, address)
    }

    fn delete_mailbox(&self, ctx: &Context, address: &str) -> DbResult<()> {
        InMemory::delete_mailbox(self, ctx, address)
    }

    fn get_user_mailbox(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Mailbox> {
        InMemory::get_user_mailbox(self, ctx, user_guid)
    }

    fn get_nearby_mailboxes(
        &self,
        ctx: &Context,
        location: &Coordinate,
        radius_meters: f64,
    ) -> DbResult<Vec<Mailbox>> {
        Ok(InMemory::get_nearby_mailboxes(
            self,
            ctx,
            location,
            radius_meters,
        ))
    }

    fn get_mailbox_mail(&self, ctx: &Context, address: &str) -> DbResult<Vec<Mail>> {
        InMemory::get_mailbox_mail(self, ctx, address)
    }

    fn drop_off_mail(
        &self,
        ctx: &Context,
        carrier_guid: UserGuid,
        address: &str,
    ) -> DbResult<Vec<MailGuid>> {
        InMemory::drop_off_mail(self, ctx, carrier_guid, address)
    }

    fn pick_up_mail(
        &self,
        ctx: &Context,
        carrier_guid: UserGuid,
        address: &str,
    ) -> DbResult<Vec<MailGuid>> {
        InMemory::pick_up_mail(self, ctx, carrier_guid, address)
    }

    fn stats(&self, ctx: &Context) -> DbResult<DatastoreStats> {
        InMemory::stats(self, ctx)
    }
}
