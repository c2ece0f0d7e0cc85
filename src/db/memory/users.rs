//! User domain operations.

use tracing::{debug, error};

use super::{read, write, InMemory};
use crate::db::context::Context;
use crate::db::error::{DatastoreError, DbResult, ErrorKind};
use crate::mail::Mail;
use crate::user::{User, UserGuid};

impl InMemory {
    /// Register a new user and their credential.
    pub fn create_user(&self, ctx: &Context, user: User, password: &str) -> DbResult<()> {
        // Sealing may hash; keep it outside the lock.
        let credential = self.credential_storage.seal(password).map_err(|e| {
            error!(request_id = %ctx.request_id(), "failed to seal credential: {e}");
            DatastoreError::new("create-user-seal-credential", ErrorKind::Internal)
        })?;

        let mut users = write(&self.users);

        if users.by_guid.contains_key(&user.user_guid) {
            return Err(DatastoreError::new(
                "create-user-guid-conflict",
                ErrorKind::UserGuidExists,
            ));
        }
        if users.guid_by_username.contains_key(&user.username) {
            return Err(DatastoreError::new(
                "create-user-username-conflict",
                ErrorKind::UsernameExists,
            ));
        }

        debug!(
            request_id = %ctx.request_id(),
            user_guid = %user.user_guid,
            username = %user.username,
            "created user"
        );
        users
            .guid_by_username
            .insert(user.username.clone(), user.user_guid);
        users.credentials.insert(user.user_guid, credential);
        users.by_guid.insert(user.user_guid, user);

        Ok(())
    }

    /// Get a user by guid.
    pub fn get_user(&self, _ctx: &Context, user_guid: UserGuid) -> DbResult<User> {
        read(&self.users)
            .by_guid
            .get(&user_guid)
            .cloned()
            .ok_or_else(|| DatastoreError::new("get-user-not-found", ErrorKind::UserNotFound))
    }

    /// Get the mail a user holds at rest.
    ///
    /// Returns an empty list when the user has never retrieved any mail.
    pub fn get_user_mail(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Vec<Mail>> {
        self.get_user(ctx, user_guid)
            .map_err(|e| e.propagate("get-user-mail-user-not-found"))?;

        let mail = read(&self.mail);
        Ok(mail.resolve(mail.at_rest.get(&user_guid)))
    }

    /// Get the mail a user is carrying.
    pub fn get_carried_mail(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<Vec<Mail>> {
        self.get_user(ctx, user_guid)
            .map_err(|e| e.propagate("get-carried-mail-user-not-found"))?;

        let mail = read(&self.mail);
        Ok(mail.resolve(mail.manifests.get(&user_guid)))
    }

    /// Look up a user by username and credential.
    pub fn auth_user(&self, ctx: &Context, username: &str, password: &str) -> DbResult<User> {
        let not_found = || DatastoreError::new("auth-user-not-found", ErrorKind::UserNotFound);

        let (user, credential) = {
            let users = read(&self.users);
            let user_guid = users.guid_by_username.get(username).ok_or_else(not_found)?;
            let user = users.by_guid.get(user_guid).cloned().ok_or_else(not_found)?;
            let credential = users.credentials.get(user_guid).cloned().ok_or_else(not_found)?;
            (user, credential)
        };

        // Verification may hash; the lock is already released.
        if !credential.matches(password) {
            debug!(request_id = %ctx.request_id(), username, "credential mismatch");
            return Err(not_found());
        }

        Ok(user)
    }

    /// Replace a user record.
    ///
    /// A changed username moves the username index entry; the new name must
    /// not belong to another user.
    pub fn update_user(&self, ctx: &Context, user: User) -> DbResult<()> {
        let mut users = write(&self.users);

        let previous_username = match users.by_guid.get(&user.user_guid) {
            Some(existing) => existing.username.clone(),
            None => {
                return Err(DatastoreError::new(
                    "update-user-not-found",
                    ErrorKind::UserNotFound,
                ))
            }
        };

        if previous_username != user.username {
            if let Some(other) = users.guid_by_username.get(&user.username) {
                if *other != user.user_guid {
                    return Err(DatastoreError::new(
                        "update-user-username-conflict",
                        ErrorKind::UsernameExists,
                    ));
                }
            }
            users.guid_by_username.remove(&previous_username);
            users
                .guid_by_username
                .insert(user.username.clone(), user.user_guid);
        }

        debug!(request_id = %ctx.request_id(), user_guid = %user.user_guid, "updated user");
        users.by_guid.insert(user.user_guid, user);

        Ok(())
    }

    /// Delete a user and their username and credential entries.
    ///
    /// Mail and mailboxes referencing the user are left untouched.
    pub fn delete_user(&self, ctx: &Context, user_guid: UserGuid) -> DbResult<()> {
        let mut users = write(&self.users);

        if let Some(deleted) = users.by_guid.remove(&user_guid) {
            if users.guid_by_username.get(&deleted.username) == Some(&user_guid) {
                users.guid_by_username.remove(&deleted.username);
            }
            users.credentials.remove(&user_guid);
            debug!(request_id = %ctx.request_id(), %user_guid, "deleted user");
        }

        Ok(())
    }
}
