//! Datastore failures.

use thiserror::Error;

/// What went wrong, independent of where it was detected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No matching user (or the credential did not match).
    #[error("user not found")]
    UserNotFound,

    /// A user with this guid already exists.
    #[error("user guid already exists")]
    UserGuidExists,

    /// The username is taken.
    #[error("username already exists")]
    UsernameExists,

    /// No mail with this guid.
    #[error("mail not found")]
    MailNotFound,

    /// Mail with this guid already exists.
    #[error("mail guid already exists")]
    MailGuidExists,

    /// No mailbox at this address (or the user owns none).
    #[error("mailbox not found")]
    MailboxNotFound,

    /// A mailbox already stands at this address.
    #[error("mailbox address already exists")]
    MailboxAddressExists,

    /// The owner already owns a mailbox.
    #[error("user already owns a mailbox")]
    UserMailboxExists,

    /// Unexpected backend failure.
    #[error("internal datastore failure")]
    Internal,
}

impl ErrorKind {
    /// Check if this kind reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorKind::UserNotFound | ErrorKind::MailNotFound | ErrorKind::MailboxNotFound
        )
    }

    /// Check if this kind reports an identity or ownership conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorKind::UserGuidExists
                | ErrorKind::UsernameExists
                | ErrorKind::MailGuidExists
                | ErrorKind::MailboxAddressExists
                | ErrorKind::UserMailboxExists
        )
    }
}

/// A failed datastore call.
///
/// `code` names the call site that produced the failure; `kind` is what
/// callers branch on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {kind}")]
pub struct DatastoreError {
    code: &'static str,
    #[source]
    kind: ErrorKind,
}

impl DatastoreError {
    /// Create a new error tagged with a call-site code.
    pub fn new(code: &'static str, kind: ErrorKind) -> Self {
        Self { code, kind }
    }

    /// Re-tag the error with an outer call-site code, keeping its kind.
    pub fn propagate(self, code: &'static str) -> Self {
        Self { code, ..self }
    }

    /// The call-site diagnostic code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The underlying error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Check if the error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Check if the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        self.kind.is_not_found()
    }

    /// Check if the error reports a conflict.
    pub fn is_conflict(&self) -> bool {
        self.kind.is_conflict()
    }
}

/// Result type alias for datastore operations.
pub type DbResult<T> = std::result::Result<T, DatastoreError>;
