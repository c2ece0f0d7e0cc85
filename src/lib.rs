//! Snail Mail - a datastore for a physical mail-delivery network.
//!
//! Users write mail, carry it as couriers and drop it into mailboxes, where
//! the owner or another courier picks it up again.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod logging;
pub mod mail;
pub mod mailbox;
pub mod user;

pub use auth::{CredentialStorage, PasswordError};
pub use config::Config;
pub use db::{Context, Datastore, DatastoreError, DatastoreStats, DbResult, ErrorKind, InMemory};
pub use error::{Result, SnailmailError};
pub use geo::Coordinate;
pub use mail::{Mail, MailGuid};
pub use mailbox::Mailbox;
pub use user::{User, UserGuid};
