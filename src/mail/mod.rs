//! Mail module for Snail Mail.
//!
//! Mail moves between couriers and mailboxes; its position is tracked by
//! the datastore, not by the mail value itself (apart from `carrier`).

mod types;

pub use types::{Mail, MailGuid};
