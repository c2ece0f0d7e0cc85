//! Mailbox module for Snail Mail.

mod types;

pub use types::Mailbox;
