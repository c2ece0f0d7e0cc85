//! User module for Snail Mail.

mod types;

pub use types::{User, UserGuid};
