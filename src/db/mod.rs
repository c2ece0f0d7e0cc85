//! Datastore module for Snail Mail.
//!
//! This module defines the [`Datastore`] contract and its volatile
//! in-memory implementation, [`InMemory`].

mod context;
mod error;
mod memory;
mod traits;

pub use context::Context;
pub use error::{DatastoreError, DbResult, ErrorKind};
pub use memory::InMemory;
pub use traits::{Datastore, DatastoreStats};
