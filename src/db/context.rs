//! Per-call context.

use uuid::Uuid;

/// Call-scoped context passed to every datastore operation.
///
/// Carries the request identifier that ties datastore log events to the
/// request that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    request_id: Uuid,
}

impl Context {
    /// Create a context with a fresh request identifier.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
        }
    }

    /// Create a context for an existing request identifier.
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    /// The request identifier.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
