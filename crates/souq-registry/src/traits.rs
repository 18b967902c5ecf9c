//! Registry port traits for the push subsystem.
//!
//! The customer and staff registries are external, shared stores mutated by
//! many unrelated parts of the application. This subsystem only needs three
//! narrow operations, so that is all the port exposes; the full store
//! schema never leaks in here.

use async_trait::async_trait;
use souq_core::{Recipient, RecipientKind};

use crate::error::RegistryError;

/// Read/write port over the two recipient registries.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RecipientRegistry: Send + Sync {
    /// Looks up one recipient in the given registry.
    ///
    /// Returns `None` when the id is absent. A miss is not an error;
    /// errors are reserved for infrastructure failures.
    async fn get_recipient(
        &self,
        kind: RecipientKind,
        id: &str,
    ) -> Result<Option<Recipient>, RegistryError>;

    /// Scans a full registry as one batched read.
    ///
    /// Used for segment and broadcast resolution, which are necessarily
    /// O(all recipients); implementations should not degrade this into
    /// per-record reads.
    async fn scan_recipients(
        &self,
        kind: RecipientKind,
    ) -> Result<Vec<Recipient>, RegistryError>;

    /// Atomically removes the given tokens from one recipient's token set.
    ///
    /// This must be a set-difference mutation on the stored record, not a
    /// read-modify-write of the whole token list: a device re-registering
    /// its token concurrently with a prune must not be lost.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` if the owning record is absent
    /// (e.g. deleted concurrently).
    async fn remove_tokens(
        &self,
        kind: RecipientKind,
        id: &str,
        tokens: &[String],
    ) -> Result<(), RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that RecipientRegistry is object-safe
    fn _assert_registry_object_safe(_: &dyn RecipientRegistry) {}
}
