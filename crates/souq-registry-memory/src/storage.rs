use async_trait::async_trait;
use dashmap::DashMap;
use souq_core::{Recipient, RecipientKind, RecipientRef};
use souq_registry::{RecipientRegistry, RegistryError};

pub type StorageKey = String; // Format: "kind/id"

pub(crate) fn make_storage_key(kind: RecipientKind, id: &str) -> StorageKey {
    format!("{kind}/{id}")
}

/// In-memory recipient registry backend.
///
/// Both logical registries (customer and staff) live in one concurrent map
/// keyed by `kind/id`. `remove_tokens` mutates the record under its entry
/// guard, so a concurrent token registration on the same record is never
/// overwritten by a prune.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    records: DashMap<StorageKey, Recipient>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Inserts or replaces a recipient record. Seeding helper for tests
    /// and dev wiring; production registries are owned elsewhere.
    pub fn insert(&self, recipient: Recipient) {
        let key = make_storage_key(recipient.kind, &recipient.id);
        self.records.insert(key, recipient);
    }

    /// Registers one device token on an existing record.
    pub fn add_token(
        &self,
        kind: RecipientKind,
        id: &str,
        token: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let key = make_storage_key(kind, id);
        let mut entry = self
            .records
            .get_mut(&key)
            .ok_or_else(|| RegistryError::not_found(RecipientRef::new(kind, id)))?;
        entry.device_tokens.insert(token.into());
        Ok(())
    }

    pub fn remove(&self, kind: RecipientKind, id: &str) {
        self.records.remove(&make_storage_key(kind, id));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecipientRegistry for InMemoryRegistry {
    async fn get_recipient(
        &self,
        kind: RecipientKind,
        id: &str,
    ) -> Result<Option<Recipient>, RegistryError> {
        let key = make_storage_key(kind, id);
        Ok(self.records.get(&key).map(|entry| entry.clone()))
    }

    async fn scan_recipients(
        &self,
        kind: RecipientKind,
    ) -> Result<Vec<Recipient>, RegistryError> {
        let prefix = format!("{kind}/");
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn remove_tokens(
        &self,
        kind: RecipientKind,
        id: &str,
        tokens: &[String],
    ) -> Result<(), RegistryError> {
        let key = make_storage_key(kind, id);
        let mut entry = self
            .records
            .get_mut(&key)
            .ok_or_else(|| RegistryError::not_found(RecipientRef::new(kind, id)))?;
        for token in tokens {
            entry.device_tokens.remove(token);
        }
        Ok(())
    }
}
