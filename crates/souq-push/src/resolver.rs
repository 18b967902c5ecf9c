//! Token resolution: from a target specification to a deduplicated token
//! set ready for dispatch.

use futures_util::future::try_join_all;
use souq_core::{Recipient, RecipientKind, RecipientRef};
use souq_registry::{RecipientRegistry, RegistryError};
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::PushError;
use crate::segment::Segment;

/// Who a message is addressed to.
#[derive(Debug, Clone)]
pub enum Target {
    /// A fixed list of registry-tagged recipient references.
    Explicit(Vec<RecipientRef>),
    /// Every customer matching a named segment.
    Segment(Segment),
    /// Every customer and every staff member. System-wide broadcast.
    Everyone,
}

/// One deduplicated device token together with the recipient it was
/// collected from. Ownership survives the flattening step so the pruner
/// can scope cleanup without a second registry scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub owner: RecipientRef,
}

/// The resolver's output: tokens deduplicated by raw string value.
///
/// Internal order is incidental; nothing downstream may correlate it with
/// input id order. The only ordering that matters is fixed later, by the
/// dispatcher, at the gateway call boundary.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTokens {
    tokens: Vec<ResolvedToken>,
}

impl ResolvedTokens {
    /// Flattens recipients' token sets and deduplicates on the raw token
    /// string. When two recipients hold the same token, the first owner
    /// seen wins.
    pub fn collect<I>(recipients: I) -> Self
    where
        I: IntoIterator<Item = Recipient>,
    {
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for recipient in recipients {
            let owner = recipient.reference();
            for token in recipient.device_tokens {
                if seen.insert(token.clone()) {
                    tokens.push(ResolvedToken {
                        token,
                        owner: owner.clone(),
                    });
                }
            }
        }
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedToken> {
        self.tokens.iter()
    }

    /// The single recipient owning every resolved token, if there is one.
    /// `None` for an empty set or when ownership is split.
    pub fn sole_owner(&self) -> Option<&RecipientRef> {
        let first = &self.tokens.first()?.owner;
        self.tokens
            .iter()
            .all(|t| t.owner == *first)
            .then_some(first)
    }

    /// Bare token strings in the set's current internal order.
    ///
    /// Only the dispatcher should call this, exactly once per dispatch:
    /// the list it produces is the order the gateway's report will be
    /// aligned against.
    pub fn token_list(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.token.clone()).collect()
    }
}

/// Turns a target specification into a deduplicated token set, reading
/// from both recipient registries.
pub struct TokenResolver<R> {
    registry: Arc<R>,
}

impl<R> TokenResolver<R>
where
    R: RecipientRegistry,
{
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Resolves a target to its token set.
    ///
    /// Zero tokens resolves to `PushError::EmptyTarget` — a normal
    /// terminal state ("no devices registered"), after which the gateway
    /// must never be invoked.
    pub async fn resolve(&self, target: &Target) -> Result<ResolvedTokens, PushError> {
        let recipients = match target {
            Target::Explicit(refs) => self.lookup_refs(refs).await?,
            Target::Segment(segment) => {
                let now = OffsetDateTime::now_utc();
                self.registry
                    .scan_recipients(RecipientKind::Customer)
                    .await?
                    .into_iter()
                    .filter(|customer| segment.matches(customer, now))
                    .collect()
            }
            Target::Everyone => {
                let mut all = self.registry.scan_recipients(RecipientKind::Customer).await?;
                all.extend(self.registry.scan_recipients(RecipientKind::Staff).await?);
                all
            }
        };

        let resolved = ResolvedTokens::collect(recipients);
        debug!(tokens = resolved.len(), "target resolved");
        if resolved.is_empty() {
            return Err(PushError::EmptyTarget);
        }
        Ok(resolved)
    }

    /// Untagged-id compatibility shim.
    ///
    /// Facade callers hold bare ids whose registry is unknown, so each id
    /// is tried in the customer registry first, then staff. A miss in both
    /// contributes zero tokens and is not an error.
    pub async fn resolve_ids(&self, ids: &[String]) -> Result<ResolvedTokens, PushError> {
        let lookups = ids.iter().map(|id| self.lookup_either(id));
        let found: Vec<Option<Recipient>> = try_join_all(lookups).await?;

        let resolved = ResolvedTokens::collect(found.into_iter().flatten());
        if resolved.is_empty() {
            return Err(PushError::EmptyTarget);
        }
        Ok(resolved)
    }

    /// Tagged lookups, issued concurrently so latency is bounded by the
    /// slowest single read. Misses contribute zero tokens.
    async fn lookup_refs(&self, refs: &[RecipientRef]) -> Result<Vec<Recipient>, PushError> {
        let lookups = refs
            .iter()
            .map(|r| self.registry.get_recipient(r.kind, &r.id));
        let found = try_join_all(lookups).await?;
        Ok(found.into_iter().flatten().collect())
    }

    async fn lookup_either(&self, id: &str) -> Result<Option<Recipient>, RegistryError> {
        if let Some(customer) = self
            .registry
            .get_recipient(RecipientKind::Customer, id)
            .await?
        {
            return Ok(Some(customer));
        }
        self.registry.get_recipient(RecipientKind::Staff, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souq_registry_memory::InMemoryRegistry;
    use std::collections::HashSet;

    fn seeded_registry() -> Arc<InMemoryRegistry> {
        let registry = InMemoryRegistry::new();
        registry.insert(Recipient::customer("c1").with_tokens(["tA", "tB"]));
        registry.insert(Recipient::customer("c2").with_tokens(["tB", "tC"]));
        registry.insert(Recipient::staff("s1").with_tokens(["tS"]));
        Arc::new(registry)
    }

    fn token_set(resolved: &ResolvedTokens) -> HashSet<String> {
        resolved.iter().map(|t| t.token.clone()).collect()
    }

    #[tokio::test]
    async fn shared_token_appears_exactly_once() {
        let resolver = TokenResolver::new(seeded_registry());
        let resolved = resolver
            .resolve(&Target::Explicit(vec![
                RecipientRef::customer("c1"),
                RecipientRef::customer("c2"),
            ]))
            .await
            .unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(
            token_set(&resolved),
            ["tA", "tB", "tC"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[tokio::test]
    async fn miss_in_both_registries_contributes_zero_tokens() {
        let resolver = TokenResolver::new(seeded_registry());
        let resolved = resolver
            .resolve_ids(&["c1".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(token_set(&resolved), ["tA", "tB"].iter().map(|s| s.to_string()).collect());
    }

    #[tokio::test]
    async fn untagged_id_falls_back_to_staff_registry() {
        let resolver = TokenResolver::new(seeded_registry());
        let resolved = resolver.resolve_ids(&["s1".to_string()]).await.unwrap();
        assert_eq!(token_set(&resolved), ["tS"].iter().map(|s| s.to_string()).collect());
        assert_eq!(resolved.sole_owner(), Some(&RecipientRef::staff("s1")));
    }

    #[tokio::test]
    async fn empty_target_is_a_terminal_state() {
        let registry = Arc::new(InMemoryRegistry::new());
        let resolver = TokenResolver::new(registry.clone());

        let outcome = resolver.resolve(&Target::Everyone).await;
        assert!(matches!(outcome, Err(PushError::EmptyTarget)));

        // A recipient with no tokens resolves the same way.
        registry.insert(Recipient::customer("c1"));
        let outcome = resolver.resolve_ids(&["c1".to_string()]).await;
        assert!(matches!(outcome, Err(PushError::EmptyTarget)));
    }

    #[tokio::test]
    async fn everyone_spans_both_registries() {
        let resolver = TokenResolver::new(seeded_registry());
        let resolved = resolver.resolve(&Target::Everyone).await.unwrap();
        assert_eq!(resolved.len(), 4); // tA tB tC tS, tB deduplicated
        assert!(resolved.sole_owner().is_none());
    }

    #[tokio::test]
    async fn segment_target_classifies_customers_only() {
        let registry = seeded_registry();
        let resolver = TokenResolver::new(registry);
        // No seeded customer has orders or activity, so everyone is dormant.
        let resolved = resolver
            .resolve(&Target::Segment(Segment::Dormant))
            .await
            .unwrap();
        let tokens = token_set(&resolved);
        assert!(tokens.contains("tA"));
        assert!(!tokens.contains("tS"));

        let none = resolver.resolve(&Target::Segment(Segment::Vip)).await;
        assert!(matches!(none, Err(PushError::EmptyTarget)));
    }

    #[tokio::test]
    async fn resolution_is_idempotent_against_unchanged_state() {
        let resolver = TokenResolver::new(seeded_registry());
        let first = resolver.resolve(&Target::Everyone).await.unwrap();
        let second = resolver.resolve(&Target::Everyone).await.unwrap();
        assert_eq!(token_set(&first), token_set(&second));
    }

    #[test]
    fn sole_owner_requires_unanimous_ownership() {
        let one = ResolvedTokens::collect(vec![
            Recipient::customer("c1").with_tokens(["tA", "tB"]),
        ]);
        assert_eq!(one.sole_owner(), Some(&RecipientRef::customer("c1")));

        let split = ResolvedTokens::collect(vec![
            Recipient::customer("c1").with_tokens(["tA"]),
            Recipient::customer("c2").with_tokens(["tB"]),
        ]);
        assert!(split.sole_owner().is_none());

        assert!(ResolvedTokens::default().sole_owner().is_none());
    }
}
