//! Best-effort cleanup of gateway-confirmed dead tokens.

use souq_core::RecipientRef;
use souq_registry::RecipientRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::gateway::DeliveryReport;
use crate::resolver::ResolvedTokens;

/// Removes tokens the gateway reported as failed from the registry record
/// that owns them.
///
/// Pruning runs after the message has already been delivered or rejected,
/// so it is strictly best-effort: every failure in here is logged and
/// swallowed, and can never change the dispatch outcome.
pub struct TokenPruner<R> {
    registry: Arc<R>,
}

impl<R> TokenPruner<R>
where
    R: RecipientRegistry,
{
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Prunes the report's failed tokens when every resolved token belongs
    /// to one recipient.
    ///
    /// Multi-recipient dispatches (segment, broadcast, multi-id explicit
    /// resolving across owners) are counted and logged only; see DESIGN.md
    /// for the open cleanup gap.
    pub async fn prune(&self, resolved: &ResolvedTokens, report: &DeliveryReport) {
        let failed = report.failed_tokens();
        if failed.is_empty() {
            return;
        }

        match resolved.sole_owner() {
            Some(owner) => self.prune_owner(owner, &failed).await,
            None => {
                warn!(
                    failed = failed.len(),
                    "dead tokens reported on multi-recipient dispatch; not pruned"
                );
            }
        }
    }

    /// Removes exactly `failed` from the owner's token set, leaving every
    /// other token untouched.
    pub async fn prune_owner(&self, owner: &RecipientRef, failed: &[String]) {
        debug!(owner = %owner, count = failed.len(), "pruning dead device tokens");
        if let Err(e) = self
            .registry
            .remove_tokens(owner.kind, &owner.id, failed)
            .await
        {
            warn!(owner = %owner, error = %e, "token prune failed; registry left as-is");
        }
    }
}
