//! Public facade over the push subsystem.
//!
//! Application code and admin actions call in here. Errors never cross
//! this boundary as `Err`: every path flattens into a structured outcome
//! whose `error` string is rendered to operators as-is.

use serde::{Deserialize, Serialize};
use souq_core::{Message, RecipientKind};
use souq_registry::RecipientRegistry;
use std::sync::Arc;
use tracing::warn;

use crate::dispatcher::Dispatcher;
use crate::gateway::PushGateway;
use crate::pruner::TokenPruner;
use crate::resolver::{ResolvedTokens, Target, TokenResolver};
use crate::segment::Segment;

/// Outcome of one send call.
///
/// Partial delivery reports `success: true`; callers distinguish "fully
/// delivered" from "partially delivered" by comparing `sent_count` to the
/// token count they expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    pub sent_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sent_count: 0,
            error: Some(error.into()),
        }
    }
}

/// Diagnostic token count across both registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCount {
    pub success: bool,
    pub count: usize,
}

/// Composition of the four components: resolve, dispatch, prune.
pub struct PushService<R, G> {
    registry: Arc<R>,
    resolver: TokenResolver<R>,
    dispatcher: Dispatcher<G>,
    pruner: TokenPruner<R>,
}

impl<R, G> PushService<R, G>
where
    R: RecipientRegistry,
    G: PushGateway,
{
    pub fn new(registry: Arc<R>, gateway: Arc<G>) -> Self {
        Self {
            resolver: TokenResolver::new(registry.clone()),
            dispatcher: Dispatcher::new(gateway),
            pruner: TokenPruner::new(registry.clone()),
            registry,
        }
    }

    /// Sends to a single recipient, looked up untagged in the customer
    /// registry first, then staff.
    pub async fn send_to_one(
        &self,
        recipient_id: &str,
        title: &str,
        body: &str,
        link: Option<&str>,
    ) -> SendOutcome {
        self.send_to_many(&[recipient_id.to_string()], title, body, link)
            .await
    }

    /// Sends to a fixed list of untagged recipient ids. Ids present in
    /// neither registry contribute zero tokens.
    pub async fn send_to_many(
        &self,
        recipient_ids: &[String],
        title: &str,
        body: &str,
        link: Option<&str>,
    ) -> SendOutcome {
        let message = build_message(title, body, link);
        match self.resolver.resolve_ids(recipient_ids).await {
            Ok(resolved) => self.deliver(&resolved, &message).await,
            Err(e) => SendOutcome::failed(e.to_string()),
        }
    }

    /// Sends to every customer in the named segment.
    pub async fn send_to_segment(
        &self,
        segment_name: &str,
        title: &str,
        body: &str,
        link: Option<&str>,
    ) -> SendOutcome {
        let segment: Segment = match segment_name.parse() {
            Ok(segment) => segment,
            Err(e) => return SendOutcome::failed(e.to_string()),
        };
        let message = build_message(title, body, link);
        match self.resolver.resolve(&Target::Segment(segment)).await {
            Ok(resolved) => self.deliver(&resolved, &message).await,
            Err(e) => SendOutcome::failed(e.to_string()),
        }
    }

    /// System-wide broadcast: every customer and staff token.
    pub async fn broadcast_to_all(
        &self,
        title: &str,
        body: &str,
        link: Option<&str>,
    ) -> SendOutcome {
        let message = build_message(title, body, link);
        match self.resolver.resolve(&Target::Everyone).await {
            Ok(resolved) => self.deliver(&resolved, &message).await,
            Err(e) => SendOutcome::failed(e.to_string()),
        }
    }

    /// Sends to an explicit, registry-tagged target. Preferred entry point
    /// when the caller knows which registry each id belongs to.
    pub async fn send_to_target(&self, target: &Target, message: &Message) -> SendOutcome {
        match self.resolver.resolve(target).await {
            Ok(resolved) => self.deliver(&resolved, message).await,
            Err(e) => SendOutcome::failed(e.to_string()),
        }
    }

    /// Total registered tokens across both registries.
    ///
    /// Deliberately NOT deduplicated, unlike the delivery path: this is a
    /// raw registry-side figure for diagnostics.
    pub async fn count_registered_tokens(&self) -> TokenCount {
        let mut count = 0;
        for kind in [RecipientKind::Customer, RecipientKind::Staff] {
            match self.registry.scan_recipients(kind).await {
                Ok(recipients) => {
                    count += recipients
                        .iter()
                        .map(|r| r.device_tokens.len())
                        .sum::<usize>();
                }
                Err(e) => {
                    warn!(registry = %kind, error = %e, "token count scan failed");
                    return TokenCount {
                        success: false,
                        count: 0,
                    };
                }
            }
        }
        TokenCount {
            success: true,
            count,
        }
    }

    async fn deliver(&self, resolved: &ResolvedTokens, message: &Message) -> SendOutcome {
        let outcome = self.dispatcher.dispatch(resolved, message).await;

        // Cleanup is not gated on overall success: a rejected multicast
        // still names which tokens are dead. Only a missing report (the
        // transport-failure case) skips pruning.
        if let Some(report) = &outcome.report {
            self.pruner.prune(resolved, report).await;
        }

        SendOutcome {
            success: outcome.success,
            sent_count: outcome.sent_count,
            error: outcome.error,
        }
    }
}

fn build_message(title: &str, body: &str, link: Option<&str>) -> Message {
    let message = Message::new(title, body);
    match link {
        Some(link) => message.with_link(link),
        None => message,
    }
}
