//! Multicast dispatch and report interpretation.

use souq_core::Message;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::PushError;
use crate::gateway::{DeliveryReport, PushGateway, PushPayload};
use crate::resolver::ResolvedTokens;

/// Aggregate result of one dispatch call.
///
/// `report` is present whenever the gateway returned one, including the
/// rejected-by-all case: cleanup is not gated on overall success. It is
/// absent only on transport failure, where nothing may be pruned.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub success: bool,
    pub sent_count: u32,
    pub report: Option<DeliveryReport>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    fn failed(error: impl Into<String>, report: Option<DeliveryReport>) -> Self {
        Self {
            success: false,
            sent_count: 0,
            report,
            error: Some(error.into()),
        }
    }
}

/// Submits one message to a resolved token set and normalizes the
/// gateway's per-token report.
pub struct Dispatcher<G> {
    gateway: Arc<G>,
}

impl<G> Dispatcher<G>
where
    G: PushGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn dispatch(&self, resolved: &ResolvedTokens, message: &Message) -> DispatchOutcome {
        if resolved.is_empty() {
            // Mirrors the resolver's own early exit; callers may reach
            // either path first.
            return DispatchOutcome::failed(PushError::EmptyTarget.to_string(), None);
        }

        // The gateway guarantees report order matches submission order.
        // The deduplicated set becomes an ordered list here, exactly once;
        // that list is the frame of reference for the whole report.
        let tokens = resolved.token_list();
        let payload = PushPayload::from_message(message);

        match self.gateway.send_multicast(&tokens, &payload).await {
            Ok(report) => {
                if report.success_count == 0 {
                    warn!(
                        submitted = tokens.len(),
                        failed = report.failure_count,
                        "message rejected by all devices"
                    );
                    // Still a user-visible failure, but the report names
                    // dead tokens, so it rides along for pruning.
                    DispatchOutcome::failed(PushError::GatewayRejected.to_string(), Some(report))
                } else {
                    info!(
                        sent = report.success_count,
                        failed = report.failure_count,
                        "multicast delivered"
                    );
                    DispatchOutcome {
                        success: true,
                        sent_count: report.success_count,
                        report: Some(report),
                        error: None,
                    }
                }
            }
            Err(e) => {
                // Total failure: no report came back, so no token may be
                // pruned. The transport error goes to the caller verbatim.
                error!(error = %e, submitted = tokens.len(), "push gateway call failed");
                DispatchOutcome::failed(e.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PushPayload;
    use async_trait::async_trait;

    struct UnreachableGateway;

    #[async_trait]
    impl PushGateway for UnreachableGateway {
        async fn send_multicast(
            &self,
            _tokens: &[String],
            _payload: &PushPayload,
        ) -> Result<DeliveryReport, PushError> {
            panic!("gateway must not be called for an empty token set");
        }
    }

    #[tokio::test]
    async fn empty_token_set_never_reaches_the_gateway() {
        let dispatcher = Dispatcher::new(Arc::new(UnreachableGateway));
        let outcome = dispatcher
            .dispatch(&ResolvedTokens::default(), &Message::new("عرض", "نص"))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.sent_count, 0);
        assert_eq!(outcome.error.as_deref(), Some("no registered devices"));
        assert!(outcome.report.is_none());
    }
}
