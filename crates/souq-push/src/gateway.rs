//! Push gateway port and report types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use souq_core::Message;

use crate::error::PushError;

/// Data-only multicast payload.
///
/// The message fields ride in `data`, never in the gateway's native
/// "visual notification" block: the client renders its own notification
/// from the data fields, and a native block would double up with the
/// client-side worker that also observes the data message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub data: PushData,
    pub platform_options: PlatformOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushData {
    pub title: String,
    pub body: String,
    pub link: String,
}

/// Platform-specific delivery options.
///
/// Some platforms route a notification tap through here instead of the
/// data fields, so the deep link is carried in both places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOptions {
    pub link: String,
}

impl PushPayload {
    pub fn from_message(message: &Message) -> Self {
        Self {
            data: PushData {
                title: message.title.clone(),
                body: message.body.clone(),
                link: message.link.clone(),
            },
            platform_options: PlatformOptions {
                link: message.link.clone(),
            },
        }
    }
}

/// Outcome for one submitted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOutcome {
    pub token: String,
    pub success: bool,
    pub error: Option<String>,
}

impl TokenOutcome {
    pub fn delivered(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(token: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Per-token delivery report for one multicast call.
///
/// `outcomes` is aligned 1:1 with the submitted token list, in submission
/// order. That single ordering guarantee is what makes pruning possible.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub success_count: u32,
    pub failure_count: u32,
    pub outcomes: Vec<TokenOutcome>,
}

impl DeliveryReport {
    /// Builds a report from ordered outcomes, deriving the counts.
    pub fn from_outcomes(outcomes: Vec<TokenOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.success).count() as u32;
        let failure_count = outcomes.len() as u32 - success_count;
        Self {
            success_count,
            failure_count,
            outcomes,
        }
    }

    /// Tokens the gateway reported as failed, in submission order.
    pub fn failed_tokens(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.token.clone())
            .collect()
    }
}

/// Fan-out delivery gateway.
///
/// One call delivers one payload to many device tokens and returns a
/// synchronous per-token report ordered exactly as `tokens` was submitted.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        payload: &PushPayload,
    ) -> Result<DeliveryReport, PushError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that PushGateway is object-safe
    fn _assert_gateway_object_safe(_: &dyn PushGateway) {}

    #[test]
    fn payload_carries_link_in_data_and_platform_options() {
        let message = Message::new("عرض", "وفر اليوم").with_link("/offers/9");
        let payload = PushPayload::from_message(&message);
        assert_eq!(payload.data.link, "/offers/9");
        assert_eq!(payload.platform_options.link, "/offers/9");
        assert_eq!(payload.data.title, "عرض");
    }

    #[test]
    fn report_counts_follow_outcomes() {
        let report = DeliveryReport::from_outcomes(vec![
            TokenOutcome::delivered("t1"),
            TokenOutcome::failed("t2", "NotRegistered"),
            TokenOutcome::delivered("t3"),
        ]);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.failed_tokens(), vec!["t2".to_string()]);
    }
}
