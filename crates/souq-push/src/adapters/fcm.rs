//! FCM-style multicast gateway adapter.
//!
//! One POST carries the whole token batch (`registration_ids`) and the
//! response carries one `results` entry per token, in submission order.
//! The request body is data-only; the deep link additionally rides in the
//! webpush options block so a tap routes correctly on platforms that read
//! it from there.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::PushError;
use crate::gateway::{DeliveryReport, PushData, PushGateway, PushPayload, TokenOutcome};

pub struct FcmGateway {
    http_client: Client,
    config: GatewayConfig,
}

impl FcmGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, PushError> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PushError::transport(e.to_string()))?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    registration_ids: &'a [String],
    data: &'a PushData,
    webpush: WebpushOptions<'a>,
}

#[derive(Serialize)]
struct WebpushOptions<'a> {
    fcm_options: FcmOptions<'a>,
}

#[derive(Serialize)]
struct FcmOptions<'a> {
    link: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[allow(dead_code)]
    success: u32,
    #[allow(dead_code)]
    failure: u32,
    results: Vec<WireResult>,
}

#[derive(Deserialize)]
struct WireResult {
    #[allow(dead_code)]
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl PushGateway for FcmGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        payload: &PushPayload,
    ) -> Result<DeliveryReport, PushError> {
        let body = WireRequest {
            registration_ids: tokens,
            data: &payload.data,
            webpush: WebpushOptions {
                fcm_options: FcmOptions {
                    link: &payload.platform_options.link,
                },
            },
        };

        let mut request = self
            .http_client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.config.server_key {
            request = request.header("Authorization", format!("key={key}"));
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| PushError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PushError::transport(format!(
                "gateway returned {status}: {text}"
            )));
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| PushError::transport(e.to_string()))?;

        if parsed.results.len() != tokens.len() {
            return Err(PushError::transport(format!(
                "gateway report misaligned: {} results for {} tokens",
                parsed.results.len(),
                tokens.len()
            )));
        }

        let outcomes = tokens
            .iter()
            .zip(parsed.results)
            .map(|(token, result)| match result.error {
                Some(error) => TokenOutcome::failed(token, error),
                None => TokenOutcome::delivered(token),
            })
            .collect();

        Ok(DeliveryReport::from_outcomes(outcomes))
    }
}
