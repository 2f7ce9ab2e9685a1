//! # Adyen API Client
//!
//! `PaymentProcessor` implementation over the Adyen Checkout and Recurring
//! REST APIs. Vendor error bodies are mapped to `WorkshopError::UpstreamApi`
//! here and nowhere else.

use crate::config::AdyenConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use workshop_core::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, DisableRequest, DisableResult,
    PaymentDetailsRequest, PaymentMethodsRequest, PaymentMethodsResponse, PaymentProcessor,
    PaymentRequest, PaymentResponse, WorkshopError, WorkshopResult,
};

const PROVIDER: &str = "adyen";

/// Adyen HTTP client
pub struct AdyenClient {
    config: AdyenConfig,
    client: Client,
}

impl AdyenClient {
    /// Create a new client
    pub fn new(config: AdyenConfig) -> WorkshopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| WorkshopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> WorkshopResult<Self> {
        let config = AdyenConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &AdyenConfig {
        &self.config
    }

    /// POST a JSON body and decode the JSON response
    async fn post<B, R>(&self, url: String, body: &B, idempotency_key: Option<&str>) -> WorkshopResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&url)
            .header("X-API-Key", &self.config.api_key)
            .json(body);

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WorkshopError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkshopError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Adyen API error: url={}, status={}, body={}", url, status, body);

            // Parse Adyen error
            if let Ok(error_response) = serde_json::from_str::<AdyenErrorResponse>(&body) {
                return Err(WorkshopError::UpstreamApi {
                    provider: PROVIDER.to_string(),
                    status: Some(status.as_u16()),
                    message: error_response.describe(),
                });
            }

            return Err(WorkshopError::UpstreamApi {
                provider: PROVIDER.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            WorkshopError::Serialization(format!("Failed to parse Adyen response: {}", e))
        })
    }

    fn checkout_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.checkout_base_url, path)
    }

    fn recurring_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.recurring_base_url, path)
    }
}

#[async_trait]
impl PaymentProcessor for AdyenClient {
    #[instrument(skip(self, request))]
    async fn payment_methods(
        &self,
        request: &PaymentMethodsRequest,
    ) -> WorkshopResult<PaymentMethodsResponse> {
        let response: PaymentMethodsResponse = self
            .post(self.checkout_url("paymentMethods"), request, None)
            .await?;
        debug!(
            "Retrieved {} payment methods",
            response.payment_methods.len()
        );
        Ok(response)
    }

    #[instrument(skip(self, request), fields(reference = %request.reference))]
    async fn payments(
        &self,
        request: &PaymentRequest,
        idempotency_key: Option<&str>,
    ) -> WorkshopResult<PaymentResponse> {
        let response: PaymentResponse = self
            .post(self.checkout_url("payments"), request, idempotency_key)
            .await?;
        info!(
            "Payment submitted: reference={}, resultCode={:?}, pspReference={:?}",
            request.reference, response.result_code, response.psp_reference
        );
        Ok(response)
    }

    #[instrument(skip(self, request))]
    async fn payment_details(
        &self,
        request: &PaymentDetailsRequest,
    ) -> WorkshopResult<PaymentResponse> {
        let response: PaymentResponse = self
            .post(self.checkout_url("payments/details"), request, None)
            .await?;
        info!("Payment details submitted: resultCode={:?}", response.result_code);
        Ok(response)
    }

    #[instrument(skip(self, request), fields(reference = %request.reference))]
    async fn sessions(
        &self,
        request: &CreateCheckoutSessionRequest,
    ) -> WorkshopResult<CheckoutSessionResponse> {
        let response: CheckoutSessionResponse = self
            .post(self.checkout_url("sessions"), request, None)
            .await?;
        info!("Created checkout session: id={}", response.id);
        Ok(response)
    }

    #[instrument(skip(self, request), fields(token = %request.recurring_detail_reference))]
    async fn disable(&self, request: &DisableRequest) -> WorkshopResult<DisableResult> {
        let response: DisableResult = self
            .post(self.recurring_url("disable"), request, None)
            .await?;
        info!("Disable response: {}", response.response);
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Adyen API Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdyenErrorResponse {
    #[serde(default)]
    error_code: Option<String>,
    message: String,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    psp_reference: Option<String>,
}

impl AdyenErrorResponse {
    fn describe(&self) -> String {
        let mut description = match (&self.error_type, &self.error_code) {
            (Some(kind), Some(code)) => format!("{} ({} {})", self.message, kind, code),
            (None, Some(code)) => format!("{} ({})", self.message, code),
            _ => self.message.clone(),
        };
        if let Some(psp) = &self.psp_reference {
            description.push_str(&format!(" pspReference={}", psp));
        }
        description
    }
}
