//! # Request Handlers
//!
//! Axum request handlers for the checkout workshop.
//! Checkout handlers pass processor responses through to the Drop-in;
//! admin handlers collapse every outcome to `success` or `error`.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::HOST, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use workshop_core::{
    stored_payment_method, AttemptAuthentication, AuthenticationData, Channel,
    CheckoutSessionResponse, CreateCheckoutSessionRequest, DisableRequest, PaymentDetailsRequest,
    PaymentMethodsRequest, PaymentMethodsResponse, PaymentOutcome, PaymentRequest,
    PaymentResponse, RecurringProcessingModel, ResultCode, ShopperInteraction, StoredToken,
    WorkshopError, WorkshopResult,
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Drop-in `state.data` submitted to `/api/payments`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    /// Encrypted payment method details
    pub payment_method: Value,
    /// Browser fingerprint for 3DS2
    #[serde(default)]
    pub browser_info: Option<Value>,
}

/// Query parameters on the shopper redirect
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectParams {
    #[serde(default)]
    pub redirect_result: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Query parameters on the result page
#[derive(Debug, Deserialize)]
pub struct ResultParams {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Drop-in client configuration
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigResponse {
    pub client_key: String,
}

/// Admin action result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionResult {
    Success,
    Error,
}

/// Admin make-payment / disable response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActionResponse {
    pub result: ActionResult,
    pub recurring_detail_reference: String,
}

/// Stored token listing
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenListResponse {
    pub tokens: Vec<StoredToken>,
    pub count: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn workshop_error_to_response(err: WorkshopError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let WorkshopError::UpstreamApi {
        status: Some(upstream),
        ..
    } = &err
    {
        response = response.with_details(format!("processor responded with HTTP {}", upstream));
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-workshop",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Workshop smoke-test endpoint
pub async fn hello_world() -> &'static str {
    "This is the 'Hello World' from the workshop - You've successfully finished step 0!"
}

/// Client key the browser Drop-in is initialised with
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        client_key: state.client_key.clone(),
    })
}

/// Retrieve the payment methods available to the merchant account
#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
) -> Result<Json<PaymentMethodsResponse>, ApiError> {
    let request = PaymentMethodsRequest::new(&state.merchant_account);

    info!("Retrieving available payment methods for {}", state.merchant_account);
    let response = state
        .processor
        .payment_methods(&request)
        .await
        .map_err(|e| {
            error!("Failed to retrieve payment methods: {}", e);
            workshop_error_to_response(e)
        })?;

    Ok(Json(response))
}

/// Submit a Drop-in payment
#[instrument(skip(state, submission))]
pub async fn payments(
    State(state): State<AppState>,
    Json(submission): Json<PaymentSubmission>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let request = build_payment_request(&state, submission);
    let idempotency_key = Uuid::new_v4().to_string();

    info!(
        "Submitting payment: reference={}, amount={} {}",
        request.reference, request.amount.value, request.amount.currency
    );

    let response = state
        .processor
        .payments(&request, Some(&idempotency_key))
        .await
        .map_err(|e| {
            error!("Payment failed: {}", e);
            workshop_error_to_response(e)
        })?;

    info!("Payment response: resultCode={:?}", response.result_code);
    Ok(Json(response))
}

fn build_payment_request(state: &AppState, submission: PaymentSubmission) -> PaymentRequest {
    let defaults = &state.defaults;
    let mut request = PaymentRequest::new(
        defaults.payment_amount(),
        &state.merchant_account,
        Uuid::new_v4().to_string(),
        submission.payment_method,
    );

    request.channel = Some(Channel::Web);
    request.return_url = Some(state.shopper_redirect_url());
    request.authentication_data = Some(AuthenticationData {
        attempt_authentication: Some(AttemptAuthentication::Always),
    });
    request.origin = Some(state.config.base_url.clone());
    request.browser_info = submission.browser_info;
    request.shopper_ip = Some(defaults.shopper_ip.clone());
    request.shopper_interaction = Some(ShopperInteraction::Ecommerce);
    request.billing_address = Some(defaults.billing_address.clone());
    request
}

/// Submit additional payment details (native 3DS2)
#[instrument(skip(state, request))]
pub async fn payment_details(
    State(state): State<AppState>,
    Json(request): Json<PaymentDetailsRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let response = state
        .processor
        .payment_details(&request)
        .await
        .map_err(|e| {
            error!("Payment details failed: {}", e);
            workshop_error_to_response(e)
        })?;

    info!("Payment details response: resultCode={:?}", response.result_code);
    Ok(Json(response))
}

/// Complete a redirect-based 3DS2 challenge and send the shopper to a result page
#[instrument(skip(state, params))]
pub async fn handle_shopper_redirect(
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
) -> Result<Redirect, ApiError> {
    let request = match (params.redirect_result, params.payload) {
        (Some(redirect_result), _) if !redirect_result.is_empty() => {
            PaymentDetailsRequest::from_redirect_result(redirect_result)
        }
        (_, Some(payload)) if !payload.is_empty() => PaymentDetailsRequest::from_payload(payload),
        _ => {
            return Err(workshop_error_to_response(WorkshopError::InvalidRequest(
                "Missing redirectResult or payload".to_string(),
            )))
        }
    };

    let response = state
        .processor
        .payment_details(&request)
        .await
        .map_err(|e| {
            error!("Payment details after redirect failed: {}", e);
            workshop_error_to_response(e)
        })?;

    let outcome = PaymentOutcome::from_result_code(response.result_code.as_ref());
    let reason = response
        .result_code
        .as_ref()
        .map(ResultCode::as_str)
        .unwrap_or("Unknown");

    info!("Shopper redirect resolved: outcome={}, reason={}", outcome.as_str(), reason);
    let location = state
        .result_url(outcome, reason)
        .map_err(workshop_error_to_response)?;
    Ok(Redirect::to(&location))
}

/// Result page
pub async fn result_page(
    Path(kind): Path<String>,
    Query(params): Query<ResultParams>,
) -> impl IntoResponse {
    let (icon, title) = match kind.as_str() {
        "success" => ("✅", "Payment Successful!"),
        "pending" => ("⏳", "Payment Pending"),
        "failed" => ("❌", "Payment Failed"),
        _ => ("⚠️", "Payment Error"),
    };
    // Only known result codes are echoed back
    let reason = params
        .reason
        .map(ResultCode::from)
        .filter(ResultCode::is_known)
        .map(|code| code.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    Html(format!(r#"
<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <div style="font-size: 60px;">{icon}</div>
        <h1>{title}</h1>
        <p style="color: #666;">Result: <code>{reason}</code></p>
    </div>
</body>
</html>
"#))
}

/// Create a zero-amount session that stores a subscription token
#[instrument(skip(state, headers))]
pub async fn subscription_create(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let order_ref = Uuid::new_v4().to_string();
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_else(|| state.config.authority());
    let return_url = format!(
        "{}://{}/redirect?orderRef={}",
        state.config.scheme(),
        host,
        order_ref
    );

    let mut request = CreateCheckoutSessionRequest::new(
        state.defaults.zero_auth_amount(),
        &state.merchant_account,
        &order_ref,
        return_url,
    )
    .for_subscription(&state.defaults.shopper_reference);
    request.country_code = Some(state.defaults.country_code.clone());
    request.channel = Some(Channel::Web);

    info!("Creating tokenization session: reference={}", order_ref);
    let response = state.processor.sessions(&request).await.map_err(|e| {
        error!("Failed to create tokenization session: {}", e);
        workshop_error_to_response(e)
    })?;

    Ok(Json(response))
}

/// List stored tokens
pub async fn list_tokens(State(state): State<AppState>) -> Result<Json<TokenListResponse>, ApiError> {
    let tokens = state.tokens.list().await.map_err(workshop_error_to_response)?;
    let count = tokens.len();
    Ok(Json(TokenListResponse { tokens, count }))
}

/// Charge a stored token
#[instrument(skip(state))]
pub async fn admin_make_payment(
    State(state): State<AppState>,
    Path(recurring_detail_reference): Path<String>,
) -> Json<AdminActionResponse> {
    info!("/admin/makepayment/{}", recurring_detail_reference);

    let result = match charge_token(&state, &recurring_detail_reference).await {
        Ok(true) => ActionResult::Success,
        Ok(false) => ActionResult::Error,
        Err(e) => {
            error!("Unexpected error while performing the payment: {}", e);
            ActionResult::Error
        }
    };

    Json(AdminActionResponse {
        result,
        recurring_detail_reference,
    })
}

async fn charge_token(state: &AppState, recurring_detail_reference: &str) -> WorkshopResult<bool> {
    let mut request = PaymentRequest::new(
        state.defaults.subscription_amount(),
        &state.merchant_account,
        Uuid::new_v4().to_string(),
        stored_payment_method(recurring_detail_reference),
    );
    request.shopper_interaction = Some(ShopperInteraction::ContAuth);
    request.shopper_reference = Some(state.defaults.shopper_reference.clone());
    request.recurring_processing_model = Some(RecurringProcessingModel::Subscription);

    let response = state.processor.payments(&request, None).await?;
    info!("Token payment response: resultCode={:?}", response.result_code);
    Ok(response.is_authorised())
}

/// Disable a stored token at the processor and remove it locally
#[instrument(skip(state))]
pub async fn admin_disable(
    State(state): State<AppState>,
    Path(recurring_detail_reference): Path<String>,
) -> Json<AdminActionResponse> {
    info!("/admin/disable/{}", recurring_detail_reference);

    let result = match disable_token(&state, &recurring_detail_reference).await {
        Ok(()) => ActionResult::Success,
        Err(e) => {
            error!("Unexpected error while disabling the token: {}", e);
            ActionResult::Error
        }
    };

    Json(AdminActionResponse {
        result,
        recurring_detail_reference,
    })
}

async fn disable_token(state: &AppState, recurring_detail_reference: &str) -> WorkshopResult<()> {
    let shopper_reference = &state.defaults.shopper_reference;
    let request = DisableRequest::new(
        &state.merchant_account,
        shopper_reference,
        recurring_detail_reference,
    );

    let response = state.processor.disable(&request).await?;
    if !response.is_disabled() {
        return Err(WorkshopError::UpstreamApi {
            provider: state.processor.provider_name().to_string(),
            status: None,
            message: format!("unexpected disable response: {}", response.response),
        });
    }

    state
        .tokens
        .remove(recurring_detail_reference, shopper_reference)
        .await?;
    info!("Removed token {}", recurring_detail_reference);
    Ok(())
}

/// Receive a notification webhook
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn webhooks(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let outcome = state.webhooks.receive(&body).await.map_err(|e| {
        match &e {
            WorkshopError::SignatureInvalid(_) => warn!("Rejected webhook: {}", e),
            _ => error!("Webhook processing failed: {}", e),
        }
        workshop_error_to_response(e)
    })?;

    info!("Webhook processed: {:?}", outcome);

    // Acknowledge event has been consumed
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_workshop_error_conversion() {
        let (status, _json) =
            workshop_error_to_response(WorkshopError::SignatureInvalid("mismatch".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, Json(body)) = workshop_error_to_response(WorkshopError::UpstreamApi {
            provider: "adyen".to_string(),
            status: Some(401),
            message: "Unauthorized".to_string(),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.details.as_deref(), Some("processor responded with HTTP 401"));
    }
}
