//! # Routes
//!
//! Axum router configuration for the checkout workshop.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Checkout:
///   - GET  /api/config - Drop-in client key
///   - POST /api/paymentMethods - Available payment methods
///   - POST /api/payments - Submit a Drop-in payment
///   - POST /api/payments/details - Submit 3DS2 details
///   - GET  /handleShopperRedirect - Complete a 3DS2 redirect
///   - GET  /result/{kind} - Result page
///
/// - Subscriptions:
///   - POST /api/subscription-create - Tokenization session
///   - GET  /api/subscription-payment/{ref} - Charge a stored token
///   - GET  /api/subscription-cancel/{ref} - Disable a stored token
///
/// - Admin:
///   - GET /admin - List stored tokens
///   - GET /admin/makepayment/{ref} - Charge a stored token
///   - GET /admin/disable/{ref} - Disable a stored token
///
/// - Webhooks:
///   - POST /webhooks - Notification webhook
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn routes() -> Router<AppState> {
    // Checkout flow used by the Drop-in
    let checkout_routes = Router::new()
        .route("/api/config", get(handlers::client_config))
        .route("/api/paymentMethods", post(handlers::payment_methods))
        .route("/api/payments", post(handlers::payments))
        .route("/api/payments/details", post(handlers::payment_details))
        .route("/handleShopperRedirect", get(handlers::handle_shopper_redirect))
        .route("/result/{kind}", get(handlers::result_page));

    // Tokenization and token usage
    let subscription_routes = Router::new()
        .route("/api/subscription-create", post(handlers::subscription_create))
        .route(
            "/api/subscription-payment/{recurring_detail_reference}",
            get(handlers::admin_make_payment),
        )
        .route(
            "/api/subscription-cancel/{recurring_detail_reference}",
            get(handlers::admin_disable),
        );

    let admin_routes = Router::new()
        .route("/admin", get(handlers::list_tokens))
        .route(
            "/admin/makepayment/{recurring_detail_reference}",
            get(handlers::admin_make_payment),
        )
        .route(
            "/makepaymentwithtoken/{recurring_detail_reference}",
            get(handlers::admin_make_payment),
        )
        .route(
            "/admin/disable/{recurring_detail_reference}",
            get(handlers::admin_disable),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/hello-world", get(handlers::hello_world))
        .merge(checkout_routes)
        .merge(subscription_routes)
        .merge(admin_routes)
        .route("/webhooks", post(handlers::webhooks))
}
