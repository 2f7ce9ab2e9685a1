//! # Checkout Workshop
//!
//! Drop-in checkout, subscription tokens and notification webhooks.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ADYEN_API_KEY=...
//! export ADYEN_CLIENT_KEY=test_...
//! export ADYEN_MERCHANT_ACCOUNT=...
//! export ADYEN_HMAC_KEY=...
//!
//! # Run the server
//! workshop
//! ```

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use workshop_api::{routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let base_url = state.config.base_url.clone();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Merchant account: {}", state.merchant_account);
    info!("Payment processor: {}", state.processor.provider_name());

    let app = routes::create_router(state);

    info!("🚀 Checkout workshop starting on http://{}", addr);

    if !is_prod {
        info!("🛒 Checkout: POST {}/api/payments", base_url);
        info!("🔁 Tokenization: POST {}/api/subscription-create", base_url);
        info!("🗂  Admin: GET {}/admin", base_url);
        info!("🔔 Webhook: POST {}/webhooks", base_url);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  💳 Checkout Workshop 💳
  ━━━━━━━━━━━━━━━━━━━━━━━
  Drop-in, tokens and webhooks
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
