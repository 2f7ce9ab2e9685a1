//! # workshop-api
//!
//! HTTP API layer for the checkout workshop.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Drop-in checkout endpoints (payment methods, payments, 3DS2 details)
//! - Tokenization and admin endpoints for stored subscription tokens
//! - The notification webhook receiver
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/hello-world` | Workshop smoke test |
//! | GET | `/api/config` | Drop-in client key |
//! | POST | `/api/paymentMethods` | Available payment methods |
//! | POST | `/api/payments` | Submit a payment |
//! | POST | `/api/payments/details` | Submit 3DS2 details |
//! | GET | `/handleShopperRedirect` | 3DS2 redirect return |
//! | GET | `/result/{kind}` | Result page |
//! | POST | `/api/subscription-create` | Tokenization session |
//! | GET | `/admin` | List stored tokens |
//! | GET | `/admin/makepayment/{ref}` | Charge a stored token |
//! | GET | `/admin/disable/{ref}` | Disable a stored token |
//! | POST | `/webhooks` | Notification webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
