// Routes module - organizes all HTTP endpoints
// Each sub-module handles a specific domain

pub mod accounts;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;
use accounts::{connect_account, get_account_balance};

/// Builds the application router over the shared state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== BET ENDPOINTS =====
        .route("/bets", post(open_bet))
        .route("/bets/:id", get(get_bet))
        .route("/bets/:id/take", post(take_bet))
        .route("/bets/:id/withdraw", post(withdraw_bet))
        // ===== READ ENDPOINTS =====
        .route("/counter", get(get_counter))
        .route("/owner", get(get_owner))
        .route("/withdrawals", get(get_withdrawals))
        .route("/ledger", get(get_ledger_activity))
        .route("/transfers/:account", get(get_transfers))
        // ===== ACCOUNT ENDPOINTS =====
        .route("/accounts/connect", post(connect_account))
        .route("/balance/:account", get(get_account_balance))
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // Apply CORS and state
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "Moneydrain Escrow Ledger - Online ✅"
}
