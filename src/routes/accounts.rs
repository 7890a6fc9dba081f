// Account routes for the Moneydrain service
// Identity is an opaque address supplied by the caller; connecting funds new
// accounts so the service is usable end to end.

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::app_state::SharedState;
use crate::models::{BalanceResponse, ConnectAccountRequest, ConnectAccountResponse};
use crate::vault::TransferKind;

/// POST /accounts/connect
/// Creates and funds the account if new, returns the balance if existing
pub async fn connect_account(
    State(state): State<SharedState>,
    Json(payload): Json<ConnectAccountRequest>,
) -> Json<ConnectAccountResponse> {
    let mut app_state = state.lock().unwrap();

    if !app_state.vault.contains(&payload.account) {
        let amount = app_state.faucet_amount;
        match app_state
            .vault
            .credit(TransferKind::Faucet, &payload.account, amount, None)
        {
            Ok(balance) => {
                app_state.log_activity(
                    "🆕",
                    "NEW_ACCOUNT",
                    &format!("{} connected | funded with {}", payload.account, amount),
                );
                Json(ConnectAccountResponse {
                    success: true,
                    account: payload.account,
                    balance,
                    is_new_account: true,
                })
            }
            Err(e) => {
                tracing::error!("failed to fund {}: {}", payload.account, e);
                Json(ConnectAccountResponse {
                    success: false,
                    account: payload.account,
                    balance: 0,
                    is_new_account: true,
                })
            }
        }
    } else {
        let balance = app_state.vault.balance(&payload.account);
        Json(ConnectAccountResponse {
            success: true,
            account: payload.account,
            balance,
            is_new_account: false,
        })
    }
}

/// GET /balance/:account
/// Get balance for any account
pub async fn get_account_balance(
    State(state): State<SharedState>,
    Path(account): Path<String>,
) -> Json<BalanceResponse> {
    let app_state = state.lock().unwrap();
    let balance = app_state.vault.balance(&account);
    Json(BalanceResponse { account, balance })
}
