// HTTP request handlers for the Moneydrain escrow API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::app_state::{SharedState, WithdrawalEvent};
use crate::escrow::{BetRecord, EscrowError};
use crate::models::*;
use crate::vault::{Transfer, TransferKind};

fn escrow_status(err: &EscrowError) -> StatusCode {
    match err {
        EscrowError::BetNotFound(_) => StatusCode::NOT_FOUND,
        EscrowError::Unauthorized => StatusCode::UNAUTHORIZED,
        EscrowError::NotResolved(_) | EscrowError::AlreadyWithdrawn(_) => StatusCode::CONFLICT,
        EscrowError::InvalidStake
        | EscrowError::StakeMismatch { .. }
        | EscrowError::Overflow => StatusCode::BAD_REQUEST,
    }
}

// ===== BET ENDPOINTS =====

pub async fn open_bet(
    State(state): State<SharedState>,
    Json(request): Json<OpenBetRequest>,
) -> Result<Json<OpenBetResponse>, (StatusCode, Json<OpenBetResponse>)> {
    let mut app_state = state.lock().unwrap();

    // Stake leaves the caller's balance first; refunded below if the open fails
    if let Err(e) = app_state
        .vault
        .debit(TransferKind::Stake, &request.account, request.amount, None)
    {
        return Err((StatusCode::BAD_REQUEST, Json(OpenBetResponse::error(&e.to_string()))));
    }

    match app_state.escrow.request_bet(&request.account, request.amount) {
        Ok(bet_id) => {
            let new_balance = app_state.vault.balance(&request.account);
            app_state.log_activity(
                "🎯",
                "BET_OPENED",
                &format!("{} staked {} on bet {}", request.account, request.amount, bet_id),
            );
            Ok(Json(OpenBetResponse {
                success: true,
                bet_id: Some(bet_id),
                stake: Some(request.amount),
                new_balance: Some(new_balance),
                error: None,
            }))
        }
        Err(e) => {
            if let Err(refund_err) = app_state.vault.credit(
                TransferKind::Refund,
                &request.account,
                request.amount,
                None,
            ) {
                tracing::error!(
                    "failed to refund {} to {}: {}",
                    request.amount,
                    request.account,
                    refund_err
                );
            }
            Err((escrow_status(&e), Json(OpenBetResponse::error(&e.to_string()))))
        }
    }
}

pub async fn take_bet(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(request): Json<TakeBetRequest>,
) -> Result<Json<TakeBetResponse>, (StatusCode, Json<TakeBetResponse>)> {
    let mut app_state = state.lock().unwrap();

    if let Err(e) = app_state
        .vault
        .debit(TransferKind::Stake, &request.account, request.amount, Some(id))
    {
        return Err((StatusCode::BAD_REQUEST, Json(TakeBetResponse::error(&e.to_string()))));
    }

    match app_state.escrow.take_bet(&request.account, id, request.amount) {
        Ok(resolution) => {
            let new_balance = app_state.vault.balance(&request.account);
            app_state.log_activity(
                "⚔️",
                "BET_TAKEN",
                &format!(
                    "{} matched bet {} | winner: {}",
                    request.account, id, resolution.winner
                ),
            );
            Ok(Json(TakeBetResponse {
                success: true,
                bet_id: Some(id),
                winner: Some(resolution.winner),
                pot: Some(resolution.pot),
                new_balance: Some(new_balance),
                error: None,
            }))
        }
        Err(e) => {
            if let Err(refund_err) = app_state.vault.credit(
                TransferKind::Refund,
                &request.account,
                request.amount,
                Some(id),
            ) {
                tracing::error!(
                    "failed to refund {} to {}: {}",
                    request.amount,
                    request.account,
                    refund_err
                );
            }
            Err((escrow_status(&e), Json(TakeBetResponse::error(&e.to_string()))))
        }
    }
}

pub async fn withdraw_bet(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(request): Json<WithdrawBetRequest>,
) -> Result<Json<WithdrawBetResponse>, (StatusCode, Json<WithdrawBetResponse>)> {
    let mut app_state = state.lock().unwrap();

    match app_state.escrow.withdraw_bet(&request.account, id) {
        Ok(withdrawal) => {
            // The escrow has already flipped `withdrawn`; credits happen after
            let owner = app_state.escrow.owner().to_string();
            if let Err(e) = app_state.vault.credit(
                TransferKind::Payout,
                &withdrawal.winner,
                withdrawal.payout,
                Some(id),
            ) {
                tracing::error!("failed to credit payout for bet {}: {}", id, e);
            }
            if withdrawal.fee > 0 {
                if let Err(e) =
                    app_state
                        .vault
                        .credit(TransferKind::Fee, &owner, withdrawal.fee, Some(id))
                {
                    tracing::error!("failed to credit fee for bet {}: {}", id, e);
                }
            }
            app_state.record_withdrawal(&withdrawal);
            app_state.log_activity(
                "🏆",
                "BET_WITHDRAWN",
                &format!(
                    "{} collected {} from bet {} | fee {}",
                    withdrawal.winner, withdrawal.payout, id, withdrawal.fee
                ),
            );
            let new_balance = app_state.vault.balance(&withdrawal.winner);
            Ok(Json(WithdrawBetResponse {
                success: true,
                bet_id: Some(id),
                winner: Some(withdrawal.winner),
                payout: Some(withdrawal.payout),
                fee: Some(withdrawal.fee),
                new_balance: Some(new_balance),
                error: None,
            }))
        }
        Err(e) => Err((escrow_status(&e), Json(WithdrawBetResponse::error(&e.to_string())))),
    }
}

// ===== READ ENDPOINTS =====

pub async fn get_bet(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<BetRecord>, StatusCode> {
    let app_state = state.lock().unwrap();
    app_state.escrow.get_bet(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_counter(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({ "counter": app_state.escrow.counter() }))
}

pub async fn get_owner(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({ "owner": app_state.escrow.owner() }))
}

pub async fn get_withdrawals(State(state): State<SharedState>) -> Json<Vec<WithdrawalEvent>> {
    let app_state = state.lock().unwrap();
    Json(app_state.withdrawals.clone())
}

pub async fn get_ledger_activity(State(state): State<SharedState>) -> Json<Value> {
    let app_state = state.lock().unwrap();
    Json(json!({ "activity": app_state.activity }))
}

pub async fn get_transfers(
    State(state): State<SharedState>,
    Path(account): Path<String>,
) -> Json<Vec<Transfer>> {
    let app_state = state.lock().unwrap();
    Json(app_state.vault.transfers_for(&account).into_iter().cloned().collect())
}
