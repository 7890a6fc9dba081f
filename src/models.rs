// Data models for the Moneydrain escrow API

use serde::{Deserialize, Serialize};

// ===== BET ENDPOINTS =====

/// POST /bets request body
#[derive(Debug, Deserialize)]
pub struct OpenBetRequest {
    /// Opaque caller identity supplied by the environment
    pub account: String,
    /// Stake in base units, deposited with the call
    pub amount: u128,
}

#[derive(Debug, Serialize)]
pub struct OpenBetResponse {
    pub success: bool,
    pub bet_id: Option<u64>,
    pub stake: Option<u128>,
    pub new_balance: Option<u128>,
    pub error: Option<String>,
}

impl OpenBetResponse {
    pub fn error(msg: &str) -> Self {
        Self {
            success: false,
            bet_id: None,
            stake: None,
            new_balance: None,
            error: Some(msg.to_string()),
        }
    }
}

/// POST /bets/:id/take request body
#[derive(Debug, Deserialize)]
pub struct TakeBetRequest {
    pub account: String,
    /// Must match the requester's stake exactly
    pub amount: u128,
}

#[derive(Debug, Serialize)]
pub struct TakeBetResponse {
    pub success: bool,
    pub bet_id: Option<u64>,
    pub winner: Option<String>,
    pub pot: Option<u128>,
    pub new_balance: Option<u128>,
    pub error: Option<String>,
}

impl TakeBetResponse {
    pub fn error(msg: &str) -> Self {
        Self {
            success: false,
            bet_id: None,
            winner: None,
            pot: None,
            new_balance: None,
            error: Some(msg.to_string()),
        }
    }
}

/// POST /bets/:id/withdraw request body
#[derive(Debug, Deserialize)]
pub struct WithdrawBetRequest {
    pub account: String,
}

#[derive(Debug, Serialize)]
pub struct WithdrawBetResponse {
    pub success: bool,
    pub bet_id: Option<u64>,
    pub winner: Option<String>,
    pub payout: Option<u128>,
    pub fee: Option<u128>,
    pub new_balance: Option<u128>,
    pub error: Option<String>,
}

impl WithdrawBetResponse {
    pub fn error(msg: &str) -> Self {
        Self {
            success: false,
            bet_id: None,
            winner: None,
            payout: None,
            fee: None,
            new_balance: None,
            error: Some(msg.to_string()),
        }
    }
}

// ===== ACCOUNT ENDPOINTS =====

/// POST /accounts/connect request body
#[derive(Debug, Deserialize)]
pub struct ConnectAccountRequest {
    pub account: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectAccountResponse {
    pub success: bool,
    pub account: String,
    pub balance: u128,
    pub is_new_account: bool,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account: String,
    pub balance: u128,
}
