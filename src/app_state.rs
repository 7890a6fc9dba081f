// Application state management

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::escrow::{EscrowLedger, Withdrawal, UNIT};
use crate::vault::Vault;

pub type SharedState = Arc<Mutex<AppState>>;

const STATE_FILE: &str = "data/state.json";

/// A withdrawal as exposed on the observable event feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalEvent {
    pub bet_id: u64,
    pub winner: String,
    pub payout: u128,
    pub fee: u128,
    pub timestamp: u64,
}

pub struct AppState {
    pub escrow: EscrowLedger,
    pub vault: Vault,
    /// Successful withdrawals, oldest first.
    pub withdrawals: Vec<WithdrawalEvent>,
    /// Human-readable activity feed.
    pub activity: Vec<String>,
    /// Amount credited to a newly connected account.
    pub faucet_amount: u128,
}

impl AppState {
    pub fn new(owner: &str) -> Self {
        let faucet_amount = std::env::var("FAUCET_AMOUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000 * UNIT);

        Self {
            escrow: EscrowLedger::new(owner),
            vault: Vault::new(),
            withdrawals: Vec::new(),
            activity: Vec::new(),
            faucet_amount,
        }
    }

    pub fn save_to_disk(&self) -> Result<(), String> {
        use std::fs;

        #[derive(Serialize)]
        struct PersistedState<'a> {
            escrow: &'a EscrowLedger,
            vault: &'a Vault,
        }

        let state = PersistedState {
            escrow: &self.escrow,
            vault: &self.vault,
        };

        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| format!("Failed to serialize state: {}", e))?;

        fs::create_dir_all("data")
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
        fs::write(STATE_FILE, json)
            .map_err(|e| format!("Failed to write state file: {}", e))?;

        Ok(())
    }

    pub fn load_from_disk(&mut self) -> Result<(), String> {
        use std::fs;

        #[derive(Deserialize)]
        struct PersistedState {
            escrow: EscrowLedger,
            vault: Vault,
        }

        let json = fs::read_to_string(STATE_FILE).map_err(|_| "No state file found")?;

        let state: PersistedState = serde_json::from_str(&json)
            .map_err(|e| format!("Failed to deserialize state: {}", e))?;

        self.escrow = state.escrow;
        self.vault = state.vault;

        Ok(())
    }

    pub fn record_withdrawal(&mut self, withdrawal: &Withdrawal) {
        self.withdrawals.push(WithdrawalEvent {
            bet_id: withdrawal.id,
            winner: withdrawal.winner.clone(),
            payout: withdrawal.payout,
            fee: withdrawal.fee,
            timestamp: chrono::Utc::now().timestamp() as u64,
        });
    }

    pub fn log_activity(&mut self, emoji: &str, action: &str, details: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let entry = format!("[{}] {} {} | {}", timestamp, emoji, action, details);
        tracing::info!("{} {} | {}", emoji, action, details);
        self.activity.push(entry);
        if self.activity.len() > 1000 {
            self.activity.remove(0);
        }
    }
}
