/// Vault: account balance accounting around the escrow ledger.
///
/// The escrow ledger owns funds while a bet is live; the vault tracks what
/// each account holds outside custody. Stakes are debited from here when a
/// bet is opened or taken, and payouts and fees land back here.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

// ============================================================================
// TRANSFER RECORDS
// ============================================================================

/// Kind of a recorded balance movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferKind {
    Faucet,
    Stake,
    Refund,
    Payout,
    Fee,
}

/// One balance movement, with a receipt hash for external reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub kind: TransferKind,
    pub account: String,
    pub amount: u128,
    /// Bet the movement belongs to, when one is known at record time.
    pub bet_id: Option<u64>,
    pub timestamp: u64,
    pub receipt: String,
}

impl Transfer {
    fn new(kind: TransferKind, account: &str, amount: u128, bet_id: Option<u64>) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = now();
        let receipt = hash(&format!("{}|{:?}|{}|{}|{}", id, kind, account, amount, timestamp));
        Self {
            id,
            kind,
            account: account.to_string(),
            amount,
            bet_id,
            timestamp,
            receipt,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    InsufficientFunds { available: u128, requested: u128 },
    Overflow,
}

impl std::fmt::Display for VaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultError::InsufficientFunds { available, requested } => {
                write!(f, "Insufficient balance: {} < {}", available, requested)
            }
            VaultError::Overflow => write!(f, "Arithmetic overflow occurred"),
        }
    }
}

impl std::error::Error for VaultError {}

// ============================================================================
// VAULT
// ============================================================================

#[derive(Default, Serialize, Deserialize)]
pub struct Vault {
    balances: HashMap<String, u128>,
    #[serde(skip)]
    transfers: Vec<Transfer>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Available balance; unknown accounts read as zero.
    pub fn balance(&self, account: &str) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Whether the account has ever been funded.
    pub fn contains(&self, account: &str) -> bool {
        self.balances.contains_key(account)
    }

    /// Adds funds to an account and records the movement.
    /// Returns the new balance.
    pub fn credit(
        &mut self,
        kind: TransferKind,
        account: &str,
        amount: u128,
        bet_id: Option<u64>,
    ) -> Result<u128, VaultError> {
        let balance = self.balance(account);
        let new_balance = balance.checked_add(amount).ok_or(VaultError::Overflow)?;
        self.balances.insert(account.to_string(), new_balance);
        self.transfers.push(Transfer::new(kind, account, amount, bet_id));
        Ok(new_balance)
    }

    /// Removes funds from an account and records the movement.
    /// Returns the new balance.
    pub fn debit(
        &mut self,
        kind: TransferKind,
        account: &str,
        amount: u128,
        bet_id: Option<u64>,
    ) -> Result<u128, VaultError> {
        let balance = self.balance(account);
        if balance < amount {
            return Err(VaultError::InsufficientFunds {
                available: balance,
                requested: amount,
            });
        }
        let new_balance = balance - amount;
        self.balances.insert(account.to_string(), new_balance);
        self.transfers.push(Transfer::new(kind, account, amount, bet_id));
        Ok(new_balance)
    }

    /// Movements touching an account, oldest first.
    pub fn transfers_for(&self, account: &str) -> Vec<&Transfer> {
        self.transfers.iter().filter(|t| t.account == account).collect()
    }

    pub fn recent_transfers(&self, limit: usize) -> Vec<&Transfer> {
        self.transfers.iter().rev().take(limit).collect()
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Compute SHA256 hash
pub fn hash(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}
