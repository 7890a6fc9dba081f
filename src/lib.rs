/// Moneydrain Escrow Betting Ledger
/// Exports the escrow core and service modules for use as a library crate

pub mod app_state;
pub mod escrow;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod vault;

// Re-export the escrow core
pub use escrow::{
    BetRecord, EscrowError, EscrowLedger, Resolution, SystemTimeSource, TimeSource, Withdrawal,
    FEE_DIVISOR, UNIT,
};

// Re-export vault accounting
pub use vault::{Transfer, TransferKind, Vault, VaultError};

pub use app_state::{AppState, SharedState, WithdrawalEvent};
pub use routes::router;
