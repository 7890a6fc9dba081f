/// Escrow ledger for two-party matched bets.
///
/// One party opens a bet by staking funds, a second party matches the stake
/// exactly, and the combined pot (minus the house fee) goes to whichever side
/// the take-time parity picks. The ledger keeps custody of all deposited
/// funds until the winner withdraws.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base-unit scale of the ledger's asset (10^18 base units per whole coin).
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// House fee is pot / FEE_DIVISOR (1%), floor division at base-unit granularity.
pub const FEE_DIVISOR: u128 = 100;

// ============================================================================
// TIME SOURCE
// ============================================================================

/// Supplies the opaque time value used as the resolution trigger.
///
/// The ledger relies on nothing beyond the parity of the value; callers are
/// assumed unable to predict it at take time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock seconds since the Unix epoch.
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }
}

fn default_time_source() -> Box<dyn TimeSource> {
    Box::new(SystemTimeSource)
}

// ============================================================================
// CORE TYPES
// ============================================================================

/// One escrow instance, progressing from opened to taken to withdrawn.
///
/// Records are never deleted; `withdrawn = true` is the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetRecord {
    pub id: u64,
    pub requester: String,
    /// Unset until the bet is taken, then immutable.
    pub winner: Option<String>,
    pub stake: u128,
    pub taken: bool,
    pub withdrawn: bool,
}

/// Outcome of a successful take: the single resolution point for a bet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub id: u64,
    pub winner: String,
    pub stake: u128,
    pub pot: u128,
}

/// Emitted once per bet when the winner collects the pot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Withdrawal {
    pub id: u64,
    pub winner: String,
    pub payout: u128,
    pub fee: u128,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Validation failures, surfaced verbatim to the caller.
///
/// Every operation fails atomically: no partial state change and no partial
/// fund movement when a precondition is violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    InvalidStake,
    BetNotFound(u64),
    StakeMismatch { expected: u128, provided: u128 },
    NotResolved(u64),
    AlreadyWithdrawn(u64),
    Unauthorized,
    Overflow,
}

impl std::fmt::Display for EscrowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscrowError::InvalidStake => write!(f, "Stake must be greater than zero"),
            EscrowError::BetNotFound(id) => write!(f, "Bet {} does not exist", id),
            EscrowError::StakeMismatch { expected, provided } => {
                write!(f, "You must match the bet value: expected {}, got {}", expected, provided)
            }
            EscrowError::NotResolved(id) => write!(f, "Bet {} has not been taken yet", id),
            EscrowError::AlreadyWithdrawn(id) => write!(f, "Bet {} was already withdrawn", id),
            EscrowError::Unauthorized => write!(f, "Only the winner can withdraw"),
            EscrowError::Overflow => write!(f, "Arithmetic overflow occurred"),
        }
    }
}

impl std::error::Error for EscrowError {}

// ============================================================================
// ESCROW LEDGER
// ============================================================================

/// The escrow ledger: maps bet ids to records, enforces the bet lifecycle,
/// resolves outcomes and authorizes payouts.
///
/// All state-mutating calls take `&mut self`; the hosting process serializes
/// access (one ledger instance behind one lock).
#[derive(Serialize, Deserialize)]
pub struct EscrowLedger {
    owner: String,
    bets: HashMap<u64, BetRecord>,
    next_id: u64,
    /// Sum of all funds currently held: stake per open bet, 2x stake per
    /// taken-but-unwithdrawn bet.
    custody: u128,
    #[serde(skip, default = "default_time_source")]
    time: Box<dyn TimeSource>,
}

impl EscrowLedger {
    pub fn new(owner: &str) -> Self {
        Self::with_time_source(owner, Box::new(SystemTimeSource))
    }

    /// Construct with an injected time source so outcomes can be pinned.
    pub fn with_time_source(owner: &str, time: Box<dyn TimeSource>) -> Self {
        Self {
            owner: owner.to_string(),
            bets: HashMap::new(),
            next_id: 1,
            custody: 0,
            time,
        }
    }

    /// Opens a bet: escrows `amount` on behalf of `requester` and returns
    /// the newly assigned bet id. Ids start at 1 and are never reused.
    pub fn request_bet(&mut self, requester: &str, amount: u128) -> Result<u64, EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidStake);
        }
        let custody = self.custody.checked_add(amount).ok_or(EscrowError::Overflow)?;

        let id = self.next_id;
        self.bets.insert(
            id,
            BetRecord {
                id,
                requester: requester.to_string(),
                winner: None,
                stake: amount,
                taken: false,
                withdrawn: false,
            },
        );
        self.next_id += 1;
        self.custody = custody;
        Ok(id)
    }

    /// Matches an open bet and resolves it. The parity of the time value
    /// observed at this call decides the winner: even favours the requester,
    /// odd favours the taker. Resolution runs exactly once per bet; a second
    /// take sees the bet as no longer open.
    pub fn take_bet(&mut self, taker: &str, id: u64, amount: u128) -> Result<Resolution, EscrowError> {
        let bet = self
            .bets
            .get_mut(&id)
            .filter(|b| !b.taken)
            .ok_or(EscrowError::BetNotFound(id))?;
        if amount != bet.stake {
            return Err(EscrowError::StakeMismatch {
                expected: bet.stake,
                provided: amount,
            });
        }
        let custody = self.custody.checked_add(amount).ok_or(EscrowError::Overflow)?;
        let pot = bet.stake.checked_mul(2).ok_or(EscrowError::Overflow)?;
        let stake = bet.stake;

        let t = self.time.now();
        let winner = if t % 2 == 0 {
            bet.requester.clone()
        } else {
            taker.to_string()
        };
        bet.taken = true;
        bet.winner = Some(winner.clone());
        self.custody = custody;

        Ok(Resolution { id, winner, stake, pot })
    }

    /// Pays out a resolved bet: the house fee goes to the owner, the rest to
    /// the winner. The `withdrawn` flag flips before the transfer is
    /// reported, so a repeated call for the same id can never pay twice.
    pub fn withdraw_bet(&mut self, caller: &str, id: u64) -> Result<Withdrawal, EscrowError> {
        let bet = self.bets.get_mut(&id).ok_or(EscrowError::BetNotFound(id))?;
        if !bet.taken {
            return Err(EscrowError::NotResolved(id));
        }
        if bet.withdrawn {
            return Err(EscrowError::AlreadyWithdrawn(id));
        }
        let winner = match &bet.winner {
            Some(w) if w == caller => w.clone(),
            _ => return Err(EscrowError::Unauthorized),
        };
        let pot = bet.stake.checked_mul(2).ok_or(EscrowError::Overflow)?;
        let fee = pot / FEE_DIVISOR;
        let payout = pot - fee;
        let custody = self.custody.checked_sub(pot).ok_or(EscrowError::Overflow)?;

        bet.withdrawn = true;
        self.custody = custody;

        Ok(Withdrawal { id, winner, payout, fee })
    }

    /// Snapshot of a bet record.
    pub fn get_bet(&self, id: u64) -> Option<BetRecord> {
        self.bets.get(&id).cloned()
    }

    /// Number of bets ever created.
    pub fn counter(&self) -> u64 {
        self.next_id - 1
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Total funds currently held on behalf of open and unresolved bets.
    pub fn custody(&self) -> u128 {
        self.custody
    }
}

// ============================================================================
// TESTS
// ============================================================================
