//! Value ledger capability: escrow deposits, refunds, and payouts.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::types::AccountId;

/// Why a value movement was rejected by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The paying account does not hold the requested amount
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The engine's escrow does not hold the requested amount
    #[error("insufficient escrow balance")]
    InsufficientEscrow,

    /// The recipient cannot accept the transfer
    #[error("recipient rejected the transfer")]
    RecipientRejected,

    /// The ledger did not answer within its bound
    #[error("ledger timed out")]
    Timeout,
}

/// Capability to move native value between accounts and the engine's escrow.
///
/// Every method is synchronous and atomic at the ledger: on error, no balance
/// has changed. `transfer_batch` extends that atomicity across several payouts
/// so the engine's dual settlement payout is all-or-nothing without clawbacks.
pub trait ValueLedger {
    /// Move `amount` from `from` into the engine's escrow.
    fn deposit(&mut self, from: AccountId, amount: u64) -> Result<(), ValueError>;

    /// Move `amount` from the engine's escrow to `to`.
    fn transfer(&mut self, to: AccountId, amount: u64) -> Result<(), ValueError>;

    /// Move several amounts from the engine's escrow, atomically: either every
    /// payout lands or none does.
    fn transfer_batch(&mut self, payouts: &[(AccountId, u64)]) -> Result<(), ValueError>;
}

// ============================================================================
// In-memory reference implementation
// ============================================================================

#[derive(Debug, Default)]
struct LedgerInner {
    /// Free balances per account
    balances: HashMap<AccountId, u64>,

    /// Value held by the engine's escrow
    escrow: u64,

    /// Accounts that refuse incoming value
    rejecting: HashSet<AccountId>,
}

impl LedgerInner {
    fn check_payout(&self, to: AccountId, amount: u64, escrow_left: u64) -> Result<u64, ValueError> {
        if self.rejecting.contains(&to) {
            return Err(ValueError::RecipientRejected);
        }
        escrow_left
            .checked_sub(amount)
            .ok_or(ValueError::InsufficientEscrow)
    }

    fn apply_payout(&mut self, to: AccountId, amount: u64) {
        self.escrow -= amount;
        *self.balances.entry(to).or_insert(0) += amount;
    }
}

/// In-memory value ledger with shared handles.
///
/// Cloning yields another handle onto the same balances, so a test can fund
/// accounts and inspect payouts while the engine owns its own handle. Failure
/// injection: mark an account as rejecting to simulate a recipient that cannot
/// accept value.
///
/// # Example
///
/// ```
/// use auction_house::custody::{InMemoryValueLedger, ValueLedger};
///
/// let mut ledger = InMemoryValueLedger::new();
/// ledger.credit(42, 500);
///
/// ledger.deposit(42, 150).unwrap();
/// assert_eq!(ledger.balance_of(42), 350);
/// assert_eq!(ledger.escrow_balance(), 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryValueLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl InMemoryValueLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add free balance to an account
    pub fn credit(&self, account: AccountId, amount: u64) {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");
        *inner.balances.entry(account).or_insert(0) += amount;
    }

    /// Free balance of an account
    pub fn balance_of(&self, account: AccountId) -> u64 {
        let inner = self.inner.lock().expect("ledger lock poisoned");
        inner.balances.get(&account).copied().unwrap_or(0)
    }

    /// Value currently held by the engine's escrow
    pub fn escrow_balance(&self) -> u64 {
        let inner = self.inner.lock().expect("ledger lock poisoned");
        inner.escrow
    }

    /// Total value across all accounts plus escrow. Transfers must conserve it.
    pub fn total_value(&self) -> u128 {
        let inner = self.inner.lock().expect("ledger lock poisoned");
        inner.balances.values().map(|&v| v as u128).sum::<u128>() + inner.escrow as u128
    }

    /// Make `account` refuse all incoming value
    pub fn set_rejecting(&self, account: AccountId, rejecting: bool) {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");
        if rejecting {
            inner.rejecting.insert(account);
        } else {
            inner.rejecting.remove(&account);
        }
    }
}

impl ValueLedger for InMemoryValueLedger {
    fn deposit(&mut self, from: AccountId, amount: u64) -> Result<(), ValueError> {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");

        let balance = inner.balances.get(&from).copied().unwrap_or(0);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(ValueError::InsufficientFunds)?;

        inner.balances.insert(from, remaining);
        inner.escrow += amount;
        Ok(())
    }

    fn transfer(&mut self, to: AccountId, amount: u64) -> Result<(), ValueError> {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");

        inner.check_payout(to, amount, inner.escrow)?;
        inner.apply_payout(to, amount);
        Ok(())
    }

    fn transfer_batch(&mut self, payouts: &[(AccountId, u64)]) -> Result<(), ValueError> {
        let mut inner = self.inner.lock().expect("ledger lock poisoned");

        // Validate every leg before applying any
        let mut escrow_left = inner.escrow;
        for &(to, amount) in payouts {
            escrow_left = inner.check_payout(to, amount, escrow_left)?;
        }
        for &(to, amount) in payouts {
            inner.apply_payout(to, amount);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
