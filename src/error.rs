//! Typed failure taxonomy for the auction engine.
//!
//! Every guard is checked before any externally visible side effect, and every
//! multi-step effect is all-or-nothing: a failure partway through aborts the
//! whole operation and leaves previously committed state untouched. No failure
//! is fatal to the engine — other listings and operations remain usable.

use thiserror::Error;

use crate::custody::{CustodyError, ValueError};

/// Everything that can go wrong in an auction operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    /// Minimum price must be greater than zero
    #[error("minimum price must be greater than zero")]
    InvalidMinimumPrice,

    /// Auction duration must be greater than zero
    #[error("auction duration must be greater than zero")]
    InvalidDuration,

    /// Fee percentage must not exceed 100
    #[error("fee percentage must be at most 100")]
    InvalidFeePercentage,

    /// An active listing already exists for this (collection, asset) pair
    #[error("an active listing already exists for this asset")]
    ListingAlreadyActive,

    /// The listing does not exist or has been finalized
    #[error("auction is not active")]
    AuctionNotActive,

    /// The auction deadline has passed; late bids are rejected
    #[error("auction has expired")]
    AuctionExpired,

    /// The auction deadline has not yet passed; settlement is premature
    #[error("auction is still ongoing")]
    AuctionStillOngoing,

    /// The bid does not strictly exceed the current leader
    #[error("bid {bid} does not exceed current highest bid {highest}")]
    BidTooLow {
        /// Rejected bid value
        bid: u64,
        /// Current leading value it failed to beat
        highest: u64,
    },

    /// The asset registry rejected the custody transfer into escrow
    #[error("custody transfer failed: {0}")]
    CustodyTransferFailed(CustodyError),

    /// The bidder's value could not be moved into escrow
    #[error("bid deposit failed: {0}")]
    DepositFailed(ValueError),

    /// The previous leader could not be refunded; the bid was aborted
    #[error("outbid refund failed: {0}")]
    RefundFailed(ValueError),

    /// Custody release or payout failed; the listing remains active and
    /// `end_auction` may be retried
    #[error("settlement failed: {0}")]
    SettlementFailed(SettlementFailure),

    /// Fee-rate change attempted by a non-operator identity
    #[error("caller is not the operator")]
    Unauthorized,
}

/// Which leg of a settlement failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementFailure {
    /// Custody release from escrow was rejected by the registry
    #[error("custody release: {0}")]
    CustodyRelease(CustodyError),

    /// The dual payout batch was rejected by the ledger
    #[error("payout: {0}")]
    Payout(ValueError),
}
