//! Events emitted by the auction engine.
//!
//! Each event is a read-only notification for observers and indexers, fired
//! only after the corresponding state commit succeeds. A failed operation
//! emits nothing.
//!
//! All events derive `SimpleSerialize` so indexers receive a deterministic
//! encoding.

use ssz_rs::prelude::*;

use crate::types::listing::{AccountId, AssetId, CollectionId, NO_BIDDER};

// ============================================================================
// Event structs
// ============================================================================

/// A new auction was opened and the asset taken into escrow.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct AuctionStarted {
    /// Party that deposited the asset
    pub seller: AccountId,

    /// Collection of the escrowed asset
    pub collection: CollectionId,

    /// Escrowed asset
    pub asset_id: AssetId,

    /// Floor value announced at start
    pub minimum_price: u64,

    /// Absolute deadline (Unix seconds)
    pub end_time: u64,
}

/// A bid was accepted and recorded as the new leader.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct BidPlaced {
    /// New leading bidder
    pub bidder: AccountId,

    /// Collection of the auctioned asset
    pub collection: CollectionId,

    /// Auctioned asset
    pub asset_id: AssetId,

    /// Accepted bid value
    pub bid_value: u64,
}

/// An auction was finalized.
///
/// `winner` is the raw account id; 0 means the auction closed without bids
/// and the asset went back to the seller.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct AuctionEnded {
    /// Seller of the asset
    pub seller: AccountId,

    /// Winning bidder, 0 if the auction received no bids
    pub winner: AccountId,

    /// Collection of the settled asset
    pub collection: CollectionId,

    /// Settled asset
    pub asset_id: AssetId,

    /// Winning bid value, 0 if the auction received no bids
    pub winning_bid: u64,
}

impl AuctionEnded {
    /// Winning bidder, or `None` for a no-bid close.
    pub fn winner(&self) -> Option<AccountId> {
        if self.winner == NO_BIDDER {
            None
        } else {
            Some(self.winner)
        }
    }
}

// ============================================================================
// AuctionEvent enum
// ============================================================================

/// Any event the engine can emit, in commit order.
///
/// The engine appends to its event log on every successful state commit;
/// observers drain the log with [`crate::engine::AuctionEngine::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionEvent {
    /// Auction opened
    Started(AuctionStarted),
    /// Bid accepted
    Bid(BidPlaced),
    /// Auction finalized
    Ended(AuctionEnded),
}

// ============================================================================
// Unit Tests
// ============================================================================
