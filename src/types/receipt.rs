//! Settlement receipt for finalized auctions.
//!
//! The receipt is the engine's return value from a successful `end_auction`:
//! it records the winner, the winning bid, and the exact fee split, and can
//! produce a SHA-256 digest for observers that want a compact commitment to
//! the settlement.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::listing::{AccountId, AssetId, CollectionId, NO_BIDDER};

/// Summary of one finalized auction.
///
/// ## Conservation
///
/// `fee_amount + seller_amount == winning_bid` exactly; the split uses floor
/// division for the fee (see [`crate::types::value::split_proceeds`]).
/// For a no-bid close all three amounts are zero and `winner` is 0.
///
/// ## Example
///
/// ```
/// use auction_house::types::SettlementReceipt;
///
/// let receipt = SettlementReceipt::new(7, 42, 1, 99, 200, 10, 190, 5000);
/// assert_eq!(receipt.winner(), Some(42));
/// assert_eq!(receipt.digest_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct SettlementReceipt {
    /// Seller paid out by this settlement
    pub seller: AccountId,

    /// Winning bidder, 0 for a no-bid close
    pub winner: AccountId,

    /// Collection of the settled asset
    pub collection: CollectionId,

    /// Settled asset
    pub asset_id: AssetId,

    /// Winning bid value
    pub winning_bid: u64,

    /// Operator fee, `floor(winning_bid * fee_percentage / 100)`
    pub fee_amount: u64,

    /// Seller proceeds, `winning_bid - fee_amount`
    pub seller_amount: u64,

    /// Settlement timestamp (Unix seconds)
    pub timestamp: u64,
}

impl SettlementReceipt {
    /// Create a new settlement receipt
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seller: AccountId,
        winner: AccountId,
        collection: CollectionId,
        asset_id: AssetId,
        winning_bid: u64,
        fee_amount: u64,
        seller_amount: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            seller,
            winner,
            collection,
            asset_id,
            winning_bid,
            fee_amount,
            seller_amount,
            timestamp,
        }
    }

    /// Winning bidder, or `None` for a no-bid close.
    pub fn winner(&self) -> Option<AccountId> {
        if self.winner == NO_BIDDER {
            None
        } else {
            Some(self.winner)
        }
    }

    /// Whether the auction closed without any bid.
    pub fn is_unsold(&self) -> bool {
        self.winner == NO_BIDDER
    }

    /// SHA-256 digest over the receipt's field encoding.
    ///
    /// The digest is computed over the little-endian field concatenation, so
    /// it is identical across processes for the same settlement.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.seller.to_le_bytes());
        hasher.update(self.winner.to_le_bytes());
        hasher.update(self.collection.to_le_bytes());
        hasher.update(self.asset_id.to_le_bytes());
        hasher.update(self.winning_bid.to_le_bytes());
        hasher.update(self.fee_amount.to_le_bytes());
        hasher.update(self.seller_amount.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());

        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }

    /// Digest as a hex string.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
