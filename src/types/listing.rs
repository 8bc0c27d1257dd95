//! Listing: the sole persisted entity of the auction engine.
//!
//! ## Identity Model
//!
//! Accounts, collections, and assets are all identified by `u64`. Account id
//! `0` is reserved as the "no bidder" sentinel, mirroring the zero identity of
//! the custody layer. A listing is keyed by (collection, asset) — at most one
//! listing exists per pair at a time.
//!
//! ## SSZ Serialization
//!
//! `Listing` derives `SimpleSerialize` from ssz_rs for deterministic encoding,
//! so observers and indexers can hash or archive listing state byte-identically
//! across processes.

use ssz_rs::prelude::*;

/// Account identity (seller, bidder, operator, escrow).
pub type AccountId = u64;

/// Collection identity grouping related assets.
pub type CollectionId = u64;

/// Asset identity within a collection.
pub type AssetId = u64;

/// Reserved account id meaning "no bidder yet".
pub const NO_BIDDER: AccountId = 0;

// ============================================================================
// ListingKey
// ============================================================================

/// Map key for a listing: one (collection, asset) pair.
///
/// `Ord` is derived so the listing map iterates in a deterministic order,
/// which the engine relies on when computing state roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, SimpleSerialize)]
pub struct ListingKey {
    /// Collection the asset belongs to
    pub collection: CollectionId,

    /// Asset identifier within the collection
    pub asset_id: AssetId,
}

impl ListingKey {
    /// Create a new listing key
    pub fn new(collection: CollectionId, asset_id: AssetId) -> Self {
        Self { collection, asset_id }
    }
}

// ============================================================================
// Listing struct
// ============================================================================

/// The record of one asset under auction.
///
/// ## Lifecycle
///
/// Created by `start_auction` with the asset already in escrow. Leader fields
/// (`highest_bidder`, `highest_bid`) are mutated by `place_bid`; `is_active`
/// is cleared by `end_auction`. Entries are never deleted — a finalized
/// listing remains as an inactive tombstone and is logically absent for all
/// operations except historical inspection.
///
/// ## Invariants
///
/// - While `is_active`, `end_time` is fixed and `highest_bid` never decreases.
/// - `highest_bidder == NO_BIDDER` iff `highest_bid == 0` (no bid yet).
/// - Once `is_active` is cleared it never becomes true again for this entry;
///   a later auction for the same key is a fresh logical record.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Listing {
    /// Party that deposited the asset. Immutable once set.
    pub seller: AccountId,

    /// Floor value announced at auction start; informational once a bid exists
    pub minimum_price: u64,

    /// Absolute deadline (Unix seconds); fixed at start, never extended
    pub end_time: u64,

    /// Current leading bidder, `NO_BIDDER` (0) before any bid
    pub highest_bidder: AccountId,

    /// Current leading value, 0 before any bid
    pub highest_bid: u64,

    /// True from start until finalization
    pub is_active: bool,
}

impl Listing {
    /// Create a fresh active listing with no bids.
    ///
    /// # Example
    ///
    /// ```
    /// use auction_house::types::Listing;
    ///
    /// let listing = Listing::new(7, 100, 4600);
    /// assert!(listing.is_active);
    /// assert!(listing.leader().is_none());
    /// ```
    pub fn new(seller: AccountId, minimum_price: u64, end_time: u64) -> Self {
        Self {
            seller,
            minimum_price,
            end_time,
            highest_bidder: NO_BIDDER,
            highest_bid: 0,
            is_active: true,
        }
    }

    /// Current leading bidder, or `None` before any bid.
    pub fn leader(&self) -> Option<AccountId> {
        if self.highest_bidder == NO_BIDDER {
            None
        } else {
            Some(self.highest_bidder)
        }
    }

    /// Whether any bid has been recorded.
    #[inline]
    pub fn has_bids(&self) -> bool {
        self.highest_bidder != NO_BIDDER
    }

    /// Whether the deadline has passed at `now`.
    ///
    /// The deadline itself counts as ended: a bid arriving exactly at
    /// `end_time` is late.
    #[inline]
    pub const fn has_ended_at(&self, now: u64) -> bool {
        now >= self.end_time
    }

    /// Seconds remaining at `now` (0 once ended).
    #[inline]
    pub const fn time_remaining_at(&self, now: u64) -> u64 {
        self.end_time.saturating_sub(now)
    }

    /// Record a new leading bid. Caller must have validated the bid.
    pub(crate) fn record_leader(&mut self, bidder: AccountId, bid: u64) {
        debug_assert!(bid > self.highest_bid);
        self.highest_bidder = bidder;
        self.highest_bid = bid;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
