//! Core data types for the auction house
//!
//! All persisted and observer-facing types implement SSZ serialization for
//! deterministic encoding. All native values use fixed-point representation
//! (scaled by 10^8).
//!
//! ## Types
//!
//! - [`Listing`]: the record of one asset under auction
//! - [`ListingKey`]: (collection, asset) map key
//! - [`AuctionStarted`], [`BidPlaced`], [`AuctionEnded`]: observer events
//! - [`SettlementReceipt`]: finalization summary with fee split and digest

mod event;
mod listing;
mod receipt;
pub mod value;

// Re-export all types at module level
pub use event::{AuctionEnded, AuctionEvent, AuctionStarted, BidPlaced};
pub use listing::{AccountId, AssetId, CollectionId, Listing, ListingKey, NO_BIDDER};
pub use receipt::SettlementReceipt;
