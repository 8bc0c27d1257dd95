//! # Auction House
//!
//! Custodial open-bid auction engine for non-fungible digital assets.
//!
//! ## Architecture
//!
//! The engine consists of:
//! - **Types**: Core data structures (Listing, events, SettlementReceipt)
//! - **Custody**: Capability seams for the asset registry and value ledger
//! - **Engine**: The start → bid* → end state machine and settlement
//!
//! ## Design Principles
//!
//! 1. **Custodial escrow**: the engine holds the auctioned asset and all
//!    outstanding bid value until settlement
//! 2. **No Floating Point**: all value math uses fixed-point arithmetic
//!    (10^8 scaling)
//! 3. **All-or-nothing effects**: refunds, payouts, and custody moves either
//!    fully commit or leave no trace in engine state
//! 4. **Injected collaborators**: custody, value transfer, and time are
//!    traits, so every failure mode is reproducible in tests

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Listing, events, SettlementReceipt
pub mod types;

/// External collaborator seams: AssetRegistry, ValueLedger
pub mod custody;

/// Clock seam for timing guards
pub mod clock;

/// Typed failure taxonomy
pub mod error;

/// Auction engine: state machine and settlement
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{AssetRegistry, InMemoryAssetRegistry, InMemoryValueLedger, ValueLedger};
pub use engine::AuctionEngine;
pub use error::{AuctionError, SettlementFailure};
pub use types::{
    AccountId, AssetId, AuctionEnded, AuctionEvent, AuctionStarted, BidPlaced, CollectionId,
    Listing, ListingKey, SettlementReceipt,
};
