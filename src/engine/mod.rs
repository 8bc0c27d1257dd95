//! Auction engine module.
//!
//! ## Design Principles
//!
//! 1. **Guards before effects**: every precondition is checked before any
//!    custody or value movement is attempted
//! 2. **All-or-nothing**: multi-step effects (refund + leader update,
//!    custody + dual payout + deactivation) commit entirely or not at all
//! 3. **Strict serialization**: every operation takes `&mut self` and runs to
//!    completion; concurrent use is sharded or locked by the caller
//! 4. **Determinism**: identical operation sequences produce identical listing
//!    state and state roots
//!
//! ## Example
//!
//! ```
//! use auction_house::clock::ManualClock;
//! use auction_house::custody::{InMemoryAssetRegistry, InMemoryValueLedger};
//! use auction_house::engine::AuctionEngine;
//!
//! let registry = InMemoryAssetRegistry::new();
//! let ledger = InMemoryValueLedger::new();
//! let clock = ManualClock::new(0);
//!
//! registry.mint(1, 99, 7);
//! ledger.credit(42, 1_000);
//!
//! let mut engine = AuctionEngine::with_clock(
//!     registry, ledger, clock.clone(), 1_000_000, 1_001, 5,
//! ).unwrap();
//!
//! engine.start_auction(1, 99, 100, 3600, 7).unwrap();
//! engine.place_bid(1, 99, 150, 42).unwrap();
//!
//! clock.advance(3600);
//! assert!(engine.end_auction(1, 99).is_ok());
//! ```

pub mod auction;

pub use auction::AuctionEngine;
