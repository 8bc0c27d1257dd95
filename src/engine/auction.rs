//! The auction state machine and its settlement arithmetic.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};
use crate::custody::{AssetRegistry, ValueLedger};
use crate::error::{AuctionError, SettlementFailure};
use crate::types::value::split_proceeds;
use crate::types::{
    AccountId, AssetId, AuctionEnded, AuctionEvent, AuctionStarted, BidPlaced, CollectionId,
    Listing, ListingKey, SettlementReceipt, NO_BIDDER,
};

/// Custodial open-bid auction engine.
///
/// Owns the mapping from (collection, asset) to at most one active [`Listing`],
/// enforces the start → bid* → end state machine, and performs settlement
/// through the injected [`AssetRegistry`] and [`ValueLedger`] collaborators.
///
/// ## Execution model
///
/// Every operation takes `&mut self` and runs to completion before another can
/// observe the listing map or the fee rate, so operations are strictly
/// serialized per engine instance. External calls are made while the engine
/// holds `&mut self`; a collaborator cannot re-enter the engine.
///
/// ## Atomicity
///
/// Guards run before any side effect. Multi-step effects are all-or-nothing
/// with respect to engine state: state commits happen only after every
/// external call for the operation has succeeded, and a failed external call
/// triggers a compensating transfer for any call that already landed.
///
/// ## Example
///
/// ```
/// use auction_house::clock::ManualClock;
/// use auction_house::custody::{InMemoryAssetRegistry, InMemoryValueLedger};
/// use auction_house::engine::AuctionEngine;
///
/// let registry = InMemoryAssetRegistry::new();
/// let ledger = InMemoryValueLedger::new();
/// let clock = ManualClock::new(1000);
///
/// registry.mint(1, 99, 7);      // seller 7 owns asset (1, 99)
/// ledger.credit(42, 500);       // bidder 42 has funds
///
/// let mut engine = AuctionEngine::with_clock(
///     registry.clone(), ledger.clone(), clock.clone(),
///     1_000_000, // escrow identity
///     1_001,     // operator identity
///     5,         // fee percentage
/// ).unwrap();
///
/// engine.start_auction(1, 99, 100, 3600, 7).unwrap();
/// engine.place_bid(1, 99, 150, 42).unwrap();
///
/// clock.advance(3600);
/// let receipt = engine.end_auction(1, 99).unwrap();
/// assert_eq!(receipt.winner(), Some(42));
/// assert_eq!(receipt.seller_amount, 143); // 150 - floor(150 * 5 / 100)
/// ```
#[derive(Debug)]
pub struct AuctionEngine<R, L, C = SystemClock> {
    /// Asset custody collaborator
    registry: R,

    /// Value transfer collaborator
    ledger: L,

    /// Time source for expiry guards
    clock: C,

    /// Identity holding escrowed assets on the registry
    escrow: AccountId,

    /// Identity permitted to change the fee rate; receives the fee payout
    operator: AccountId,

    /// Fee rate in whole percent, 0..=100
    fee_percentage: u8,

    /// All listings ever created, keyed by (collection, asset).
    /// Finalized entries remain as inactive tombstones.
    listings: BTreeMap<ListingKey, Listing>,

    /// Events in commit order, drained by observers
    events: Vec<AuctionEvent>,
}

impl<R, L> AuctionEngine<R, L, SystemClock>
where
    R: AssetRegistry,
    L: ValueLedger,
{
    /// Create an engine on the system clock.
    ///
    /// Fails with `InvalidFeePercentage` if `fee_percentage > 100`.
    pub fn new(
        registry: R,
        ledger: L,
        escrow: AccountId,
        operator: AccountId,
        fee_percentage: u8,
    ) -> Result<Self, AuctionError> {
        Self::with_clock(registry, ledger, SystemClock::new(), escrow, operator, fee_percentage)
    }
}

impl<R, L, C> AuctionEngine<R, L, C>
where
    R: AssetRegistry,
    L: ValueLedger,
    C: Clock,
{
    /// Create an engine with an explicit clock (tests, simulations).
    pub fn with_clock(
        registry: R,
        ledger: L,
        clock: C,
        escrow: AccountId,
        operator: AccountId,
        fee_percentage: u8,
    ) -> Result<Self, AuctionError> {
        if fee_percentage > 100 {
            return Err(AuctionError::InvalidFeePercentage);
        }

        Ok(Self {
            registry,
            ledger,
            clock,
            escrow,
            operator,
            fee_percentage,
            listings: BTreeMap::new(),
            events: Vec::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Look up a listing (active or tombstoned)
    pub fn listing(&self, collection: CollectionId, asset_id: AssetId) -> Option<&Listing> {
        self.listings.get(&ListingKey::new(collection, asset_id))
    }

    /// Number of listings ever created (including tombstones)
    #[inline]
    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }

    /// Number of currently active listings
    pub fn active_count(&self) -> usize {
        self.listings.values().filter(|l| l.is_active).count()
    }

    /// Current fee rate in whole percent
    #[inline]
    pub fn fee_percentage(&self) -> u8 {
        self.fee_percentage
    }

    /// The operator identity fixed at construction
    #[inline]
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    /// Events emitted since the last drain, in commit order
    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    /// Take all pending events, leaving the log empty
    pub fn drain_events(&mut self) -> Vec<AuctionEvent> {
        std::mem::take(&mut self.events)
    }

    /// SHA-256 root over the listing map.
    ///
    /// Hashes every (key, listing) pair in key order using little-endian field
    /// encoding, so two engines that processed the same operation sequence
    /// produce identical roots.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        for (key, listing) in &self.listings {
            hasher.update(key.collection.to_le_bytes());
            hasher.update(key.asset_id.to_le_bytes());
            hasher.update(listing.seller.to_le_bytes());
            hasher.update(listing.minimum_price.to_le_bytes());
            hasher.update(listing.end_time.to_le_bytes());
            hasher.update(listing.highest_bidder.to_le_bytes());
            hasher.update(listing.highest_bid.to_le_bytes());
            hasher.update([listing.is_active as u8]);
        }

        let result = hasher.finalize();
        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        root
    }

    // ========================================================================
    // start_auction
    // ========================================================================

    /// Open an auction: take the asset into escrow and create the listing.
    ///
    /// Guards, checked before any side effect:
    /// - `minimum_price > 0`, `duration > 0`
    /// - no active listing for this (collection, asset)
    ///
    /// The registry enforces that `caller` can authorize the custody transfer
    /// (ownership or delegated approval); a registry rejection surfaces as
    /// `CustodyTransferFailed` with no listing created.
    ///
    /// A finalized listing for the same key does not block a new auction; the
    /// fresh listing overwrites the tombstone as a new logical record.
    pub fn start_auction(
        &mut self,
        collection: CollectionId,
        asset_id: AssetId,
        minimum_price: u64,
        duration: u64,
        caller: AccountId,
    ) -> Result<AuctionStarted, AuctionError> {
        if minimum_price == 0 {
            return Err(AuctionError::InvalidMinimumPrice);
        }
        if duration == 0 {
            return Err(AuctionError::InvalidDuration);
        }

        let key = ListingKey::new(collection, asset_id);
        if self.listings.get(&key).is_some_and(|l| l.is_active) {
            return Err(AuctionError::ListingAlreadyActive);
        }

        self.registry
            .transfer_custody(collection, asset_id, caller, self.escrow)
            .map_err(AuctionError::CustodyTransferFailed)?;

        let end_time = self.clock.now_unix().saturating_add(duration);
        self.listings.insert(key, Listing::new(caller, minimum_price, end_time));

        debug!(collection, asset_id, seller = caller, minimum_price, end_time, "auction started");

        let event = AuctionStarted {
            seller: caller,
            collection,
            asset_id,
            minimum_price,
            end_time,
        };
        self.events.push(AuctionEvent::Started(event.clone()));
        Ok(event)
    }

    // ========================================================================
    // place_bid
    // ========================================================================

    /// Record a new leading bid, refunding the displaced leader.
    ///
    /// Guards, in order: listing exists and is active; the deadline has not
    /// passed (expiry does not auto-finalize — late bids are simply rejected);
    /// the bid strictly exceeds the current highest bid (ties lose).
    ///
    /// The bid value is deposited into escrow and the previous leader (if any)
    /// is refunded their full previous bid before the new leader is recorded.
    /// If the refund fails, the fresh deposit is returned to the caller and
    /// the whole bid fails with `RefundFailed` — either both the refund and
    /// the leader update happen, or neither.
    pub fn place_bid(
        &mut self,
        collection: CollectionId,
        asset_id: AssetId,
        bid_value: u64,
        caller: AccountId,
    ) -> Result<BidPlaced, AuctionError> {
        let key = ListingKey::new(collection, asset_id);
        let now = self.clock.now_unix();

        let listing = self
            .listings
            .get_mut(&key)
            .filter(|l| l.is_active)
            .ok_or(AuctionError::AuctionNotActive)?;

        if listing.has_ended_at(now) {
            return Err(AuctionError::AuctionExpired);
        }
        if bid_value <= listing.highest_bid {
            return Err(AuctionError::BidTooLow {
                bid: bid_value,
                highest: listing.highest_bid,
            });
        }

        let previous = listing.leader().map(|bidder| (bidder, listing.highest_bid));

        // The bid is a value-carrying call: escrow the new value first
        self.ledger
            .deposit(caller, bid_value)
            .map_err(AuctionError::DepositFailed)?;

        // Refund the displaced leader before recording the new one
        if let Some((prev_bidder, prev_bid)) = previous {
            if let Err(refund_err) = self.ledger.transfer(prev_bidder, prev_bid) {
                warn!(
                    collection,
                    asset_id,
                    bidder = prev_bidder,
                    amount = prev_bid,
                    %refund_err,
                    "outbid refund rejected, aborting bid"
                );
                // Return the fresh deposit so the failed bid leaves no value
                // in escrow
                if let Err(return_err) = self.ledger.transfer(caller, bid_value) {
                    error!(
                        collection,
                        asset_id,
                        bidder = caller,
                        amount = bid_value,
                        %return_err,
                        "failed to return deposit after refund failure"
                    );
                }
                return Err(AuctionError::RefundFailed(refund_err));
            }
        }

        // Commit point
        listing.record_leader(caller, bid_value);

        debug!(collection, asset_id, bidder = caller, bid_value, "bid placed");

        let event = BidPlaced {
            bidder: caller,
            collection,
            asset_id,
            bid_value,
        };
        self.events.push(AuctionEvent::Bid(event.clone()));
        Ok(event)
    }

    // ========================================================================
    // end_auction
    // ========================================================================

    /// Finalize an expired auction. Permissionless: any party may settle once
    /// the deadline has passed.
    ///
    /// With a winner: custody moves escrow → winner, then the operator fee and
    /// seller proceeds are paid as one atomic ledger batch, then the listing
    /// is deactivated. Without bids the asset returns to the seller and no
    /// value moves.
    ///
    /// Any collaborator failure aborts with `SettlementFailed`: the listing
    /// stays active and `end_auction` may be retried once the obstacle is
    /// resolved. If the payout batch fails after custody already moved, a
    /// compensating custody transfer returns the asset to escrow.
    pub fn end_auction(
        &mut self,
        collection: CollectionId,
        asset_id: AssetId,
    ) -> Result<SettlementReceipt, AuctionError> {
        let key = ListingKey::new(collection, asset_id);
        let now = self.clock.now_unix();

        let listing = self
            .listings
            .get_mut(&key)
            .filter(|l| l.is_active)
            .ok_or(AuctionError::AuctionNotActive)?;

        if !listing.has_ended_at(now) {
            return Err(AuctionError::AuctionStillOngoing);
        }

        let seller = listing.seller;
        let winner = listing.leader();
        let winning_bid = listing.highest_bid;

        let receipt = match winner {
            // No bids: the asset goes back to the seller, nothing is paid out
            None => {
                self.registry
                    .transfer_custody(collection, asset_id, self.escrow, seller)
                    .map_err(|e| {
                        AuctionError::SettlementFailed(SettlementFailure::CustodyRelease(e))
                    })?;

                debug!(collection, asset_id, seller, "auction closed without bids");
                SettlementReceipt::new(seller, NO_BIDDER, collection, asset_id, 0, 0, 0, now)
            }

            Some(winner) => {
                self.registry
                    .transfer_custody(collection, asset_id, self.escrow, winner)
                    .map_err(|e| {
                        AuctionError::SettlementFailed(SettlementFailure::CustodyRelease(e))
                    })?;

                let (fee_amount, seller_amount) = split_proceeds(winning_bid, self.fee_percentage);
                let payouts = [(self.operator, fee_amount), (seller, seller_amount)];

                if let Err(payout_err) = self.ledger.transfer_batch(&payouts) {
                    warn!(
                        collection,
                        asset_id,
                        %payout_err,
                        "settlement payout rejected, reverting custody"
                    );
                    // Custody already moved; bring the asset back so the
                    // listing stays consistently re-endable
                    if let Err(revert_err) =
                        self.registry.transfer_custody(collection, asset_id, winner, self.escrow)
                    {
                        error!(
                            collection,
                            asset_id,
                            winner,
                            %revert_err,
                            "failed to revert custody after payout failure"
                        );
                    }
                    return Err(AuctionError::SettlementFailed(SettlementFailure::Payout(
                        payout_err,
                    )));
                }

                debug!(
                    collection,
                    asset_id,
                    seller,
                    winner,
                    winning_bid,
                    fee_amount,
                    seller_amount,
                    "auction settled"
                );
                SettlementReceipt::new(
                    seller,
                    winner,
                    collection,
                    asset_id,
                    winning_bid,
                    fee_amount,
                    seller_amount,
                    now,
                )
            }
        };

        // Commit point
        listing.is_active = false;

        self.events.push(AuctionEvent::Ended(AuctionEnded {
            seller,
            winner: receipt.winner,
            collection,
            asset_id,
            winning_bid,
        }));
        Ok(receipt)
    }

    // ========================================================================
    // Fee administration
    // ========================================================================

    /// Change the fee rate. Operator only; applies to settlements computed
    /// after the change, never to already-finalized amounts.
    pub fn set_fee_percentage(
        &mut self,
        caller: AccountId,
        fee_percentage: u8,
    ) -> Result<(), AuctionError> {
        if caller != self.operator {
            return Err(AuctionError::Unauthorized);
        }
        if fee_percentage > 100 {
            return Err(AuctionError::InvalidFeePercentage);
        }

        debug!(old = self.fee_percentage, new = fee_percentage, "fee rate changed");
        self.fee_percentage = fee_percentage;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::custody::{
        CustodyError, InMemoryAssetRegistry, InMemoryValueLedger, ValueError,
    };

    const ESCROW: AccountId = 1_000_000;
    const OPERATOR: AccountId = 1_001;
    const SELLER: AccountId = 7;
    const BIDDER_A: AccountId = 42;
    const BIDDER_B: AccountId = 43;
    const COLLECTION: CollectionId = 1;
    const ASSET: AssetId = 99;

    type TestEngine = AuctionEngine<InMemoryAssetRegistry, InMemoryValueLedger, ManualClock>;

    struct Fixture {
        registry: InMemoryAssetRegistry,
        ledger: InMemoryValueLedger,
        clock: ManualClock,
        engine: TestEngine,
    }

    /// Engine with the asset minted to the seller and both bidders funded.
    fn fixture(fee_percentage: u8) -> Fixture {
        let registry = InMemoryAssetRegistry::new();
        let ledger = InMemoryValueLedger::new();
        let clock = ManualClock::new(1_000);

        registry.mint(COLLECTION, ASSET, SELLER);
        ledger.credit(BIDDER_A, 10_000);
        ledger.credit(BIDDER_B, 10_000);

        let engine = AuctionEngine::with_clock(
            registry.clone(),
            ledger.clone(),
            clock.clone(),
            ESCROW,
            OPERATOR,
            fee_percentage,
        )
        .unwrap();

        Fixture { registry, ledger, clock, engine }
    }

    fn started(fx: &mut Fixture) {
        fx.engine.start_auction(COLLECTION, ASSET, 100, 3_600, SELLER).unwrap();
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    #[test]
    fn test_new_rejects_fee_over_100() {
        let err = AuctionEngine::new(
            InMemoryAssetRegistry::new(),
            InMemoryValueLedger::new(),
            ESCROW,
            OPERATOR,
            101,
        )
        .unwrap_err();
        assert_eq!(err, AuctionError::InvalidFeePercentage);
    }

    // ------------------------------------------------------------------
    // start_auction
    // ------------------------------------------------------------------

    #[test]
    fn test_start_takes_custody_and_creates_listing() {
        let mut fx = fixture(5);

        let event = fx.engine.start_auction(COLLECTION, ASSET, 100, 3_600, SELLER).unwrap();

        assert_eq!(event.seller, SELLER);
        assert_eq!(event.minimum_price, 100);
        assert_eq!(event.end_time, 4_600); // 1000 + 3600

        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert!(listing.is_active);
        assert_eq!(listing.seller, SELLER);
        assert_eq!(listing.leader(), None);
        assert_eq!(listing.highest_bid, 0);

        // Asset now held by escrow
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(ESCROW));

        assert_eq!(fx.engine.events().len(), 1);
    }

    #[test]
    fn test_start_rejects_zero_minimum_price() {
        let mut fx = fixture(5);

        let err = fx.engine.start_auction(COLLECTION, ASSET, 0, 3_600, SELLER).unwrap_err();
        assert_eq!(err, AuctionError::InvalidMinimumPrice);

        // Fail fast: no custody transfer attempted
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(SELLER));
        assert!(fx.engine.listing(COLLECTION, ASSET).is_none());
    }

    #[test]
    fn test_start_rejects_zero_duration() {
        let mut fx = fixture(5);

        let err = fx.engine.start_auction(COLLECTION, ASSET, 100, 0, SELLER).unwrap_err();
        assert_eq!(err, AuctionError::InvalidDuration);
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(SELLER));
    }

    #[test]
    fn test_start_custody_rejection_creates_nothing() {
        let mut fx = fixture(5);

        // Caller does not own the asset
        let err = fx.engine.start_auction(COLLECTION, ASSET, 100, 3_600, BIDDER_A).unwrap_err();
        assert_eq!(
            err,
            AuctionError::CustodyTransferFailed(CustodyError::NotCustodian)
        );
        assert!(fx.engine.listing(COLLECTION, ASSET).is_none());
        assert!(fx.engine.events().is_empty());
    }

    #[test]
    fn test_start_rejects_active_duplicate() {
        let mut fx = fixture(5);
        started(&mut fx);

        let err = fx.engine.start_auction(COLLECTION, ASSET, 200, 100, SELLER).unwrap_err();
        assert_eq!(err, AuctionError::ListingAlreadyActive);

        // Original listing untouched
        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert_eq!(listing.minimum_price, 100);
    }

    #[test]
    fn test_start_after_finalize_creates_fresh_record() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.clock.advance(3_600);
        fx.engine.end_auction(COLLECTION, ASSET).unwrap();

        // Winner relists the asset
        fx.engine.start_auction(COLLECTION, ASSET, 500, 100, BIDDER_A).unwrap();

        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert!(listing.is_active);
        assert_eq!(listing.seller, BIDDER_A);
        assert_eq!(listing.minimum_price, 500);
        assert_eq!(listing.leader(), None);
        assert_eq!(listing.highest_bid, 0);
    }

    // ------------------------------------------------------------------
    // place_bid
    // ------------------------------------------------------------------

    #[test]
    fn test_first_bid_escrows_value() {
        let mut fx = fixture(5);
        started(&mut fx);

        let event = fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        assert_eq!(event.bidder, BIDDER_A);
        assert_eq!(event.bid_value, 150);

        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert_eq!(listing.leader(), Some(BIDDER_A));
        assert_eq!(listing.highest_bid, 150);

        assert_eq!(fx.ledger.balance_of(BIDDER_A), 9_850);
        assert_eq!(fx.ledger.escrow_balance(), 150);
    }

    #[test]
    fn test_first_bid_below_minimum_is_accepted() {
        // Preserved source behavior: the first bid only has to exceed the
        // recorded highest bid (zero), not the announced minimum price.
        let mut fx = fixture(5);
        started(&mut fx);

        fx.engine.place_bid(COLLECTION, ASSET, 50, BIDDER_A).unwrap();
        assert_eq!(fx.engine.listing(COLLECTION, ASSET).unwrap().highest_bid, 50);
    }

    #[test]
    fn test_bid_on_missing_listing() {
        let mut fx = fixture(5);

        let err = fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap_err();
        assert_eq!(err, AuctionError::AuctionNotActive);
    }

    #[test]
    fn test_bid_too_low_and_ties_lose() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();

        let err = fx.engine.place_bid(COLLECTION, ASSET, 120, BIDDER_B).unwrap_err();
        assert_eq!(err, AuctionError::BidTooLow { bid: 120, highest: 150 });

        // A tie does not unseat the leader
        let err = fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_B).unwrap_err();
        assert_eq!(err, AuctionError::BidTooLow { bid: 150, highest: 150 });

        // No value moved for rejected bids
        assert_eq!(fx.ledger.balance_of(BIDDER_B), 10_000);
        assert_eq!(fx.engine.listing(COLLECTION, ASSET).unwrap().leader(), Some(BIDDER_A));
    }

    #[test]
    fn test_bid_at_deadline_is_late() {
        let mut fx = fixture(5);
        started(&mut fx);

        // now == end_time exactly
        fx.clock.set(4_600);
        let err = fx.engine.place_bid(COLLECTION, ASSET, 9_999, BIDDER_A).unwrap_err();
        assert_eq!(err, AuctionError::AuctionExpired);

        // Expiry does not auto-finalize
        assert!(fx.engine.listing(COLLECTION, ASSET).unwrap().is_active);
    }

    #[test]
    fn test_outbid_refunds_previous_leader() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_B).unwrap();

        // A got the full 150 back; only B's 200 remains escrowed
        assert_eq!(fx.ledger.balance_of(BIDDER_A), 10_000);
        assert_eq!(fx.ledger.balance_of(BIDDER_B), 9_800);
        assert_eq!(fx.ledger.escrow_balance(), 200);

        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert_eq!(listing.leader(), Some(BIDDER_B));
        assert_eq!(listing.highest_bid, 200);
    }

    #[test]
    fn test_self_outbid_refunds_own_previous_bid() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_A).unwrap();

        assert_eq!(fx.ledger.balance_of(BIDDER_A), 9_800);
        assert_eq!(fx.ledger.escrow_balance(), 200);
    }

    #[test]
    fn test_unfunded_deposit_changes_nothing() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();

        let err = fx.engine.place_bid(COLLECTION, ASSET, 99_999, BIDDER_B).unwrap_err();
        assert_eq!(err, AuctionError::DepositFailed(ValueError::InsufficientFunds));

        // Leader unchanged, previous leader not refunded
        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert_eq!(listing.leader(), Some(BIDDER_A));
        assert_eq!(fx.ledger.escrow_balance(), 150);
    }

    #[test]
    fn test_refund_failure_aborts_bid_and_returns_deposit() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();

        // Previous leader cannot accept the refund
        fx.ledger.set_rejecting(BIDDER_A, true);

        let err = fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_B).unwrap_err();
        assert_eq!(err, AuctionError::RefundFailed(ValueError::RecipientRejected));

        // No state commit, and B's fresh deposit came back
        let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
        assert_eq!(listing.leader(), Some(BIDDER_A));
        assert_eq!(listing.highest_bid, 150);
        assert_eq!(fx.ledger.balance_of(BIDDER_B), 10_000);
        assert_eq!(fx.ledger.escrow_balance(), 150);
    }

    #[test]
    fn test_monotonic_leadership() {
        let mut fx = fixture(5);
        started(&mut fx);

        let mut last = 0;
        for bid in [10, 20, 21, 300, 301, 5_000] {
            fx.engine.place_bid(COLLECTION, ASSET, bid, BIDDER_A).unwrap();
            let listing = fx.engine.listing(COLLECTION, ASSET).unwrap();
            assert!(listing.highest_bid > last);
            last = listing.highest_bid;
        }
    }

    // ------------------------------------------------------------------
    // end_auction
    // ------------------------------------------------------------------

    #[test]
    fn test_end_before_deadline_rejected() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();

        fx.clock.set(4_599);
        let err = fx.engine.end_auction(COLLECTION, ASSET).unwrap_err();
        assert_eq!(err, AuctionError::AuctionStillOngoing);
        assert!(fx.engine.listing(COLLECTION, ASSET).unwrap().is_active);
    }

    #[test]
    fn test_reference_scenario_settlement() {
        // start(min=100, 3600) -> bid 150 (A) -> bid 120 rejected -> bid 200
        // (B, A refunded 150) -> end with 5% fee: 10 operator, 190 seller,
        // custody to B
        let mut fx = fixture(5);
        started(&mut fx);

        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        assert_eq!(
            fx.engine.place_bid(COLLECTION, ASSET, 120, BIDDER_B),
            Err(AuctionError::BidTooLow { bid: 120, highest: 150 })
        );
        fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_B).unwrap();
        assert_eq!(fx.ledger.balance_of(BIDDER_A), 10_000); // refunded

        fx.clock.advance(3_600);
        let receipt = fx.engine.end_auction(COLLECTION, ASSET).unwrap();

        assert_eq!(receipt.winner(), Some(BIDDER_B));
        assert_eq!(receipt.winning_bid, 200);
        assert_eq!(receipt.fee_amount, 10);
        assert_eq!(receipt.seller_amount, 190);
        assert_eq!(receipt.fee_amount + receipt.seller_amount, receipt.winning_bid);

        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(BIDDER_B));
        assert_eq!(fx.ledger.balance_of(OPERATOR), 10);
        assert_eq!(fx.ledger.balance_of(SELLER), 190);
        assert_eq!(fx.ledger.escrow_balance(), 0);

        assert!(!fx.engine.listing(COLLECTION, ASSET).unwrap().is_active);

        // Started, 2 bids, ended
        assert_eq!(fx.engine.drain_events().len(), 4);
        assert!(fx.engine.events().is_empty());
    }

    #[test]
    fn test_end_without_bids_returns_asset_to_seller() {
        let mut fx = fixture(5);
        started(&mut fx);

        fx.clock.advance(3_600);
        let receipt = fx.engine.end_auction(COLLECTION, ASSET).unwrap();

        assert!(receipt.is_unsold());
        assert_eq!(receipt.winner(), None);
        assert_eq!(receipt.winning_bid, 0);
        assert_eq!(receipt.fee_amount, 0);
        assert_eq!(receipt.seller_amount, 0);

        // Asset back with the seller, no value moved
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(SELLER));
        assert_eq!(fx.ledger.balance_of(SELLER), 0);
        assert_eq!(fx.ledger.balance_of(OPERATOR), 0);
        assert!(!fx.engine.listing(COLLECTION, ASSET).unwrap().is_active);
    }

    #[test]
    fn test_single_finalization() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.clock.advance(3_600);

        fx.engine.end_auction(COLLECTION, ASSET).unwrap();
        let err = fx.engine.end_auction(COLLECTION, ASSET).unwrap_err();
        assert_eq!(err, AuctionError::AuctionNotActive);
    }

    #[test]
    fn test_custody_release_failure_keeps_listing_endable() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.clock.advance(3_600);

        // Winner's acceptance hook rejects the asset
        fx.registry.set_rejecting(BIDDER_A, true);
        let err = fx.engine.end_auction(COLLECTION, ASSET).unwrap_err();
        assert_eq!(
            err,
            AuctionError::SettlementFailed(SettlementFailure::CustodyRelease(
                CustodyError::RecipientRejected
            ))
        );

        // Nothing committed: still active, asset in escrow, no payouts
        assert!(fx.engine.listing(COLLECTION, ASSET).unwrap().is_active);
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(ESCROW));
        assert_eq!(fx.ledger.balance_of(SELLER), 0);

        // Retry succeeds once the obstacle is resolved
        fx.registry.set_rejecting(BIDDER_A, false);
        let receipt = fx.engine.end_auction(COLLECTION, ASSET).unwrap();
        assert_eq!(receipt.winner(), Some(BIDDER_A));
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(BIDDER_A));
    }

    #[test]
    fn test_payout_failure_reverts_custody_and_keeps_listing_endable() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_A).unwrap();
        fx.clock.advance(3_600);

        // Seller cannot accept the payout
        fx.ledger.set_rejecting(SELLER, true);
        let err = fx.engine.end_auction(COLLECTION, ASSET).unwrap_err();
        assert_eq!(
            err,
            AuctionError::SettlementFailed(SettlementFailure::Payout(
                ValueError::RecipientRejected
            ))
        );

        // All-or-nothing: custody compensated back to escrow, no payout leg
        // landed, listing still active
        assert!(fx.engine.listing(COLLECTION, ASSET).unwrap().is_active);
        assert_eq!(fx.registry.custodian_of(COLLECTION, ASSET), Some(ESCROW));
        assert_eq!(fx.ledger.balance_of(OPERATOR), 0);
        assert_eq!(fx.ledger.escrow_balance(), 200);

        // Retry path
        fx.ledger.set_rejecting(SELLER, false);
        let receipt = fx.engine.end_auction(COLLECTION, ASSET).unwrap();
        assert_eq!(receipt.seller_amount, 190);
        assert_eq!(fx.ledger.balance_of(SELLER), 190);
    }

    #[test]
    fn test_zero_fee_settlement() {
        let mut fx = fixture(0);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.clock.advance(3_600);

        let receipt = fx.engine.end_auction(COLLECTION, ASSET).unwrap();
        assert_eq!(receipt.fee_amount, 0);
        assert_eq!(receipt.seller_amount, 150);
        assert_eq!(fx.ledger.balance_of(SELLER), 150);
    }

    // ------------------------------------------------------------------
    // Fee administration
    // ------------------------------------------------------------------

    #[test]
    fn test_set_fee_operator_only() {
        let mut fx = fixture(5);

        let err = fx.engine.set_fee_percentage(SELLER, 10).unwrap_err();
        assert_eq!(err, AuctionError::Unauthorized);
        assert_eq!(fx.engine.fee_percentage(), 5);

        fx.engine.set_fee_percentage(OPERATOR, 10).unwrap();
        assert_eq!(fx.engine.fee_percentage(), 10);
    }

    #[test]
    fn test_set_fee_rejects_over_100() {
        let mut fx = fixture(5);

        let err = fx.engine.set_fee_percentage(OPERATOR, 101).unwrap_err();
        assert_eq!(err, AuctionError::InvalidFeePercentage);
        assert_eq!(fx.engine.fee_percentage(), 5);
    }

    #[test]
    fn test_fee_change_applies_to_later_settlements_only() {
        let mut fx = fixture(5);
        started(&mut fx);
        fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_A).unwrap();
        fx.clock.advance(3_600);

        // Rate change lands before this settlement is computed
        fx.engine.set_fee_percentage(OPERATOR, 10).unwrap();
        let receipt = fx.engine.end_auction(COLLECTION, ASSET).unwrap();
        assert_eq!(receipt.fee_amount, 20);
        assert_eq!(receipt.seller_amount, 180);
    }

    // ------------------------------------------------------------------
    // Independence across keys, state root
    // ------------------------------------------------------------------

    #[test]
    fn test_failure_on_one_key_leaves_others_usable() {
        let mut fx = fixture(5);
        fx.registry.mint(COLLECTION, 100, SELLER);
        started(&mut fx);
        fx.engine.start_auction(COLLECTION, 100, 50, 3_600, SELLER).unwrap();

        // Break bidding on the first asset
        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        fx.ledger.set_rejecting(BIDDER_A, true);
        assert!(fx.engine.place_bid(COLLECTION, ASSET, 200, BIDDER_B).is_err());

        // The second listing is unaffected
        fx.engine.place_bid(COLLECTION, 100, 75, BIDDER_B).unwrap();
        assert_eq!(fx.engine.listing(COLLECTION, 100).unwrap().leader(), Some(BIDDER_B));
        assert_eq!(fx.engine.active_count(), 2);
    }

    #[test]
    fn test_state_root_tracks_commits_only() {
        let mut fx = fixture(5);
        let empty = fx.engine.state_root();

        started(&mut fx);
        let after_start = fx.engine.state_root();
        assert_ne!(empty, after_start);

        // Rejected operation leaves the root unchanged
        assert!(fx.engine.place_bid(COLLECTION, ASSET, 0, BIDDER_A).is_err());
        assert_eq!(fx.engine.state_root(), after_start);

        fx.engine.place_bid(COLLECTION, ASSET, 150, BIDDER_A).unwrap();
        assert_ne!(fx.engine.state_root(), after_start);
    }
}
