//! Auction House - Binary Entry Point
//!
//! Walks one auction end to end against the in-memory collaborators:
//! start, two competing bids with an automatic refund, and settlement.

use auction_house::clock::ManualClock;
use auction_house::custody::{InMemoryAssetRegistry, InMemoryValueLedger};
use auction_house::engine::AuctionEngine;
use auction_house::types::value::from_fixed_trimmed;

const ESCROW: u64 = 1_000_000;
const OPERATOR: u64 = 1_001;
const SELLER: u64 = 7;
const BIDDER_A: u64 = 42;
const BIDDER_B: u64 = 43;

fn main() {
    tracing_subscriber::fmt::init();

    println!("===========================================");
    println!("  Auction House - demo settlement");
    println!("===========================================");
    println!();

    let registry = InMemoryAssetRegistry::new();
    let ledger = InMemoryValueLedger::new();
    let clock = ManualClock::new(1_000);

    // Seller owns asset (1, 99); bidders hold 1000.0 units each
    registry.mint(1, 99, SELLER);
    ledger.credit(BIDDER_A, 100_000_000_000);
    ledger.credit(BIDDER_B, 100_000_000_000);

    let mut engine = AuctionEngine::with_clock(
        registry.clone(),
        ledger.clone(),
        clock.clone(),
        ESCROW,
        OPERATOR,
        5,
    )
    .expect("valid fee rate");

    println!("Starting auction: asset (1, 99), minimum 100, duration 3600s");
    let started = engine
        .start_auction(1, 99, 10_000_000_000, 3_600, SELLER)
        .expect("seller owns the asset");
    println!("  Ends at t={}", started.end_time);

    println!();
    println!("Bidder {} bids 150", BIDDER_A);
    engine
        .place_bid(1, 99, 15_000_000_000, BIDDER_A)
        .expect("first bid");

    println!("Bidder {} bids 200 (bidder {} is refunded)", BIDDER_B, BIDDER_A);
    engine
        .place_bid(1, 99, 20_000_000_000, BIDDER_B)
        .expect("higher bid");
    println!(
        "  Bidder {} balance after refund: {}",
        BIDDER_A,
        from_fixed_trimmed(ledger.balance_of(BIDDER_A))
    );

    clock.advance(3_600);
    println!();
    println!("Deadline passed; settling...");
    let receipt = engine.end_auction(1, 99).expect("settlement");

    println!("  Winner:          {:?}", receipt.winner());
    println!("  Winning bid:     {}", from_fixed_trimmed(receipt.winning_bid));
    println!("  Operator fee:    {}", from_fixed_trimmed(receipt.fee_amount));
    println!("  Seller proceeds: {}", from_fixed_trimmed(receipt.seller_amount));
    println!("  Asset custody:   {:?}", registry.custodian_of(1, 99));
    println!("  Receipt digest:  {}", receipt.digest_hex());
    println!();
    println!("  State root:      {}", hex::encode(engine.state_root()));
    println!("  Events emitted:  {}", engine.drain_events().len());
}
