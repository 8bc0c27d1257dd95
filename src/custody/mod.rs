//! External collaborator seams: asset custody and value transfer.
//!
//! ## Design
//!
//! The engine never touches ownership records or balances directly. Both
//! collaborators are injected as trait implementations so they can be
//! substituted with doubles that simulate transfer failure, recipient
//! rejection, or unfunded accounts:
//!
//! - [`AssetRegistry`]: "transfer custody of asset X from A to B, atomically,
//!   with recipient-acceptance handshake"
//! - [`ValueLedger`]: "move native value between the engine's escrow and an
//!   account, synchronously, failing the whole operation if the recipient
//!   cannot accept"
//!
//! In-memory reference implementations ship alongside the traits; they back
//! the demo binary and the test suite.

pub mod ledger;
pub mod registry;

pub use ledger::{InMemoryValueLedger, ValueError, ValueLedger};
pub use registry::{AssetRegistry, CustodyError, InMemoryAssetRegistry};
