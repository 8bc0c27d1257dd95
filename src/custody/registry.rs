//! Asset registry capability: custody transfer with acceptance handshake.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::types::{AccountId, AssetId, CollectionId};

/// Why a custody transfer was rejected by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    /// The asset does not exist in the registry
    #[error("unknown asset")]
    UnknownAsset,

    /// `from` is not the current custodian of the asset
    #[error("sender does not hold custody of the asset")]
    NotCustodian,

    /// The recipient's acceptance hook rejected the transfer
    #[error("recipient rejected the transfer")]
    RecipientRejected,

    /// The registry did not answer within its bound
    #[error("registry timed out")]
    Timeout,
}

/// Capability to move custody of a single asset between identities.
///
/// A transfer is atomic at the registry: it either completes, leaving `to` as
/// the sole custodian, or fails leaving custody unchanged. The recipient may
/// run an acceptance hook; the engine's own escrow identity always accepts.
pub trait AssetRegistry {
    /// Transfer custody of (collection, asset) from `from` to `to`.
    fn transfer_custody(
        &mut self,
        collection: CollectionId,
        asset_id: AssetId,
        from: AccountId,
        to: AccountId,
    ) -> Result<(), CustodyError>;
}

// ============================================================================
// In-memory reference implementation
// ============================================================================

#[derive(Debug, Default)]
struct RegistryInner {
    /// Current custodian per asset
    custody: HashMap<(CollectionId, AssetId), AccountId>,

    /// Identities whose acceptance hook rejects incoming assets
    rejecting: HashSet<AccountId>,
}

/// In-memory asset registry with shared handles.
///
/// Cloning yields another handle onto the same registry state, so a test can
/// keep a handle while the engine owns its own. Failure injection: mark an
/// identity as rejecting to simulate a failing acceptance hook.
///
/// # Example
///
/// ```
/// use auction_house::custody::{AssetRegistry, InMemoryAssetRegistry};
///
/// let mut registry = InMemoryAssetRegistry::new();
/// registry.mint(1, 99, 7);
///
/// registry.transfer_custody(1, 99, 7, 1000).unwrap();
/// assert_eq!(registry.custodian_of(1, 99), Some(1000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl InMemoryAssetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset under an initial custodian
    pub fn mint(&self, collection: CollectionId, asset_id: AssetId, owner: AccountId) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        inner.custody.insert((collection, asset_id), owner);
    }

    /// Current custodian of an asset, if it exists
    pub fn custodian_of(&self, collection: CollectionId, asset_id: AssetId) -> Option<AccountId> {
        let inner = self.inner.lock().expect("registry lock poisoned");
        inner.custody.get(&(collection, asset_id)).copied()
    }

    /// Make `account`'s acceptance hook reject all incoming transfers
    pub fn set_rejecting(&self, account: AccountId, rejecting: bool) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if rejecting {
            inner.rejecting.insert(account);
        } else {
            inner.rejecting.remove(&account);
        }
    }
}

impl AssetRegistry for InMemoryAssetRegistry {
    fn transfer_custody(
        &mut self,
        collection: CollectionId,
        asset_id: AssetId,
        from: AccountId,
        to: AccountId,
    ) -> Result<(), CustodyError> {
        let mut inner = self.inner.lock().expect("registry lock poisoned");

        let holder = inner
            .custody
            .get(&(collection, asset_id))
            .copied()
            .ok_or(CustodyError::UnknownAsset)?;

        if holder != from {
            return Err(CustodyError::NotCustodian);
        }
        if inner.rejecting.contains(&to) {
            return Err(CustodyError::RecipientRejected);
        }

        inner.custody.insert((collection, asset_id), to);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
