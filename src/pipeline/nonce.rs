//! Per-sender nonce lanes.
//!
//! A lane is held from the pending-nonce lookup until the node has accepted
//! (or rejected) the transaction, so the next submission from the same
//! sender sees it in the pending view. Lanes for different senders never
//! block each other. Waiters are served in FIFO order.

use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held for the duration of NONCE_LOOKUP..SENDING.
pub type LaneGuard = OwnedMutexGuard<()>;

#[derive(Debug, Clone, Default)]
pub struct NonceLanes {
    lanes: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

impl NonceLanes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `address`'s lane.
    pub async fn acquire(&self, address: Address) -> LaneGuard {
        let lane = Arc::clone(&self.lanes.entry(address).or_default());
        lane.lock_owned().await
    }

    /// Number of senders seen so far.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
