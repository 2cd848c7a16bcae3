use crate::domain::payment::PaymentId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-payment async locks serializing the read-modify-write of one record.
///
/// Operations on different payments never wait on each other.
#[derive(Default)]
pub struct PaymentLocks {
    locks: Mutex<HashMap<PaymentId, Arc<Mutex<()>>>>,
}

impl PaymentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other operation holds `id`, and holds it until the guard drops.
    pub async fn acquire(&self, id: PaymentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only referenced by the map are idle.
            locks.retain(|key, lock| *key == id || Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
