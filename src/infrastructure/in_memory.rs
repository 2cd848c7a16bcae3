use crate::domain::payment::{Payment, PaymentId};
use crate::domain::ports::PaymentStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory payment store.
///
/// Uses `Arc<RwLock<HashMap<PaymentId, Payment>>>` so clones share the same records.
/// Ideal for tests and single-run CLI sessions where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn save(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }
}
