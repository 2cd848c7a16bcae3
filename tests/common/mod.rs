#![allow(dead_code)]

use async_trait::async_trait;
use paysm::domain::payment::{Payment, PaymentId, PaymentState};
use paysm::domain::ports::{AuthorizationGateway, AuthorizationStep, Decision, PaymentStore};
use paysm::error::{PaymentError, Result};
use paysm::infrastructure::in_memory::InMemoryPaymentStore;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Always answers with the same decision and counts how often it was asked.
pub struct FixedGateway {
    decision: Decision,
    calls: AtomicUsize,
}

impl FixedGateway {
    pub fn approving() -> Self {
        Self::new(Decision::Approved)
    }

    pub fn declining() -> Self {
        Self::new(Decision::Declined)
    }

    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationGateway for FixedGateway {
    async fn decide(&self, _step: AuthorizationStep, _id: PaymentId) -> Result<Decision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.decision)
    }
}

/// In-memory store whose writes fail for one target state.
#[derive(Default, Clone)]
pub struct FailingStore {
    inner: InMemoryPaymentStore,
    fail_on: Option<PaymentState>,
}

impl FailingStore {
    pub fn failing_on(state: PaymentState) -> Self {
        Self {
            inner: InMemoryPaymentStore::new(),
            fail_on: Some(state),
        }
    }
}

#[async_trait]
impl PaymentStore for FailingStore {
    async fn save(&self, payment: Payment) -> Result<()> {
        if self.fail_on == Some(payment.state) {
            return Err(PaymentError::Persistence(format!(
                "write of {} rejected",
                payment.state
            )));
        }
        self.inner.save(payment).await
    }

    async fn get(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<Payment>> {
        self.inner.get_all().await
    }
}
