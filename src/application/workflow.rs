use super::interceptor::PersistStateChangeInterceptor;
use super::locks::PaymentLocks;
use crate::domain::actions::payment_transitions;
use crate::domain::machine::{DispatchOutcome, StateMachine};
use crate::domain::payment::{Amount, Payment, PaymentEvent, PaymentId, PaymentState};
use crate::domain::ports::{AuthorizationGatewayRef, PaymentStoreRef};
use crate::domain::transition::{Message, TransitionTable};
use crate::error::{PaymentError, Result};
use std::sync::Arc;

/// Result of one workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub payment_id: PaymentId,
    /// Outcome of the requested event itself.
    pub outcome: DispatchOutcome,
    /// State after every cascaded event settled; equals the persisted state.
    pub state: PaymentState,
}

/// The entry point for payment workflows.
///
/// Each operation loads the record, rehydrates a fresh `StateMachine` primed to its
/// state, dispatches one event and discards the machine. Operations on the same
/// payment are serialized; a failed operation restores the record it started from.
pub struct PaymentService {
    store: PaymentStoreRef,
    table: Arc<TransitionTable>,
    interceptor: Arc<PersistStateChangeInterceptor>,
    locks: PaymentLocks,
}

impl PaymentService {
    /// Creates a service over `store`, taking approval decisions from `gateway`.
    ///
    /// # Arguments
    ///
    /// * `store` - The durable payment store.
    /// * `gateway` - The decision source used by the authorization actions.
    pub fn new(store: PaymentStoreRef, gateway: AuthorizationGatewayRef) -> Result<Self> {
        let table = Arc::new(payment_transitions(gateway)?);
        Ok(Self::with_table(store, table))
    }

    pub fn with_table(store: PaymentStoreRef, table: Arc<TransitionTable>) -> Self {
        Self {
            interceptor: Arc::new(PersistStateChangeInterceptor::new(store.clone())),
            store,
            table,
            locks: PaymentLocks::new(),
        }
    }

    /// Persists a new payment in the `NEW` state. No event is dispatched.
    pub async fn create_payment(&self, amount: Amount) -> Result<Payment> {
        let payment = Payment::new(amount);
        self.store.save(payment.clone()).await?;
        tracing::info!(payment_id = %payment.id, amount = %payment.amount, "Payment created");
        Ok(payment)
    }

    pub async fn pre_authorize(&self, payment_id: PaymentId) -> Result<StateChange> {
        self.send_event(payment_id, PaymentEvent::PreAuthorize).await
    }

    pub async fn authorize(&self, payment_id: PaymentId) -> Result<StateChange> {
        self.send_event(payment_id, PaymentEvent::Authorize).await
    }

    /// Declines authorization explicitly, without consulting the gateway.
    pub async fn decline_authorization(&self, payment_id: PaymentId) -> Result<StateChange> {
        self.send_event(payment_id, PaymentEvent::AuthDeclined).await
    }

    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<Payment> {
        self.store
            .get(payment_id)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    pub async fn payments(&self) -> Result<Vec<Payment>> {
        self.store.get_all().await
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.table
    }

    async fn send_event(&self, payment_id: PaymentId, event: PaymentEvent) -> Result<StateChange> {
        let _guard = self.locks.acquire(payment_id).await;

        let snapshot = self.get_payment(payment_id).await?;
        let mut machine = self.rehydrate(&snapshot);

        let message = Message::new(event).with_payment_id(payment_id);
        match machine.send_event(message).await {
            Ok(outcome) => Ok(StateChange {
                payment_id,
                outcome,
                state: machine.state(),
            }),
            Err(e) => {
                tracing::error!(%payment_id, %event, error = %e, "Workflow failed, rolling back");
                self.restore(snapshot).await;
                Err(e)
            }
        }
    }

    fn rehydrate(&self, payment: &Payment) -> StateMachine {
        StateMachine::rehydrate(self.table.clone(), payment.state)
            .with_interceptor(self.interceptor.clone())
    }

    async fn restore(&self, snapshot: Payment) {
        let payment_id = snapshot.id;
        if let Err(e) = self.store.save(snapshot).await {
            tracing::error!(%payment_id, error = %e, "Failed to restore payment after aborted workflow");
        }
    }
}
