use crate::domain::machine::StateChangeInterceptor;
use crate::domain::payment::PaymentState;
use crate::domain::ports::PaymentStoreRef;
use crate::domain::transition::Message;
use crate::error::Result;
use async_trait::async_trait;

/// Writes the target state to the payment record named by the message,
/// before the machine advances.
///
/// Messages without a payment id, or naming an unknown payment, are not persisted.
pub struct PersistStateChangeInterceptor {
    store: PaymentStoreRef,
}

impl PersistStateChangeInterceptor {
    pub fn new(store: PaymentStoreRef) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StateChangeInterceptor for PersistStateChangeInterceptor {
    async fn pre_state_change(&self, target: PaymentState, message: &Message) -> Result<()> {
        let Some(payment_id) = message.payment_id else {
            return Ok(());
        };

        let Some(mut payment) = self.store.get(payment_id).await? else {
            tracing::warn!(%payment_id, event = %message.event, "No record to persist state change against");
            return Ok(());
        };

        payment.state = target;
        self.store.save(payment).await
    }
}
