use super::payment::PaymentState;
use super::transition::{EventEmitter, Message, TransitionTable};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Upper bound on dispatches within one `send_event` call, cascades included.
pub const MAX_CASCADE: usize = 32;

/// Hook run for every approved transition before the machine advances.
///
/// An error aborts the dispatch chain and leaves the machine in its previous state.
#[async_trait]
pub trait StateChangeInterceptor: Send + Sync {
    async fn pre_state_change(&self, target: PaymentState, message: &Message) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A transition was taken (possibly a self-loop).
    Accepted {
        from: PaymentState,
        to: PaymentState,
    },
    /// The transition's guard rejected the message.
    Denied,
    /// No transition is defined for the event in the current state.
    Ignored,
}

impl DispatchOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DispatchOutcome::Accepted { .. })
    }
}

/// Per-operation machine instance: rehydrated from a record, driven, then dropped.
pub struct StateMachine {
    table: Arc<TransitionTable>,
    state: PaymentState,
    interceptors: Vec<Arc<dyn StateChangeInterceptor>>,
}

impl StateMachine {
    /// Starts a machine in the table's initial state.
    pub fn new(table: Arc<TransitionTable>) -> Self {
        let state = table.initial_state();
        Self::rehydrate(table, state)
    }

    /// Starts a machine primed to a persisted state.
    pub fn rehydrate(table: Arc<TransitionTable>, state: PaymentState) -> Self {
        Self {
            table,
            state,
            interceptors: Vec::new(),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn StateChangeInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Dispatches a message and every event its actions send back, depth-first in
    /// emission order, before returning the outcome of the first message.
    pub async fn send_event(&mut self, message: Message) -> Result<DispatchOutcome> {
        let mut pending = Vec::new();
        let outcome = self.apply(message, &mut pending).await?;

        let mut dispatched = 1;
        while let Some(next) = pending.pop() {
            dispatched += 1;
            if dispatched > MAX_CASCADE {
                return Err(PaymentError::CascadeLimitExceeded(MAX_CASCADE));
            }
            self.apply(next, &mut pending).await?;
        }

        Ok(outcome)
    }

    async fn apply(&mut self, message: Message, pending: &mut Vec<Message>) -> Result<DispatchOutcome> {
        let Some(transition) = self.table.lookup(self.state, message.event).cloned() else {
            tracing::debug!(state = %self.state, event = %message.event, "No transition, event ignored");
            return Ok(DispatchOutcome::Ignored);
        };

        if let Some(guard) = transition.guard
            && !guard(&message)
        {
            tracing::debug!(state = %self.state, event = %message.event, "Transition denied by guard");
            return Ok(DispatchOutcome::Denied);
        }

        for interceptor in &self.interceptors {
            interceptor.pre_state_change(transition.target, &message).await?;
        }

        let from = std::mem::replace(&mut self.state, transition.target);
        tracing::info!(
            payment_id = ?message.payment_id,
            event = %message.event,
            %from,
            to = %self.state,
            "State changed"
        );

        if let Some(action) = &transition.action {
            let mut emitter = EventEmitter::default();
            action.execute(&message, &mut emitter).await;
            pending.extend(emitter.into_messages().into_iter().rev());
        }

        Ok(DispatchOutcome::Accepted {
            from,
            to: transition.target,
        })
    }
}
