//! Guards and actions of the payment authorization flow, and the table wiring them.

use super::payment::{PaymentEvent, PaymentState};
use super::ports::{AuthorizationGatewayRef, AuthorizationStep, Decision};
use super::transition::{Action, EventEmitter, Message, Transition, TransitionTable};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Only messages that name a payment may trigger a side-effecting step.
pub fn payment_id_guard(message: &Message) -> bool {
    message.payment_id.is_some()
}

/// Asks the gateway for a decision and sends exactly one of the step's outcome events.
pub struct AuthorizationAction {
    step: AuthorizationStep,
    gateway: AuthorizationGatewayRef,
}

impl AuthorizationAction {
    pub fn new(step: AuthorizationStep, gateway: AuthorizationGatewayRef) -> Self {
        Self { step, gateway }
    }

    fn outcome_event(&self, decision: Decision) -> PaymentEvent {
        match (self.step, decision) {
            (AuthorizationStep::PreAuthorization, Decision::Approved) => {
                PaymentEvent::PreAuthApproved
            }
            (AuthorizationStep::PreAuthorization, Decision::Declined) => {
                PaymentEvent::PreAuthDeclined
            }
            (AuthorizationStep::Authorization, Decision::Approved) => PaymentEvent::AuthApproved,
            (AuthorizationStep::Authorization, Decision::Declined) => PaymentEvent::AuthDeclined,
        }
    }
}

#[async_trait]
impl Action for AuthorizationAction {
    async fn execute(&self, message: &Message, emitter: &mut EventEmitter) {
        let decision = match message.payment_id {
            Some(payment_id) => match self.gateway.decide(self.step, payment_id).await {
                Ok(decision) => decision,
                Err(e) => {
                    tracing::warn!(%payment_id, step = ?self.step, error = %e, "Authorization failed, declining");
                    Decision::Declined
                }
            },
            None => Decision::Declined,
        };

        tracing::info!(payment_id = ?message.payment_id, step = ?self.step, ?decision, "Authorization decided");
        emitter.send(message.follow_up(self.outcome_event(decision)));
    }
}

/// The two-stage (pre-authorization, then authorization) payment flow.
pub fn payment_transitions(gateway: AuthorizationGatewayRef) -> Result<TransitionTable> {
    use PaymentEvent::*;
    use PaymentState::*;

    let pre_auth_action = Arc::new(AuthorizationAction::new(
        AuthorizationStep::PreAuthorization,
        gateway.clone(),
    ));
    let auth_action = Arc::new(AuthorizationAction::new(
        AuthorizationStep::Authorization,
        gateway,
    ));

    TransitionTable::builder(New)
        .transition(
            Transition::new(New, PreAuthorize, New)
                .guard(payment_id_guard)
                .action(pre_auth_action),
        )
        .transition(Transition::new(New, PreAuthApproved, PreAuth))
        .transition(Transition::new(New, PreAuthDeclined, PreAuthError))
        .transition(Transition::new(PreAuth, Authorize, PreAuth).action(auth_action))
        .transition(Transition::new(PreAuth, AuthApproved, Auth))
        .transition(Transition::new(PreAuth, AuthDeclined, AuthError))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentId;
    use crate::domain::ports::AuthorizationGateway;
    use crate::error::PaymentError;

    struct Unreachable;

    #[async_trait]
    impl AuthorizationGateway for Unreachable {
        async fn decide(&self, _: AuthorizationStep, _: PaymentId) -> Result<Decision> {
            Err(PaymentError::Gateway("connection refused".to_string()))
        }
    }

    struct Approve;

    #[async_trait]
    impl AuthorizationGateway for Approve {
        async fn decide(&self, _: AuthorizationStep, _: PaymentId) -> Result<Decision> {
            Ok(Decision::Approved)
        }
    }

    #[test]
    fn test_payment_table_shape() {
        let table = payment_transitions(Arc::new(Approve)).unwrap();

        assert_eq!(table.initial_state(), PaymentState::New);
        assert_eq!(table.transitions().count(), 6);

        let mut terminal = table.terminal_states();
        terminal.sort_by_key(|s| s.to_string());
        assert_eq!(
            terminal,
            vec![
                PaymentState::Auth,
                PaymentState::AuthError,
                PaymentState::PreAuthError
            ]
        );

        // Authorization outcomes mean nothing before pre-authorization.
        assert!(table.lookup(PaymentState::New, PaymentEvent::AuthApproved).is_none());
        assert!(table.lookup(PaymentState::New, PaymentEvent::AuthDeclined).is_none());

        let pre_authorize = table
            .lookup(PaymentState::New, PaymentEvent::PreAuthorize)
            .unwrap();
        assert!(pre_authorize.guard.is_some());
        assert!(pre_authorize.action.is_some());
        assert_eq!(pre_authorize.target, PaymentState::New);
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let table = payment_transitions(Arc::new(Approve)).unwrap();

        for state in PaymentState::ALL {
            for event in PaymentEvent::ALL {
                let matching = table
                    .transitions()
                    .filter(|t| t.source == state && t.event == event)
                    .count();
                assert!(matching <= 1);
                assert_eq!(table.lookup(state, event).is_some(), matching == 1);
            }
        }
    }

    #[test]
    fn test_guard_requires_payment_id() {
        let bare = Message::new(PaymentEvent::PreAuthorize);
        assert!(!payment_id_guard(&bare));
        assert!(payment_id_guard(&bare.with_payment_id(PaymentId::new())));
    }

    #[tokio::test]
    async fn test_gateway_failure_declines() {
        let action = AuthorizationAction::new(AuthorizationStep::Authorization, Arc::new(Unreachable));
        let id = PaymentId::new();
        let mut emitter = EventEmitter::default();

        action
            .execute(&Message::new(PaymentEvent::Authorize).with_payment_id(id), &mut emitter)
            .await;

        let emitted = emitter.into_messages();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].event, PaymentEvent::AuthDeclined);
        assert_eq!(emitted[0].payment_id, Some(id));
    }

    #[tokio::test]
    async fn test_approval_emits_single_event() {
        let action =
            AuthorizationAction::new(AuthorizationStep::PreAuthorization, Arc::new(Approve));
        let mut emitter = EventEmitter::default();

        action
            .execute(
                &Message::new(PaymentEvent::PreAuthorize).with_payment_id(PaymentId::new()),
                &mut emitter,
            )
            .await;

        let emitted = emitter.into_messages();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].event, PaymentEvent::PreAuthApproved);
    }
}
