mod common;

use common::{FailingStore, FixedGateway};
use paysm::application::workflow::PaymentService;
use paysm::domain::payment::{Amount, PaymentState};
use paysm::domain::ports::PaymentStore;
use paysm::error::PaymentError;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_persistence_failure_aborts_and_restores() {
    let store = Arc::new(FailingStore::failing_on(PaymentState::PreAuth));
    let service = PaymentService::new(store.clone(), Arc::new(FixedGateway::approving())).unwrap();

    let payment = service
        .create_payment(Amount::new(dec!(100)).unwrap())
        .await
        .unwrap();

    let err = service.pre_authorize(payment.id).await.unwrap_err();
    assert!(matches!(err, PaymentError::Persistence(_)));
    assert!(err.is_retryable());

    let stored = store.get(payment.id).await.unwrap().unwrap();
    assert_eq!(stored, payment);
}

#[tokio::test]
async fn test_failure_in_later_step_keeps_earlier_operations() {
    let store = Arc::new(FailingStore::failing_on(PaymentState::Auth));
    let service = PaymentService::new(store.clone(), Arc::new(FixedGateway::approving())).unwrap();

    let payment = service
        .create_payment(Amount::new(dec!(100)).unwrap())
        .await
        .unwrap();
    service.pre_authorize(payment.id).await.unwrap();

    assert!(service.authorize(payment.id).await.is_err());
    assert_eq!(
        store.get(payment.id).await.unwrap().unwrap().state,
        PaymentState::PreAuth
    );
}
