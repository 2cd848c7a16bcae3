use super::payment::{Payment, PaymentId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable record store keyed by payment id.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn save(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: PaymentId) -> Result<Option<Payment>>;
    async fn get_all(&self) -> Result<Vec<Payment>>;
}

pub type PaymentStoreRef = Arc<dyn PaymentStore>;

/// Which authorization step a decision is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStep {
    PreAuthorization,
    Authorization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Declined,
}

/// Source of approve/decline decisions: a simulator, or a payment-gateway client.
#[async_trait]
pub trait AuthorizationGateway: Send + Sync {
    async fn decide(&self, step: AuthorizationStep, payment_id: PaymentId) -> Result<Decision>;
}

pub type AuthorizationGatewayRef = Arc<dyn AuthorizationGateway>;
