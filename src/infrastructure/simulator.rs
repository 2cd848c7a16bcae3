use crate::domain::payment::PaymentId;
use crate::domain::ports::{AuthorizationGateway, AuthorizationStep, Decision};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rand::Rng;

/// Share of requests approved when no rate is configured.
pub const DEFAULT_APPROVAL_RATE: f64 = 0.8;

/// Approves each request at random with a fixed probability.
///
/// Stands in for a payment-gateway client.
#[derive(Debug, Clone, Copy)]
pub struct RandomAuthorizationGateway {
    approval_rate: f64,
}

impl RandomAuthorizationGateway {
    pub fn new(approval_rate: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&approval_rate) {
            Ok(Self { approval_rate })
        } else {
            Err(PaymentError::ValidationError(format!(
                "Approval rate must be within 0.0..=1.0, got {}",
                approval_rate
            )))
        }
    }

    pub fn approval_rate(&self) -> f64 {
        self.approval_rate
    }
}

impl Default for RandomAuthorizationGateway {
    fn default() -> Self {
        Self {
            approval_rate: DEFAULT_APPROVAL_RATE,
        }
    }
}

#[async_trait]
impl AuthorizationGateway for RandomAuthorizationGateway {
    async fn decide(&self, step: AuthorizationStep, payment_id: PaymentId) -> Result<Decision> {
        let approved = rand::thread_rng().gen_bool(self.approval_rate);
        tracing::debug!(%payment_id, ?step, approved, "Simulated authorization");
        Ok(if approved {
            Decision::Approved
        } else {
            Decision::Declined
        })
    }
}
