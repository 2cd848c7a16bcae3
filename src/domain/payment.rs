use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier assigned to a payment when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PaymentId {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| PaymentError::ValidationError(format!("Invalid payment id '{}': {}", s, e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    New,
    PreAuth,
    PreAuthError,
    Auth,
    AuthError,
}

impl PaymentState {
    pub const ALL: [PaymentState; 5] = [
        PaymentState::New,
        PaymentState::PreAuth,
        PaymentState::PreAuthError,
        PaymentState::Auth,
        PaymentState::AuthError,
    ];
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentState::New => "NEW",
            PaymentState::PreAuth => "PRE_AUTH",
            PaymentState::PreAuthError => "PRE_AUTH_ERROR",
            PaymentState::Auth => "AUTH",
            PaymentState::AuthError => "AUTH_ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentEvent {
    PreAuthorize,
    PreAuthApproved,
    PreAuthDeclined,
    Authorize,
    AuthApproved,
    AuthDeclined,
}

impl PaymentEvent {
    pub const ALL: [PaymentEvent; 6] = [
        PaymentEvent::PreAuthorize,
        PaymentEvent::PreAuthApproved,
        PaymentEvent::PreAuthDeclined,
        PaymentEvent::Authorize,
        PaymentEvent::AuthApproved,
        PaymentEvent::AuthDeclined,
    ];
}

impl fmt::Display for PaymentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentEvent::PreAuthorize => "PRE_AUTHORIZE",
            PaymentEvent::PreAuthApproved => "PRE_AUTH_APPROVED",
            PaymentEvent::PreAuthDeclined => "PRE_AUTH_DECLINED",
            PaymentEvent::Authorize => "AUTHORIZE",
            PaymentEvent::AuthApproved => "AUTH_APPROVED",
            PaymentEvent::AuthDeclined => "AUTH_DECLINED",
        };
        f.write_str(name)
    }
}

/// A non-negative monetary amount.
///
/// Wraps `rust_decimal::Decimal` so a negative value can never reach a stored record.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}

/// The durable payment record.
///
/// Only the store owns it; a state machine holds a transient copy of `state`
/// for the duration of one workflow operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub state: PaymentState,
    pub amount: Amount,
}

impl Payment {
    /// Creates a record in the initial `NEW` state with a freshly assigned id.
    pub fn new(amount: Amount) -> Self {
        Self {
            id: PaymentId::new(),
            state: PaymentState::New,
            amount,
        }
    }
}
