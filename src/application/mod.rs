//! Application layer orchestrating payment workflows.
//!
//! `PaymentService` rehydrates a fresh `StateMachine` from the durable record for
//! every operation, binds it to the store through `PersistStateChangeInterceptor`
//! and serializes operations per payment id.

pub mod interceptor;
pub mod locks;
pub mod workflow;
