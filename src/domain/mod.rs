//! Domain layer: the payment record, the transition table and the machine that runs it.

pub mod actions;
pub mod machine;
pub mod payment;
pub mod ports;
pub mod transition;
