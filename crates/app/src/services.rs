//! Application services: the steps of a routing run.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod outcome_classifier;
pub mod slot_reconciler;
pub mod strategy_selector;
