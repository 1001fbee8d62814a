//! # leadrouter-app
//!
//! Application layer: the notification-routing reconciliation engine and
//! its **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `RuleSource`: validated, ordered rule records
//!   - `FormSurface`: form discovery, navigation, slot read/write, save
//! - Provide the engine steps as services:
//!   - `StrategySelector`: location vs dealer-id routing per form
//!   - `SlotReconciler`: fill blanks, create slots, write, verify, save
//!   - `OutcomeClassifier`: per-form outcome and run buckets
//! - Drive a whole run strictly sequentially (`RoutingRun`)
//!
//! ## Dependency rule
//! Depends on `leadrouter-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod options;
pub mod ports;
pub mod routing_run;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
