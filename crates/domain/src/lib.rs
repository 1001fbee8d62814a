//! # leadrouter-domain
//!
//! Pure domain model for propagating lead-routing rules into a form
//! console's notification routing settings.
//!
//! ## Responsibilities
//! - Foundational types: form identifiers, error conventions
//! - Define **Rule records** (desired email routing per dealership)
//! - Define **Routing strategies** and the priority-ordered field matchers
//!   that choose between location-based and identifier-based routing
//! - Define **Rule slots** (routing rows in the UI) and the slot plan that
//!   assigns rules to blank slots before creating new ones
//! - Define **Outcomes** per notification, per form, and per run
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod form;
pub mod notification;
pub mod option_match;
pub mod outcome;
pub mod plan;
pub mod routing;
pub mod rule;
pub mod slot;
