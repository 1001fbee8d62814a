//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the routing engine and the outside world.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod form_surface;
pub mod rule_source;

pub use form_surface::FormSurface;
pub use rule_source::RuleSource;
