//! Run-wide options resolved once before automation starts.

/// Choices that apply to every form in a run.
///
/// Resolved at startup (configuration, flag, or a single prompt) and passed
/// to the services by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Configure the text notification on location-based forms as well.
    pub text_for_location_forms: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            text_for_location_forms: true,
        }
    }
}
