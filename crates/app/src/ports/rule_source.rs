//! Rule source port: where the desired routing rules come from.

use std::future::Future;

use leadrouter_domain::error::LeadRouterError;
use leadrouter_domain::rule::RuleRecord;

/// Supplies the validated, ordered list of rule records for a run.
///
/// Implementations fail closed: if any required value is missing in any
/// row they return [`LeadRouterError::Validation`] listing every issue,
/// never a partial list.
pub trait RuleSource {
    /// Read and validate all rule records, preserving source order.
    fn read_rules(&self) -> impl Future<Output = Result<Vec<RuleRecord>, LeadRouterError>> + Send;
}

impl<T: RuleSource + Send + Sync> RuleSource for std::sync::Arc<T> {
    fn read_rules(&self) -> impl Future<Output = Result<Vec<RuleRecord>, LeadRouterError>> + Send {
        (**self).read_rules()
    }
}
