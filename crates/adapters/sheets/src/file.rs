//! Values file rule source, for offline runs against an exported sheet.
//!
//! The file holds the same JSON body the values API returns:
//!
//! ```json
//! { "values": [["DEALERSHIP NAME", "FEED ID", "ADF Email", "Text Email"], ["..."]] }
//! ```

use std::path::PathBuf;

use leadrouter_app::ports::RuleSource;
use leadrouter_domain::error::LeadRouterError;
use leadrouter_domain::rule::RuleRecord;

use crate::error::SheetsError;
use crate::extract::{ValueRange, extract_rules};

/// Reads rules from a JSON values file.
#[derive(Debug, Clone)]
pub struct ValuesFileSource {
    path: PathBuf,
}

impl ValuesFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and decode the value grid.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Io`] or [`SheetsError::Decode`].
    pub async fn load(&self) -> Result<ValueRange, SheetsError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(SheetsError::Io)?;
        let range: ValueRange = serde_json::from_slice(&bytes).map_err(SheetsError::Decode)?;
        tracing::info!(path = %self.path.display(), rows = range.values.len(), "read values file");
        Ok(range)
    }
}

impl RuleSource for ValuesFileSource {
    async fn read_rules(&self) -> Result<Vec<RuleRecord>, LeadRouterError> {
        let range = self.load().await?;
        let records = extract_rules(&range).map_err(SheetsError::from)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn should_read_rules_from_values_file() {
        let file = file_with(
            r#"{"values": [
                ["DEALERSHIP NAME", "FEED ID", "ADF Email", "Text Email"],
                ["Lakeside Ford", "LF-7", "adf@lf.example", "text@lf.example"]
            ]}"#,
        );
        let rules = ValuesFileSource::new(file.path()).read_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].text_email, "text@lf.example");
    }

    #[tokio::test]
    async fn should_fail_on_malformed_file() {
        let file = file_with("{not json");
        let err = ValuesFileSource::new(file.path()).load().await.unwrap_err();
        assert!(matches!(err, SheetsError::Decode(_)));
    }

    #[tokio::test]
    async fn should_fail_on_missing_file() {
        let err = ValuesFileSource::new("/nonexistent/values.json")
            .read_rules()
            .await
            .unwrap_err();
        assert!(matches!(err, LeadRouterError::Source(_)));
    }
}
