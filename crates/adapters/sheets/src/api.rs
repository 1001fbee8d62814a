//! Google Sheets values API rule source.

use std::time::Duration;

use reqwest::{Client, Url};

use leadrouter_app::ports::RuleSource;
use leadrouter_domain::error::LeadRouterError;
use leadrouter_domain::rule::RuleRecord;

use crate::error::SheetsError;
use crate::extract::{ValueRange, extract_rules};

/// Public endpoint of the Sheets API.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads one range of a spreadsheet with a read-only OAuth access token.
#[derive(Debug, Clone)]
pub struct SheetsApiSource {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    access_token: String,
}

impl SheetsApiSource {
    /// Create a source for `range` of the given spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Network`] if the HTTP client cannot be built.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SheetsError::Network)?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            access_token: access_token.into(),
        })
    }

    /// Point the source at another endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn values_url(&self) -> Result<Url, SheetsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| SheetsError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| SheetsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                self.range.as_str(),
            ]);
        Ok(url)
    }

    /// Fetch the raw value grid.
    ///
    /// # Errors
    ///
    /// Returns a [`SheetsError`] on network failures, non-success statuses
    /// and undecodable bodies.
    #[tracing::instrument(skip_all, fields(spreadsheet = %self.spreadsheet_id, range = %self.range))]
    pub async fn fetch(&self) -> Result<ValueRange, SheetsError> {
        let url = self.values_url()?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(SheetsError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "sheets API returned an error");
            return Err(SheetsError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(SheetsError::Network)?;
        let range: ValueRange = serde_json::from_slice(&body).map_err(SheetsError::Decode)?;
        tracing::info!(rows = range.values.len(), "read rows from sheet");
        Ok(range)
    }
}

impl RuleSource for SheetsApiSource {
    async fn read_rules(&self) -> Result<Vec<RuleRecord>, LeadRouterError> {
        let range = self.fetch().await?;
        let records = extract_rules(&range).map_err(SheetsError::from)?;
        Ok(records)
    }
}
