//! # leadrouter-adapter-sheets
//!
//! Rule source adapters for the dealership feed sheet.
//!
//! ## Provided sources
//!
//! | Source | Reads from |
//! |--------|------------|
//! | [`SheetsApiSource`] | Google Sheets values API, bearer token auth |
//! | [`ValuesFileSource`] | A JSON file in the values API response format |
//!
//! Both validate the whole sheet before returning anything: the header must
//! carry `DEALERSHIP NAME`, `FEED ID`, `ADF Email` and `Text Email`, and
//! every data cell in those columns must be non-blank.
//!
//! ## Dependency rule
//!
//! Depends on `leadrouter-app` (port traits) and `leadrouter-domain` only.

mod api;
mod error;
mod extract;
mod file;

pub use api::{DEFAULT_BASE_URL, SheetsApiSource};
pub use error::SheetsError;
pub use extract::{ValueRange, extract_rules, sheet_id_from_url};
pub use file::ValuesFileSource;
