//! Turning a sheet's raw value grid into validated rule records.

use serde::Deserialize;
use serde_json::Value;

use leadrouter_domain::error::{SourceValidationError, ValidationIssue};
use leadrouter_domain::rule::{RuleColumn, RuleRecord};

/// Body of a Sheets `values.get` response, also used as the values file
/// format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    /// Rows, header first. Trailing empty cells are omitted by the API.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Extract the spreadsheet id from a sharing URL, or return the input when
/// it is already a bare id.
#[must_use]
pub fn sheet_id_from_url(input: &str) -> &str {
    let input = input.trim();
    let Some((_, rest)) = input.split_once("/d/") else {
        return input;
    };
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    if end == 0 { input } else { &rest[..end] }
}

/// Validate the grid and build one record per data row, in sheet order.
///
/// The first row is the header and must contain every required column.
/// Every problem is collected before failing so the operator sees the full
/// list at once. Data rows are numbered from 2, as in the sheet.
///
/// # Errors
///
/// Returns a [`SourceValidationError`] listing every missing column or
/// empty required cell.
pub fn extract_rules(range: &ValueRange) -> Result<Vec<RuleRecord>, SourceValidationError> {
    let Some((header, rows)) = range.values.split_first() else {
        tracing::warn!("sheet contains no rows");
        return Ok(Vec::new());
    };

    let header: Vec<String> = header.iter().map(cell_text).collect();
    let mut positions = Vec::with_capacity(RuleColumn::ALL.len());
    let mut issues = Vec::new();
    for column in RuleColumn::ALL {
        match header.iter().position(|name| name.trim() == column.header()) {
            Some(position) => positions.push((column, position)),
            None => issues.push(ValidationIssue::MissingColumn {
                column: column.header().to_string(),
            }),
        }
    }
    if !issues.is_empty() {
        return Err(SourceValidationError::new(issues));
    }

    let mut records = Vec::with_capacity(rows.len());
    for (offset, row) in rows.iter().enumerate() {
        let builder = positions.iter().fold(
            RuleRecord::builder().row(offset + 2),
            |builder, (column, position)| {
                let value = row.get(*position).map(cell_text).unwrap_or_default();
                builder.column(*column, value)
            },
        );
        match builder.build() {
            Ok(record) => records.push(record),
            Err(err) => issues.extend(err.issues),
        }
    }

    if issues.is_empty() {
        tracing::debug!(count = records.len(), "extracted rule records");
        Ok(records)
    } else {
        for issue in &issues {
            tracing::error!(%issue, "invalid rule source value");
        }
        Err(SourceValidationError::new(issues))
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(value: serde_json::Value) -> ValueRange {
        serde_json::from_value(json!({ "values": value })).unwrap()
    }

    #[test]
    fn should_extract_id_from_sharing_url() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=0";
        assert_eq!(sheet_id_from_url(url), "1AbC-d_9");
    }

    #[test]
    fn should_return_bare_id_unchanged() {
        assert_eq!(sheet_id_from_url("  1AbC-d_9 "), "1AbC-d_9");
    }

    #[test]
    fn should_build_records_in_sheet_order() {
        let range = grid(json!([
            ["Notes", "DEALERSHIP NAME", "FEED ID", "ADF Email", "Text Email"],
            ["", "Main Street Motors", "MSM-1", "adf@msm.example", "text@msm.example"],
            ["x", " Lakeside Ford ", 42, "adf@lf.example", "text@lf.example"],
        ]));
        let records = extract_rules(&range).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].dealership_name, "Main Street Motors");
        assert_eq!(records[1].dealership_name, "Lakeside Ford");
        assert_eq!(records[1].feed_id, "42");
    }

    #[test]
    fn should_report_every_missing_column() {
        let range = grid(json!([["DEALERSHIP NAME", "ADF Email"]]));
        let err = extract_rules(&range).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                ValidationIssue::MissingColumn {
                    column: "FEED ID".to_string()
                },
                ValidationIssue::MissingColumn {
                    column: "Text Email".to_string()
                },
            ]
        );
    }

    #[test]
    fn should_report_all_empty_cells_with_sheet_row_numbers() {
        let range = grid(json!([
            ["DEALERSHIP NAME", "FEED ID", "ADF Email", "Text Email"],
            ["A", "1", "a@x.example", "ta@x.example"],
            ["B", "  ", "b@x.example", "tb@x.example"],
            ["C", "3", "c@x.example"],
        ]));
        let err = extract_rules(&range).unwrap_err();
        assert_eq!(
            err.issues,
            vec![
                ValidationIssue::EmptyCell {
                    row: 3,
                    column: "FEED ID".to_string()
                },
                ValidationIssue::EmptyCell {
                    row: 4,
                    column: "Text Email".to_string()
                },
            ]
        );
    }

    #[test]
    fn should_return_no_records_for_header_only_sheet() {
        let range = grid(json!([["DEALERSHIP NAME", "FEED ID", "ADF Email", "Text Email"]]));
        assert!(extract_rules(&range).unwrap().is_empty());
    }

    #[test]
    fn should_return_no_records_for_empty_sheet() {
        assert!(extract_rules(&ValueRange::default()).unwrap().is_empty());
    }
}
