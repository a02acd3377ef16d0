use std::io::Read;
use std::path::Path;

use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::{delimiter_for, Item, ResponseTrial};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One raw response row, addressable by column name.
pub type RawRow = IndexMap<String, String>;

/// Column naming convention for response files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column holding the item chosen as best.
    #[serde(default = "ColumnSpec::default_best")]
    pub best: String,
    /// Column holding the item chosen as worst.
    #[serde(default = "ColumnSpec::default_worst")]
    pub worst: String,
    /// Option columns are `<prefix>1`, `<prefix>2`, ...
    #[serde(default = "ColumnSpec::default_option_prefix")]
    pub option_prefix: String,
}

impl ColumnSpec {
    fn default_best() -> String {
        "best".to_string()
    }

    fn default_worst() -> String {
        "worst".to_string()
    }

    fn default_option_prefix() -> String {
        "option".to_string()
    }

    /// Spec with custom best/worst column names and the default option prefix.
    pub fn new(best: impl Into<String>, worst: impl Into<String>) -> Self {
        Self {
            best: best.into(),
            worst: worst.into(),
            option_prefix: Self::default_option_prefix(),
        }
    }

    /// Slot number of an option column, or `None` for any other column.
    pub fn option_slot(&self, column: &str) -> Option<usize> {
        column
            .strip_prefix(self.option_prefix.as_str())
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            best: Self::default_best(),
            worst: Self::default_worst(),
            option_prefix: Self::default_option_prefix(),
        }
    }
}

/// A row dropped by the parser, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Input the row came from.
    pub source: String,
    /// One-based data row number within the source (header excluded).
    pub row: usize,
    /// Always [`BwsError::MalformedTrialRecord`].
    pub error: BwsError,
}

/// Parsed trials in input order plus the rows that were dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParseReport {
    /// Usable trials.
    pub trials: Vec<ResponseTrial>,
    /// Malformed rows that were skipped.
    pub rejected: Vec<RejectedRow>,
}

impl ParseReport {
    /// Number of malformed rows skipped.
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Appends another report, keeping row order.
    pub fn extend(&mut self, other: ParseReport) {
        self.trials.extend(other.trials);
        self.rejected.extend(other.rejected);
    }
}

/// Converts one raw row into a response trial.
pub fn parse_row(row: &RawRow, columns: &ColumnSpec) -> Result<ResponseTrial, BwsError> {
    let choice = |column: &str, role: &str| -> Result<Item, BwsError> {
        match row.get(column).map(|value| value.trim()) {
            Some(value) if !value.is_empty() => Ok(Item::from(value)),
            _ => Err(BwsError::MalformedTrialRecord(
                ErrorInfo::new(format!("blank-{role}"), format!("{role} choice is missing or blank"))
                    .with_context("column", column),
            )),
        }
    };
    let best = choice(&columns.best, "best")?;
    let worst = choice(&columns.worst, "worst")?;

    let mut slots: Vec<(usize, &str)> = row
        .iter()
        .filter_map(|(name, value)| columns.option_slot(name).map(|slot| (slot, value.trim())))
        .filter(|(_, value)| !value.is_empty())
        .collect();
    slots.sort_by_key(|(slot, _)| *slot);
    let options = slots.into_iter().map(|(_, value)| Item::from(value)).collect();

    ResponseTrial::new(options, best, worst)
}

/// Parses rows in order, skipping malformed ones.
pub fn parse_rows(source: &str, rows: &[RawRow], columns: &ColumnSpec) -> ParseReport {
    let mut report = ParseReport::default();
    for (idx, row) in rows.iter().enumerate() {
        match parse_row(row, columns) {
            Ok(trial) => report.trials.push(trial),
            Err(error) => {
                tracing::warn!(source, row = idx + 1, %error, "skipping malformed response row");
                report.rejected.push(RejectedRow {
                    source: source.to_string(),
                    row: idx + 1,
                    error,
                });
            }
        }
    }
    report
}

fn wrap_csv(code: &str, source: &str, err: csv::Error) -> BwsError {
    BwsError::Serde(
        ErrorInfo::new(code, "CSV processing failed")
            .with_context("source", source)
            .with_hint(err.to_string()),
    )
}

/// Reads delimited text with a header row into raw rows.
pub fn read_rows<R: Read>(source: &str, reader: R, delimiter: u8) -> Result<Vec<RawRow>, BwsError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|err| wrap_csv("responses-header", source, err))?
        .clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| wrap_csv("responses-record", source, err))?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

/// Reads and parses one response file; `.tsv` files are tab separated.
pub fn parse_file(path: &Path, columns: &ColumnSpec) -> Result<ParseReport, BwsError> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|err| BwsError::io("responses-open", &source, err))?;
    let rows = read_rows(&source, file, delimiter_for(path))?;
    if let Some(first) = rows.first() {
        if !first.contains_key(&columns.best) || !first.contains_key(&columns.worst) {
            tracing::warn!(
                source = %source,
                best = %columns.best,
                worst = %columns.worst,
                "response file lacks the configured best/worst columns"
            );
        }
    }
    Ok(parse_rows(&source, &rows, columns))
}

/// Parses several response files and concatenates them in the given order.
pub fn parse_files<P: AsRef<Path>>(paths: &[P], columns: &ColumnSpec) -> Result<ParseReport, BwsError> {
    let mut report = ParseReport::default();
    for path in paths {
        report.extend(parse_file(path.as_ref(), columns)?);
    }
    tracing::debug!(
        files = paths.len(),
        trials = report.trials.len(),
        rejected = report.rejected_count(),
        "responses parsed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn parses_options_in_slot_order() {
        let raw = row(&[
            ("option10", "J"),
            ("best", "X"),
            ("option2", "Y"),
            ("worst", "Y"),
            ("option1", "X"),
            ("participant", "p1"),
        ]);
        let trial = parse_row(&raw, &ColumnSpec::default()).expect("valid row");
        let labels: Vec<&str> = trial.options().iter().map(Item::as_str).collect();
        assert_eq!(labels, vec!["X", "Y", "J"]);
    }

    #[test]
    fn option_slots_need_digits() {
        let spec = ColumnSpec::default();
        assert_eq!(spec.option_slot("option3"), Some(3));
        assert_eq!(spec.option_slot("option"), None);
        assert_eq!(spec.option_slot("optional"), None);
        assert_eq!(spec.option_slot("best"), None);
    }

    #[test]
    fn blank_choices_are_malformed() {
        let raw = row(&[("best", " "), ("worst", "Y"), ("option1", "X"), ("option2", "Y")]);
        let err = parse_row(&raw, &ColumnSpec::default()).unwrap_err();
        assert_eq!(err.info().code, "blank-best");
    }

    #[test]
    fn custom_columns_are_honoured() {
        let raw = row(&[("most", "A"), ("least", "B"), ("option1", "A"), ("option2", "B")]);
        let trial = parse_row(&raw, &ColumnSpec::new("most", "least")).expect("valid row");
        assert_eq!(trial.best().as_str(), "A");
    }
}
