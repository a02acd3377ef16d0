use std::fs;
use std::io::Write;
use std::path::Path;

use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::{delimiter_for, ItemPool};
use csv::{ReaderBuilder, WriterBuilder};

use crate::design::Design;

fn wrap_csv(code: &str, err: csv::Error) -> BwsError {
    BwsError::Serde(ErrorInfo::new(code, "CSV processing failed").with_hint(err.to_string()))
}

/// Loads an item pool from a plain list (one item per line) or a spreadsheet column.
///
/// `.csv` and `.tsv` files require `column`; any other extension is read as a list.
/// List lines are not split on inner whitespace, so a line such as `ice cream`
/// is a single item rather than two. Tools that read whitespace-separated
/// words produce a different pool from the same file.
pub fn load_item_pool(path: &Path, column: Option<&str>) -> Result<ItemPool, BwsError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let is_table = matches!(extension.as_deref(), Some("csv") | Some("tsv"));
    if !is_table {
        let text = fs::read_to_string(path)
            .map_err(|err| BwsError::io("items-read", path.display(), err))?;
        return Ok(ItemPool::new(text.lines()));
    }
    let column = column.ok_or_else(|| {
        BwsError::Serde(
            ErrorInfo::new("items-column-missing", "spreadsheet input needs an item column")
                .with_context("path", path.display().to_string()),
        )
    })?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_path(path)
        .map_err(|err| wrap_csv("items-open", err))?;
    let headers = reader.headers().map_err(|err| wrap_csv("items-header", err))?.clone();
    let position = headers.iter().position(|name| name == column).ok_or_else(|| {
        BwsError::Serde(
            ErrorInfo::new("items-column-unknown", "item column not found in header")
                .with_context("column", column)
                .with_context("header", headers.iter().collect::<Vec<_>>().join(",")),
        )
    })?;
    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| wrap_csv("items-record", err))?;
        if let Some(value) = record.get(position) {
            labels.push(value.to_string());
        }
    }
    Ok(ItemPool::new(labels))
}

/// Writes the design as CSV: header `option1..optionK`, one row per trial.
pub fn write_design_csv<W: Write>(design: &Design, writer: W) -> Result<(), BwsError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    let header: Vec<String> = (1..=design.k).map(|idx| format!("option{idx}")).collect();
    writer
        .write_record(&header)
        .map_err(|err| wrap_csv("design-write-header", err))?;
    for trial in design.trials() {
        writer
            .write_record(trial.options().iter().map(|item| item.as_str()))
            .map_err(|err| wrap_csv("design-write-row", err))?;
    }
    writer
        .flush()
        .map_err(|err| BwsError::io("design-flush", "<design>", err))?;
    Ok(())
}

/// Renders the design CSV into a string.
pub fn design_to_csv_string(design: &Design) -> Result<String, BwsError> {
    let mut buffer = Vec::new();
    write_design_csv(design, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| {
        BwsError::Serde(ErrorInfo::new("design-utf8", "design CSV is not UTF-8").with_hint(err.to_string()))
    })
}
