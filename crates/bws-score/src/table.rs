use std::io::Write;
use std::path::Path;

use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::Item;
use serde::{Deserialize, Serialize};

use crate::methods::MethodName;

/// Rendering of an undefined score.
pub const UNDEFINED_CELL: &str = "NA";

/// Scores for every observed item under every requested method.
///
/// Rows follow the order in which items were first seen in the responses;
/// columns follow the order in which methods were first requested. A cell
/// is `NaN` when its method has no qualifying observations for that item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    methods: Vec<MethodName>,
    items: Vec<Item>,
    /// Row-major, `items.len() * methods.len()` cells.
    values: Vec<f64>,
}

impl ScoreTable {
    pub(crate) fn from_columns(
        items: Vec<Item>,
        methods: Vec<MethodName>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        let mut values = Vec::with_capacity(items.len() * methods.len());
        for row in 0..items.len() {
            values.extend(columns.iter().map(|column| column[row]));
        }
        Self {
            methods,
            items,
            values,
        }
    }

    /// Column headers after `Item`.
    pub fn methods(&self) -> &[MethodName] {
        &self.methods
    }

    /// Row labels.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    fn method_index(&self, method: &str) -> Option<usize> {
        self.methods.iter().position(|name| name.as_str() == method)
    }

    /// Score of `item` under `method`, if both are present.
    pub fn get(&self, item: &str, method: &str) -> Option<f64> {
        let row = self.items.iter().position(|candidate| candidate.as_str() == item)?;
        let col = self.method_index(method)?;
        Some(self.values[row * self.methods.len() + col])
    }

    /// Every item's score under `method`, in row order.
    pub fn column(&self, method: &str) -> Option<Vec<f64>> {
        let col = self.method_index(method)?;
        Some(
            self.values
                .chunks(self.methods.len())
                .map(|row| row[col])
                .collect(),
        )
    }

    /// Rows as `(item, scores)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&Item, &[f64])> + '_ {
        self.items
            .iter()
            .zip(self.values.chunks(self.methods.len().max(1)))
    }

    /// Cells whose method could not score the item.
    pub fn undefined_cells(&self) -> Vec<(&Item, &MethodName)> {
        self.rows()
            .flat_map(|(item, row)| {
                row.iter()
                    .zip(&self.methods)
                    .filter(|(value, _)| !value.is_finite())
                    .map(move |(_, method)| (item, method))
            })
            .collect()
    }

    /// Writes `Item,<method...>` CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), BwsError> {
        let mut csv = csv::Writer::from_writer(writer);
        let header = std::iter::once("Item").chain(self.methods.iter().map(MethodName::as_str));
        csv.write_record(header).map_err(csv_error)?;
        for (item, row) in self.rows() {
            let record = std::iter::once(item.as_str().to_string()).chain(row.iter().map(|value| {
                if value.is_finite() {
                    value.to_string()
                } else {
                    UNDEFINED_CELL.to_string()
                }
            }));
            csv.write_record(record).map_err(csv_error)?;
        }
        csv.flush()
            .map_err(|err| BwsError::io("score-write", "score table", err))
    }

    /// Writes the CSV rendering to `path`.
    pub fn write_csv_file(&self, path: &Path) -> Result<(), BwsError> {
        let file = std::fs::File::create(path)
            .map_err(|err| BwsError::io("score-write", path.display(), err))?;
        self.write_csv(file)
    }

    /// CSV rendering as a string.
    pub fn to_csv_string(&self) -> Result<String, BwsError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| {
            BwsError::Serde(ErrorInfo::new("score-utf8", "score table is not valid UTF-8").with_hint(err.to_string()))
        })
    }
}

fn csv_error(err: csv::Error) -> BwsError {
    BwsError::Serde(ErrorInfo::new("score-csv", "failed to render score table").with_hint(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ScoreTable {
        ScoreTable::from_columns(
            vec![Item::from("a"), Item::from("b")],
            vec![MethodName::from("Best"), MethodName::from("Value")],
            vec![vec![2.0, 0.0], vec![0.75, f64::NAN]],
        )
    }

    #[test]
    fn cells_are_addressable_by_name() {
        let table = table();
        assert_eq!(table.get("a", "Value"), Some(0.75));
        assert_eq!(table.get("b", "Best"), Some(0.0));
        assert_eq!(table.get("c", "Best"), None);
        assert_eq!(table.column("Best"), Some(vec![2.0, 0.0]));
    }

    #[test]
    fn undefined_cells_render_as_na() {
        let table = table();
        let undefined = table.undefined_cells();
        assert_eq!(undefined.len(), 1);
        assert_eq!(undefined[0].0.as_str(), "b");
        let csv = table.to_csv_string().expect("csv");
        assert_eq!(csv, "Item,Best,Value\na,2,0.75\nb,0,NA\n");
    }
}
