#![deny(missing_docs)]
#![doc = "Core data types shared by the best-worst scaling design generator and scoring engine."]

use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{BwsError, ErrorInfo};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

/// Field delimiter implied by a file extension: tab for `.tsv`, comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Opaque, case-preserved item identifier (a word, stimulus label or image path).
///
/// Items compare by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(String);

impl Item {
    /// Creates an item from its label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Item {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for Item {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl Borrow<str> for Item {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Ordered collection of unique items a design is drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemPool {
    items: IndexSet<Item>,
}

impl ItemPool {
    /// Builds a pool from raw labels.
    ///
    /// Labels are trimmed, blank labels are dropped and duplicates keep their
    /// first occurrence.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = IndexSet::new();
        let mut duplicates = 0usize;
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            if !items.insert(Item::from(label)) {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::warn!(duplicates, kept = items.len(), "dropped duplicate items from pool");
        }
        Self { items }
    }

    /// Number of unique items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the pool holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `index` in insertion order.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get_index(index)
    }

    /// Returns the insertion index of `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.items.get_index_of(label)
    }

    /// Iterates the items in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Item> + '_ {
        self.items.iter()
    }
}

/// One presentation of `K` distinct items, as produced by a design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trial {
    options: Vec<Item>,
}

impl Trial {
    /// Creates a trial, rejecting groups smaller than two or with repeated items.
    pub fn new(options: Vec<Item>) -> Result<Self, BwsError> {
        check_options(&options).map_err(BwsError::InvalidDesignParameters)?;
        Ok(Self { options })
    }

    /// Items shown in the trial.
    pub fn options(&self) -> &[Item] {
        &self.options
    }

    /// Group size `K`.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always false for a constructed trial; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Returns true when `item` is one of the options.
    pub fn contains(&self, item: &Item) -> bool {
        self.options.contains(item)
    }
}

/// A completed trial: the options shown plus the respondent's best and worst picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTrial {
    options: Vec<Item>,
    best: Item,
    worst: Item,
}

impl ResponseTrial {
    /// Creates a response record.
    ///
    /// Fails with [`BwsError::MalformedTrialRecord`] when `best == worst`, when
    /// either pick is not among the options, or when the options are not a
    /// group of at least two distinct items.
    pub fn new(options: Vec<Item>, best: Item, worst: Item) -> Result<Self, BwsError> {
        check_options(&options).map_err(BwsError::MalformedTrialRecord)?;
        if best == worst {
            return Err(BwsError::MalformedTrialRecord(
                ErrorInfo::new("best-equals-worst", "best and worst name the same item")
                    .with_context("item", best.as_str()),
            ));
        }
        for (role, pick) in [("best", &best), ("worst", &worst)] {
            if !options.contains(pick) {
                return Err(BwsError::MalformedTrialRecord(
                    ErrorInfo::new("choice-not-shown", "choice is not among the trial options")
                        .with_context("role", role)
                        .with_context("item", pick.as_str()),
                ));
            }
        }
        Ok(Self {
            options,
            best,
            worst,
        })
    }

    /// Items shown in the trial.
    pub fn options(&self) -> &[Item] {
        &self.options
    }

    /// Item chosen as best.
    pub fn best(&self) -> &Item {
        &self.best
    }

    /// Item chosen as worst.
    pub fn worst(&self) -> &Item {
        &self.worst
    }
}

fn check_options(options: &[Item]) -> Result<(), ErrorInfo> {
    if options.len() < 2 {
        return Err(ErrorInfo::new("too-few-options", "a trial needs at least two options")
            .with_context("options", options.len().to_string()));
    }
    for (idx, item) in options.iter().enumerate() {
        if options[..idx].contains(item) {
            return Err(ErrorInfo::new("duplicate-option", "an item appears twice in one trial")
                .with_context("item", item.as_str()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(labels: &[&str]) -> Vec<Item> {
        labels.iter().map(|label| Item::from(*label)).collect()
    }

    #[test]
    fn tab_delimiter_follows_tsv_extension() {
        assert_eq!(delimiter_for(Path::new("items.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("ITEMS.TSV")), b'\t');
        assert_eq!(delimiter_for(Path::new("items.csv")), b',');
        assert_eq!(delimiter_for(Path::new("responses")), b',');
    }

    #[test]
    fn pool_keeps_first_occurrence_and_case() {
        let pool = ItemPool::new(["Apple", "apple", " Apple ", "", "pear"]);
        let labels: Vec<&str> = pool.iter().map(Item::as_str).collect();
        assert_eq!(labels, vec!["Apple", "apple", "pear"]);
        assert_eq!(pool.position("pear"), Some(2));
    }

    #[test]
    fn trial_rejects_duplicates() {
        let err = Trial::new(items(&["a", "b", "a"])).unwrap_err();
        assert_eq!(err.info().code, "duplicate-option");
    }

    #[test]
    fn response_requires_choices_among_options() {
        let ok = ResponseTrial::new(items(&["x", "y", "z"]), "x".into(), "y".into());
        assert!(ok.is_ok());
        let err = ResponseTrial::new(items(&["x", "y", "z"]), "w".into(), "y".into()).unwrap_err();
        assert!(matches!(err, BwsError::MalformedTrialRecord(_)));
        assert_eq!(err.info().context.get("role").map(String::as_str), Some("best"));
    }

    #[test]
    fn response_rejects_same_best_and_worst() {
        let err = ResponseTrial::new(items(&["x", "y"]), "x".into(), "x".into()).unwrap_err();
        assert_eq!(err.info().code, "best-equals-worst");
    }
}
