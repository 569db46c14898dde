//! Column selectors.
//!
//! A [`Selector`] is an ordered list of literal names and [`Predicate`]s. Resolution
//! happens against whatever dataset a step is currently looking at, so the same selector
//! can yield different columns before and after an upstream rename or cast.
//!
//! ```
//! use leaven::dataset::Dataset;
//! use leaven::selector::{Predicate, Selector, SelectorItem};
//! use polars::prelude::*;
//!
//! let df = df!("seasons" => [1i64, 2], "title" => ["a", "b"], "rating" => [7.5f64, 8.0])?;
//! let ds = Dataset::from(df);
//!
//! let selector = Selector::new(vec![Predicate::AllNumeric.into(), SelectorItem::from("title")]);
//! assert_eq!(selector.resolve(&ds), vec!["seasons", "rating", "title"]);
//! # Ok::<(), leaven::error::LeavenError>(())
//! ```

use crate::dataset::{ColumnKind, Dataset};
use crate::error::{LeavenError, Result};
use regex::Regex;

/// Schema-driven column predicate.
#[derive(Debug, Clone)]
pub enum Predicate {
    AllColumns,
    AllNumeric,
    AllText,
    AllBoolean,
    AllTemporal,
    AllCategorical,
    /// Names containing a match for the pattern anywhere.
    AllMatching(Regex),
}

impl Predicate {
    pub fn matching(pattern: &str) -> Result<Self> {
        Ok(Self::AllMatching(Regex::new(pattern)?))
    }

    pub fn resolve(&self, dataset: &Dataset) -> Vec<String> {
        match self {
            Self::AllColumns => dataset.column_names(),
            Self::AllNumeric => dataset.columns_of_kind(ColumnKind::Numeric),
            Self::AllText => dataset.columns_of_kind(ColumnKind::Text),
            Self::AllBoolean => dataset.columns_of_kind(ColumnKind::Boolean),
            Self::AllTemporal => dataset.columns_of_kind(ColumnKind::Temporal),
            Self::AllCategorical => dataset.columns_of_kind(ColumnKind::Categorical),
            Self::AllMatching(re) => dataset.columns_matching(re),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SelectorItem {
    Name(String),
    Predicate(Predicate),
}

impl From<&str> for SelectorItem {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SelectorItem {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Predicate> for SelectorItem {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selector {
    items: Vec<SelectorItem>,
}

impl Selector {
    pub fn new(items: Vec<SelectorItem>) -> Self {
        Self { items }
    }

    /// Every column, in schema order.
    pub fn all() -> Self {
        Predicate::AllColumns.into()
    }

    /// Columns whose name contains a match for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns a construction error if `pattern` is not a valid regex.
    pub fn matching(pattern: &str) -> Result<Self> {
        Ok(Predicate::matching(pattern)?.into())
    }

    pub fn items(&self) -> &[SelectorItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve to concrete column names.
    ///
    /// Never fails: literal names pass through whether or not they exist, and overlapping
    /// items produce repeated names. Existence is checked by the consuming step.
    pub fn resolve(&self, dataset: &Dataset) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|item| match item {
                SelectorItem::Name(name) => vec![name.clone()],
                SelectorItem::Predicate(p) => p.resolve(dataset),
            })
            .collect()
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::new(vec![name.into()])
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::new(vec![name.into()])
    }
}

impl From<Vec<&str>> for Selector {
    fn from(names: Vec<&str>) -> Self {
        Self::new(names.into_iter().map(SelectorItem::from).collect())
    }
}

impl From<Vec<String>> for Selector {
    fn from(names: Vec<String>) -> Self {
        Self::new(names.into_iter().map(SelectorItem::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selector {
    fn from(names: [&str; N]) -> Self {
        Self::new(names.into_iter().map(SelectorItem::from).collect())
    }
}

impl From<Predicate> for Selector {
    fn from(predicate: Predicate) -> Self {
        Self::new(vec![predicate.into()])
    }
}

impl From<Vec<SelectorItem>> for Selector {
    fn from(items: Vec<SelectorItem>) -> Self {
        Self::new(items)
    }
}

/// Fail with a validation error naming every entry of `names` absent from `dataset`.
pub fn require_columns(dataset: &Dataset, names: &[String]) -> Result<()> {
    let missing: Vec<&String> = names.iter().filter(|n| !dataset.has_column(n)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LeavenError::Validation(format!(
            "The following columns are missing: {missing:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn shows() -> Result<Dataset> {
        let df = df!(
            "title" => ["Lost", "Dark", "Fargo"],
            "seasons" => [6i64, 3, 5],
            "rating" => [8.3f64, 8.7, 8.9],
            "finished" => [true, true, false],
        )?;
        Ok(df.into())
    }

    #[test]
    fn test_literal_names_pass_through() -> Result<()> {
        let ds = shows()?;
        let selector = Selector::from(vec!["rating", "missing"]);
        assert_eq!(selector.resolve(&ds), vec!["rating", "missing"]);
        Ok(())
    }

    #[test]
    fn test_predicates_follow_schema_order() -> Result<()> {
        let ds = shows()?;
        assert_eq!(
            Selector::from(Predicate::AllNumeric).resolve(&ds),
            vec!["seasons", "rating"]
        );
        assert_eq!(Selector::from(Predicate::AllText).resolve(&ds), vec!["title"]);
        assert_eq!(Selector::from(Predicate::AllBoolean).resolve(&ds), vec!["finished"]);
        assert!(Selector::from(Predicate::AllTemporal).resolve(&ds).is_empty());
        assert_eq!(Selector::all().resolve(&ds).len(), 4);
        Ok(())
    }

    #[test]
    fn test_mixed_selector_is_deterministic() -> Result<()> {
        let ds = shows()?;
        let selector = Selector::new(vec![Predicate::AllNumeric.into(), "title".into()]);

        let first = selector.resolve(&ds);
        let second = selector.resolve(&ds);
        assert_eq!(first, vec!["seasons", "rating", "title"]);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_overlap_keeps_duplicates() -> Result<()> {
        let ds = shows()?;
        let selector = Selector::new(vec!["seasons".into(), Predicate::AllNumeric.into()]);
        assert_eq!(selector.resolve(&ds), vec!["seasons", "seasons", "rating"]);
        Ok(())
    }

    #[test]
    fn test_matching() -> Result<()> {
        let ds = shows()?;
        assert_eq!(Selector::matching("^(ti|ra)")?.resolve(&ds), vec!["title", "rating"]);
        assert!(matches!(
            Selector::matching("("),
            Err(LeavenError::Construction(_))
        ));
        Ok(())
    }

    #[test]
    fn test_require_columns() -> Result<()> {
        let ds = shows()?;
        require_columns(&ds, &["title".to_owned()])?;

        let err = require_columns(&ds, &["title".to_owned(), "year".to_owned()]);
        match err {
            Err(LeavenError::Validation(msg)) => {
                assert_eq!(msg, "The following columns are missing: [\"year\"]");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        Ok(())
    }
}
