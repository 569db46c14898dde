//! Row steps: sort, filter and de-duplicate.

use crate::dataset::Dataset;
use crate::error::{LeavenError, Result};
use crate::selector::{Selector, require_columns};
use crate::step::Operation;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable sort on the selected columns. Nulls go last.
#[derive(Debug, Clone)]
pub struct SortRows {
    selector: Selector,
    ascending: bool,
}

impl SortRows {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            ascending: true,
        }
    }

    pub fn descending(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            ascending: false,
        }
    }
}

impl Operation for SortRows {
    fn name(&self) -> &'static str {
        "sort_rows"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let by = self.selector.resolve(&data);
        let options = SortMultipleOptions::default()
            .with_order_descending(!self.ascending)
            .with_nulls_last(true)
            .with_maintain_order(true);
        data.map_frame(|df| Ok(df.sort(by, options)?))
    }
}

/// Keep rows matching a SQL boolean expression, e.g. `seasons > 3 AND title <> 'Lost'`.
#[derive(Debug, Clone)]
pub struct FilterRows {
    expression: String,
}

impl FilterRows {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    fn predicate(&self) -> Result<Expr> {
        polars::sql::sql_expr(&self.expression).map_err(|e| {
            LeavenError::Validation(format!(
                "Invalid filter expression '{}': {e}",
                self.expression
            ))
        })
    }
}

impl Operation for FilterRows {
    fn name(&self) -> &'static str {
        "filter_rows"
    }

    fn do_validate(&self, _data: &Dataset) -> Result<()> {
        if self.expression.trim().is_empty() {
            return Err(LeavenError::Validation(
                "The expression must be a non empty string".to_owned(),
            ));
        }
        self.predicate().map(|_| ())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let predicate = self.predicate()?;
        data.map_frame(|df| Ok(df.lazy().filter(predicate).collect()?))
    }
}

/// Which occurrence of a duplicated row survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    #[default]
    First,
    Last,
    /// Drop every row that has a duplicate
    None,
}

impl From<Keep> for UniqueKeepStrategy {
    fn from(keep: Keep) -> Self {
        match keep {
            Keep::First => Self::First,
            Keep::Last => Self::Last,
            Keep::None => Self::None,
        }
    }
}

/// Drop rows duplicated on the selected columns (all columns by default).
#[derive(Debug, Clone, Default)]
pub struct DropDuplicateRows {
    selector: Option<Selector>,
    keep: Keep,
}

impl DropDuplicateRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(selector: impl Into<Selector>) -> Self {
        Self {
            selector: Some(selector.into()),
            keep: Keep::First,
        }
    }

    pub fn keep(mut self, keep: Keep) -> Self {
        self.keep = keep;
        self
    }
}

impl Operation for DropDuplicateRows {
    fn name(&self) -> &'static str {
        "drop_duplicate_rows"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        match &self.selector {
            Some(selector) => require_columns(data, &selector.resolve(data)),
            None => Ok(()),
        }
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let subset = self.selector.as_ref().map(|s| s.resolve(&data));
        let keep = self.keep.into();
        data.map_frame(|df| Ok(df.unique_stable(subset.as_deref(), keep, None)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    fn ids(ds: &Dataset, name: &str) -> Result<Vec<Option<i64>>> {
        Ok(ds.frame().column(name)?.i64()?.into_iter().collect())
    }

    #[test]
    fn test_drop_duplicates_keep_first() -> Result<()> {
        let df = df!(
            "id" => [1i64, 7, 7, 4, 7, 2],
            "row" => [0i64, 1, 2, 3, 4, 5],
        )?;
        let out = Step::new(DropDuplicateRows::on("id")).bake(df.into())?;

        assert_eq!(out.height(), 4);
        assert_eq!(ids(&out, "id")?, vec![Some(1), Some(7), Some(4), Some(2)]);
        assert_eq!(ids(&out, "row")?, vec![Some(0), Some(1), Some(3), Some(5)]);
        Ok(())
    }

    #[test]
    fn test_drop_duplicates_keep_none() -> Result<()> {
        let df = df!("id" => [1i64, 7, 7, 4, 7, 2])?;
        let out = Step::new(DropDuplicateRows::new().keep(Keep::None)).bake(df.into())?;
        assert_eq!(ids(&out, "id")?, vec![Some(1), Some(4), Some(2)]);
        Ok(())
    }

    #[test]
    fn test_sort_rows() -> Result<()> {
        let df = df!("n" => [Some(3i64), None, Some(1), Some(2)])?;

        let out = Step::new(SortRows::new("n")).bake(df.clone().into())?;
        assert_eq!(ids(&out, "n")?, vec![Some(1), Some(2), Some(3), None]);

        let out = Step::new(SortRows::descending("n")).bake(df.into())?;
        assert_eq!(ids(&out, "n")?, vec![Some(3), Some(2), Some(1), None]);
        Ok(())
    }

    #[test]
    fn test_filter_rows() -> Result<()> {
        let df = df!(
            "title" => ["Lost", "Dark", "Fargo"],
            "seasons" => [6i64, 3, 5],
        )?;
        let out = Step::new(FilterRows::new("seasons > 4")).bake(df.into())?;
        assert_eq!(ids(&out, "seasons")?, vec![Some(6), Some(5)]);
        Ok(())
    }

    #[test]
    fn test_filter_rejects_empty_expression() -> Result<()> {
        let df = df!("seasons" => [1i64])?;
        let err = Step::new(FilterRows::new("  ")).bake(df.into());
        assert!(matches!(err, Err(LeavenError::Validation(_))));
        Ok(())
    }
}
