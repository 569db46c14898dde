//! Fitted encoding and column-pruning steps.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::selector::{Selector, require_columns};
use crate::step::Operation;
use polars::prelude::*;
use std::collections::HashMap;

/// Learned categories of one column, in code order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinalLevels {
    column: String,
    levels: Vec<String>,
}

impl OrdinalLevels {
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Distinct values rendered as text; the position is the code.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    fn encode(&self, column: &Column) -> Result<Column> {
        let codes: HashMap<&str, i32> = self
            .levels
            .iter()
            .zip(0i32..)
            .map(|(level, code)| (level.as_str(), code))
            .collect();
        let text = column.cast(&DataType::String)?;
        let encoded: Int32Chunked = text
            .str()?
            .into_iter()
            .map(|v| v.and_then(|v| codes.get(v).copied()))
            .collect();
        Ok(encoded.with_name(column.name().clone()).into_column())
    }
}

/// Replace values with their rank among the distinct values seen at preparation.
///
/// Codes run `0..n` in sorted value order and are written as `Int32`. Nulls and values not
/// seen during preparation become null.
#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    selector: Selector,
    fitted: Vec<OrdinalLevels>,
}

impl OrdinalEncoder {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            fitted: Vec::new(),
        }
    }

    pub fn fitted(&self) -> &[OrdinalLevels] {
        &self.fitted
    }
}

impl Operation for OrdinalEncoder {
    fn name(&self) -> &'static str {
        "ordinal_encoder"
    }

    fn needs_preparation(&self) -> bool {
        true
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_prepare(&mut self, data: &Dataset) -> Result<()> {
        let mut fitted = Vec::new();
        for name in self.selector.resolve(data) {
            let distinct = data
                .frame()
                .column(&name)?
                .as_materialized_series()
                .drop_nulls()
                .unique()?
                .sort(SortOptions::default())?;
            let levels = distinct
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .flatten()
                .map(str::to_owned)
                .collect();
            fitted.push(OrdinalLevels {
                column: name,
                levels,
            });
        }
        self.fitted = fitted;
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let names: Vec<String> = self.fitted.iter().map(|f| f.column.clone()).collect();
        require_columns(&data, &names)?;
        data.map_frame(|mut df| {
            for levels in &self.fitted {
                let encoded = levels.encode(df.column(&levels.column)?)?;
                df.with_column(encoded)?;
            }
            Ok(df)
        })
    }
}

/// Drop columns holding a single distinct value.
///
/// Null is a value of its own by default, so `[null, "a"]` has two values and is kept.
/// With `na_omit` nulls are ignored when counting and `[1, null, 1]` counts as constant.
#[derive(Debug, Clone)]
pub struct DropZeroVarianceColumns {
    selector: Selector,
    na_omit: bool,
    removals: Vec<String>,
}

impl Default for DropZeroVarianceColumns {
    fn default() -> Self {
        Self::new(Selector::all())
    }
}

impl DropZeroVarianceColumns {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            na_omit: false,
            removals: Vec::new(),
        }
    }

    pub fn na_omit(mut self, na_omit: bool) -> Self {
        self.na_omit = na_omit;
        self
    }

    /// Columns marked for removal at preparation.
    pub fn removals(&self) -> &[String] {
        &self.removals
    }
}

impl Operation for DropZeroVarianceColumns {
    fn name(&self) -> &'static str {
        "drop_zero_variance_columns"
    }

    fn needs_preparation(&self) -> bool {
        true
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_prepare(&mut self, data: &Dataset) -> Result<()> {
        let mut removals = Vec::new();
        for name in self.selector.resolve(data) {
            let column = data.frame().column(&name)?;
            let distinct = if self.na_omit {
                column.drop_nulls().n_unique()?
            } else {
                column.n_unique()?
            };
            if distinct == 1 && !removals.contains(&name) {
                removals.push(name);
            }
        }
        tracing::debug!(columns = ?removals, "Zero variance columns");
        self.removals = removals;
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        data.map_frame(|df| Ok(df.drop_many(self.removals.iter().map(String::as_str))))
    }
}
