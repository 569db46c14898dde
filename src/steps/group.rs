//! Grouping and per-group summaries.

use crate::aggregations::Aggregation;
use crate::dataset::Dataset;
use crate::error::{LeavenError, Result};
use crate::selector::{Selector, require_columns};
use crate::step::Operation;
use polars::prelude::*;

/// Turn the dataset into a grouped view keyed by the selected columns.
#[derive(Debug, Clone)]
pub struct GroupBy {
    selector: Selector,
}

impl GroupBy {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl Operation for GroupBy {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        let keys = self.selector.resolve(data);
        if keys.is_empty() {
            return Err(LeavenError::Validation(
                "At least one grouping column is required".to_owned(),
            ));
        }
        require_columns(data, &keys)
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let keys = self.selector.resolve(&data);
        data.group_by(keys)
    }
}

/// One row per group with the requested aggregations, sorted by the group keys.
#[derive(Debug, Clone)]
pub struct Summarize {
    aggregations: Vec<(String, Aggregation)>,
}

impl Summarize {
    pub fn new<I, K>(aggregations: I) -> Self
    where
        I: IntoIterator<Item = (K, Aggregation)>,
        K: Into<String>,
    {
        Self {
            aggregations: aggregations
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        }
    }
}

impl Operation for Summarize {
    fn name(&self) -> &'static str {
        "summarize"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        if !data.is_grouped() {
            return Err(LeavenError::Validation(
                "This step must be executed after a GroupBy step".to_owned(),
            ));
        }
        let columns: Vec<String> = self
            .aggregations
            .iter()
            .map(|(_, agg)| agg.column().to_owned())
            .collect();
        require_columns(data, &columns)
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let Dataset::Grouped(grouped) = data else {
            return Err(LeavenError::Validation(
                "This step must be executed after a GroupBy step".to_owned(),
            ));
        };
        let keys = grouped.key_exprs();
        let aggs: Vec<Expr> = self
            .aggregations
            .iter()
            .map(|(output, agg)| agg.expr(output))
            .collect();
        let key_names: Vec<PlSmallStr> = grouped.keys().iter().map(|k| k.as_str().into()).collect();

        let summary = grouped
            .into_frame()
            .lazy()
            .group_by(keys)
            .agg(aggs)
            .sort(key_names, SortMultipleOptions::default().with_nulls_last(true))
            .collect()?;
        Ok(Dataset::Frame(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    fn sales() -> Result<Dataset> {
        Ok(df!(
            "client" => ["b", "a", "b", "a", "a"],
            "amount" => [Some(10.0f64), Some(1.0), Some(30.0), None, Some(5.0)],
        )?
        .into())
    }

    #[test]
    fn test_group_then_summarize() -> Result<()> {
        let grouped = Step::new(GroupBy::new("client")).bake(sales()?)?;
        assert_eq!(grouped.group_keys(), Some(&["client".to_owned()][..]));

        let step = Step::new(Summarize::new([
            ("total", Aggregation::sum("amount")),
            ("rows", Aggregation::count("amount")),
            ("distinct", Aggregation::count_distinct("amount")),
            ("top", Aggregation::max("amount")),
        ]));
        let out = step.bake(grouped)?;
        assert!(!out.is_grouped());
        assert_eq!(out.column_names(), vec!["client", "total", "rows", "distinct", "top"]);

        let clients: Vec<Option<&str>> = out.frame().column("client")?.str()?.into_iter().collect();
        assert_eq!(clients, vec![Some("a"), Some("b")]);
        let total: Vec<Option<f64>> = out.frame().column("total")?.f64()?.into_iter().collect();
        assert_eq!(total, vec![Some(6.0), Some(40.0)]);
        let rows: Vec<Option<i64>> = out.frame().column("rows")?.i64()?.into_iter().collect();
        assert_eq!(rows, vec![Some(3), Some(2)]);
        let distinct: Vec<Option<i64>> =
            out.frame().column("distinct")?.i64()?.into_iter().collect();
        assert_eq!(distinct, vec![Some(2), Some(2)]);
        Ok(())
    }

    #[test]
    fn test_summarize_requires_grouped_view() -> Result<()> {
        let step = Step::new(Summarize::new([("total", Aggregation::sum("amount"))]));
        assert!(matches!(step.bake(sales()?), Err(LeavenError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_summarize_missing_column() -> Result<()> {
        let grouped = sales()?.group_by(vec!["client".to_owned()])?;
        let step = Step::new(Summarize::new([("total", Aggregation::mean("price"))]));
        assert!(matches!(step.bake(grouped), Err(LeavenError::Validation(_))));
        Ok(())
    }
}
