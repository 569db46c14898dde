//! Missing-value steps.
//!
//! `MeanImpute` and `MedianImpute` learn one fill value per column in `prepare` and reuse
//! it on every bake. `ConstantImpute` and `ReplaceNa` fill with values known up front.

use crate::dataset::{ColumnKind, Dataset};
use crate::error::{LeavenError, Result};
use crate::selector::{Selector, require_columns};
use crate::step::Operation;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A literal used to fill nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FillValue {
    fn expr(&self) -> Expr {
        match self {
            Self::Bool(v) => lit(*v),
            Self::Int(v) => lit(*v),
            Self::Float(v) => lit(*v),
            Self::Str(v) => lit(v.clone()),
        }
    }
}

impl From<bool> for FillValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FillValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FillValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FillValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for FillValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

fn fill_fitted(data: Dataset, fitted: &[(String, Option<f64>)]) -> Result<Dataset> {
    let names: Vec<String> = fitted.iter().map(|(name, _)| name.clone()).collect();
    require_columns(&data, &names)?;

    let exprs: Vec<Expr> = fitted
        .iter()
        .filter_map(|(name, value)| {
            value.map(|v| {
                col(name.as_str())
                    .cast(DataType::Float64)
                    .fill_null(lit(v))
            })
        })
        .collect();
    data.map_frame(|df| Ok(df.lazy().with_columns(exprs).collect()?))
}

/// Fill nulls with the column mean learned at preparation.
#[derive(Debug, Clone)]
pub struct MeanImpute {
    selector: Selector,
    means: Vec<(String, Option<f64>)>,
}

impl MeanImpute {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            means: Vec::new(),
        }
    }

    /// Fitted `(column, mean)` pairs. `None` for a column with no values.
    pub fn means(&self) -> &[(String, Option<f64>)] {
        &self.means
    }
}

impl Operation for MeanImpute {
    fn name(&self) -> &'static str {
        "mean_impute"
    }

    fn needs_preparation(&self) -> bool {
        true
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_prepare(&mut self, data: &Dataset) -> Result<()> {
        let mut means = Vec::new();
        for name in self.selector.resolve(data) {
            let column = data.frame().column(&name)?;
            let kind = ColumnKind::of(column.dtype());
            if kind != ColumnKind::Numeric {
                return Err(LeavenError::Other(format!(
                    "Cannot compute the mean of {} column '{name}' with type {}",
                    kind.as_str(),
                    column.dtype()
                )));
            }
            let mean = column.as_materialized_series().mean();
            means.push((name, mean));
        }
        self.means = means;
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        fill_fitted(data, &self.means)
    }
}

/// Fill nulls with the column median learned at preparation.
#[derive(Debug, Clone)]
pub struct MedianImpute {
    selector: Selector,
    medians: Vec<(String, Option<f64>)>,
}

impl MedianImpute {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            medians: Vec::new(),
        }
    }

    pub fn medians(&self) -> &[(String, Option<f64>)] {
        &self.medians
    }
}

impl Operation for MedianImpute {
    fn name(&self) -> &'static str {
        "median_impute"
    }

    fn needs_preparation(&self) -> bool {
        true
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_prepare(&mut self, data: &Dataset) -> Result<()> {
        let mut medians = Vec::new();
        for name in self.selector.resolve(data) {
            let column = data.frame().column(&name)?;
            if ColumnKind::of(column.dtype()) != ColumnKind::Numeric {
                return Err(LeavenError::preparation_failure(format!(
                    "Error calculating the median on: {name}"
                )));
            }
            let median = column.as_materialized_series().median();
            medians.push((name, median));
        }
        self.medians = medians;
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        fill_fitted(data, &self.medians)
    }
}

/// Fill nulls in the selected columns with one value.
#[derive(Debug, Clone)]
pub struct ConstantImpute {
    selector: Selector,
    value: FillValue,
}

impl ConstantImpute {
    pub fn new(selector: impl Into<Selector>, value: impl Into<FillValue>) -> Self {
        Self {
            selector: selector.into(),
            value: value.into(),
        }
    }
}

impl Operation for ConstantImpute {
    fn name(&self) -> &'static str {
        "constant_impute"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let exprs: Vec<Expr> = self
            .selector
            .resolve(&data)
            .iter()
            .map(|name| col(name.as_str()).fill_null(self.value.expr()))
            .collect();
        data.map_frame(|df| Ok(df.lazy().with_columns(exprs).collect()?))
    }
}

/// Fill nulls per column, e.g. `{"rating": 0.0, "title": "unknown"}`.
#[derive(Debug, Clone)]
pub struct ReplaceNa {
    mapping: Vec<(String, FillValue)>,
}

impl ReplaceNa {
    pub fn new<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FillValue>,
    {
        Self {
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn single(column: impl Into<String>, value: impl Into<FillValue>) -> Self {
        Self::new([(column.into(), value.into())])
    }
}

impl Operation for ReplaceNa {
    fn name(&self) -> &'static str {
        "replace_na"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        let names: Vec<String> = self.mapping.iter().map(|(name, _)| name.clone()).collect();
        require_columns(data, &names)
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let exprs: Vec<Expr> = self
            .mapping
            .iter()
            .map(|(name, value)| col(name.as_str()).fill_null(value.expr()))
            .collect();
        data.map_frame(|df| Ok(df.lazy().with_columns(exprs).collect()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;

    fn floats(ds: &Dataset, name: &str) -> Result<Vec<Option<f64>>> {
        Ok(ds.frame().column(name)?.f64()?.into_iter().collect())
    }

    #[test]
    fn test_mean_impute_uses_fitted_mean() -> Result<()> {
        let train = df!("age" => [Some(20i64), Some(31), Some(65), None, Some(45), Some(23), None])?;
        let mut step = Step::new(MeanImpute::new("age"));
        step.prepare(&train.into())?;

        let fresh = df!("age" => [None, Some(10i64)])?;
        let out = step.bake(fresh.into())?;
        let values = floats(&out, "age")?;
        assert!((values[0].unwrap_or_default() - 36.8).abs() < 1e-9);
        assert_eq!(values[1], Some(10.0));
        Ok(())
    }

    #[test]
    fn test_mean_impute_requires_prepare() -> Result<()> {
        let df = df!("age" => [Some(1i64), None])?;
        let err = Step::new(MeanImpute::new("age")).bake(df.into());
        assert!(matches!(err, Err(LeavenError::Bake { cause: None, .. })));
        Ok(())
    }

    #[test]
    fn test_mean_impute_rejects_text() -> Result<()> {
        let df = df!("name" => ["a", "b"])?;
        let err = Step::new(MeanImpute::new("name")).prepare(&df.into()).map(|_| ());
        assert!(
            matches!(&err, Err(LeavenError::Other(msg)) if msg.contains("text column 'name'")),
            "got {err:?}"
        );
        Ok(())
    }

    #[test]
    fn test_median_impute() -> Result<()> {
        let train = df!("n" => [Some(1.0f64), Some(9.0), None, Some(3.0)])?;
        let mut step = Step::new(MedianImpute::new("n"));
        step.prepare(&train.clone().into())?;
        assert_eq!(floats(&step.bake(train.into())?, "n")?[2], Some(3.0));

        let text = df!("n" => ["x"])?;
        let err = Step::new(MedianImpute::new("n")).prepare(&text.into()).map(|_| ());
        assert!(
            matches!(err, Err(LeavenError::Preparation { message, .. }) if message == "Error calculating the median on: n")
        );
        Ok(())
    }

    #[test]
    fn test_constant_and_replace_na() -> Result<()> {
        let df = df!(
            "title" => [Some("Lost"), None],
            "rating" => [None, Some(8.7f64)],
        )?;

        let out = Step::new(ConstantImpute::new("rating", 0.0)).bake(df.clone().into())?;
        assert_eq!(floats(&out, "rating")?, vec![Some(0.0), Some(8.7)]);

        let out = Step::new(ReplaceNa::single("title", "unknown")).bake(df.into())?;
        let titles: Vec<Option<&str>> = out.frame().column("title")?.str()?.into_iter().collect();
        assert_eq!(titles, vec![Some("Lost"), Some("unknown")]);
        Ok(())
    }

    #[test]
    fn test_fill_value_from_json() -> Result<()> {
        let values: Vec<FillValue> = serde_json::from_str(r#"[true, 3, 2.5, "x"]"#)?;
        assert_eq!(
            values,
            vec![
                FillValue::Bool(true),
                FillValue::Int(3),
                FillValue::Float(2.5),
                FillValue::Str("x".to_owned())
            ]
        );
        Ok(())
    }
}
