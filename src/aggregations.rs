//! Per-group aggregations for `Summarize`.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Mean,
    Median,
    Sum,
    /// Number of rows in the group, nulls included
    Count,
    /// Distinct non-null values
    CountDistinct,
    Max,
    Min,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    #[serde(rename = "fn")]
    kind: AggregationKind,
    column: String,
}

impl Aggregation {
    pub fn new(kind: AggregationKind, column: impl Into<String>) -> Self {
        Self {
            kind,
            column: column.into(),
        }
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::Mean, column)
    }

    pub fn median(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::Median, column)
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::Sum, column)
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::Count, column)
    }

    pub fn count_distinct(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::CountDistinct, column)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::Max, column)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::new(AggregationKind::Min, column)
    }

    pub fn kind(&self) -> AggregationKind {
        self.kind
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Aggregation expression named `output`.
    pub fn expr(&self, output: &str) -> Expr {
        let input = col(self.column.as_str());
        let agg = match self.kind {
            AggregationKind::Mean => input.mean(),
            AggregationKind::Median => input.median(),
            AggregationKind::Sum => input.sum(),
            AggregationKind::Count => input.len().cast(DataType::Int64),
            AggregationKind::CountDistinct => input.drop_nulls().n_unique().cast(DataType::Int64),
            AggregationKind::Max => input.max(),
            AggregationKind::Min => input.min(),
        };
        agg.alias(output)
    }
}
