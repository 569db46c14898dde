//! Column-transform steps.

use crate::dataset::Dataset;
use crate::error::{LeavenError, Result};
use crate::selector::{Selector, require_columns};
use crate::step::Operation;
use crate::transformers::Transformer;
use polars::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Apply string transformers in place to every selected column.
#[derive(Debug, Clone)]
pub struct StringTransform {
    selector: Selector,
    transformers: Vec<Transformer>,
}

impl StringTransform {
    pub fn new(selector: impl Into<Selector>, transformers: Vec<Transformer>) -> Self {
        Self {
            selector: selector.into(),
            transformers,
        }
    }
}

impl Operation for StringTransform {
    fn name(&self) -> &'static str {
        "string_transform"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        if let Some(t) = self.transformers.iter().find(|t| !t.is_string()) {
            return Err(LeavenError::Validation(format!(
                "Transformer {} not recognized as a string transformer",
                t.name()
            )));
        }
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let columns = self.selector.resolve(&data);
        data.map_frame(|df| {
            let mut lazy = df.lazy();
            for transformer in &self.transformers {
                let exprs: Vec<Expr> = columns
                    .iter()
                    .map(|c| transformer.expr(c).alias(c.as_str()))
                    .collect();
                lazy = lazy.with_columns(exprs);
            }
            Ok(lazy.collect()?)
        })
    }
}

/// Signature of an inline column function: whole frame plus target name in, new column out.
pub type InlineFn = dyn Fn(&DataFrame, &str) -> Result<Series> + Send + Sync;

/// One transform applied to a `Mutate` target.
#[derive(Clone)]
pub enum ColumnTransform {
    Named(Transformer),
    Inline(Arc<InlineFn>),
}

impl ColumnTransform {
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&DataFrame, &str) -> Result<Series> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(f))
    }

    fn apply(&self, df: DataFrame, target: &str, keys: Option<&[String]>) -> Result<DataFrame> {
        match self {
            Self::Named(t) => t.apply(df, target, keys),
            Self::Inline(f) => {
                let mut df = df;
                let series = f(&df, target)?.with_name(target.into());
                df.with_column(series)?;
                Ok(df)
            }
        }
    }
}

impl fmt::Debug for ColumnTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(t) => f.debug_tuple("Named").field(t).finish(),
            Self::Inline(_) => f.write_str("Inline(<fn>)"),
        }
    }
}

impl From<Transformer> for ColumnTransform {
    fn from(t: Transformer) -> Self {
        Self::Named(t)
    }
}

/// Create or overwrite columns, each from a chain of transforms run in order.
///
/// On a grouped view the group-aware transformers are evaluated per group and the
/// output keeps the grouping.
#[derive(Debug, Clone)]
pub struct Mutate {
    targets: Vec<(String, Vec<ColumnTransform>)>,
}

impl Mutate {
    pub fn new<I, K>(targets: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<ColumnTransform>)>,
        K: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Single target, single transform.
    pub fn column(target: impl Into<String>, transform: impl Into<ColumnTransform>) -> Self {
        Self {
            targets: vec![(target.into(), vec![transform.into()])],
        }
    }
}

impl Operation for Mutate {
    fn name(&self) -> &'static str {
        "mutate"
    }

    fn do_validate(&self, _data: &Dataset) -> Result<()> {
        for (target, transforms) in &self.targets {
            if target.trim().is_empty() {
                return Err(LeavenError::Validation(
                    "Mutate target column names must be non empty strings".to_owned(),
                ));
            }
            if transforms.is_empty() {
                return Err(LeavenError::Validation(format!(
                    "No transforms given for column \"{target}\""
                )));
            }
        }
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let keys = data.group_keys().map(<[String]>::to_vec);
        data.map_frame(|mut df| {
            for (target, transforms) in &self.targets {
                for transform in transforms {
                    df = transform.apply(df, target, keys.as_deref())?;
                }
            }
            Ok(df)
        })
    }
}
