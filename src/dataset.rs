//! The table a recipe threads through its steps.
//!
//! A [`Dataset`] is either a plain polars [`DataFrame`] or a grouped view of one. Steps
//! never reach into polars directly for schema questions; they go through the helpers
//! here so selector resolution and validation agree on what a column "is".

use crate::error::{LeavenError, Result};
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Semantic column classes used by type predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Temporal,
    Categorical,
    Nested,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() || dtype.is_decimal() {
            Self::Numeric
        } else if dtype.is_string() {
            Self::Text
        } else if dtype.is_bool() {
            Self::Boolean
        } else if dtype.is_temporal() {
            Self::Temporal
        } else if dtype.is_categorical() || dtype.is_enum() {
            Self::Categorical
        } else {
            Self::Nested
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Temporal => "temporal",
            Self::Categorical => "categorical",
            Self::Nested => "nested",
        }
    }
}

/// Which unmatched rows survive a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinHow {
    #[default]
    Left,
    Right,
    Inner,
    #[serde(alias = "outer")]
    Full,
}

impl JoinHow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Inner => "inner",
            Self::Full => "full",
        }
    }

    fn join_args(self) -> JoinArgs {
        let (how, order) = match self {
            Self::Left => (JoinType::Left, MaintainOrderJoin::Left),
            Self::Right => (JoinType::Right, MaintainOrderJoin::Right),
            Self::Inner => (JoinType::Inner, MaintainOrderJoin::Left),
            Self::Full => (JoinType::Full, MaintainOrderJoin::LeftRight),
        };
        let mut args = JoinArgs::new(how)
            .with_coalesce(JoinCoalesce::CoalesceColumns)
            .with_suffix(Some(RIGHT_SUFFIX.into()));
        args.maintain_order = order;
        args
    }
}

/// Suffix appended to right-hand columns that clash with left-hand names.
pub const RIGHT_SUFFIX: &str = "_y";

/// A frame partitioned by key columns.
///
/// Rows are not physically reordered; consuming steps aggregate or evaluate window
/// expressions over `keys`.
#[derive(Debug, Clone)]
pub struct GroupedFrame {
    frame: DataFrame,
    keys: Vec<String>,
}

impl GroupedFrame {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn key_exprs(&self) -> Vec<Expr> {
        self.keys.iter().map(|k| col(k.as_str())).collect()
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

#[derive(Debug, Clone)]
pub enum Dataset {
    Frame(DataFrame),
    Grouped(GroupedFrame),
}

impl Dataset {
    pub fn frame(&self) -> &DataFrame {
        match self {
            Self::Frame(df) => df,
            Self::Grouped(g) => &g.frame,
        }
    }

    pub fn into_frame(self) -> DataFrame {
        match self {
            Self::Frame(df) => df,
            Self::Grouped(g) => g.frame,
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped(_))
    }

    pub fn group_keys(&self) -> Option<&[String]> {
        match self {
            Self::Frame(_) => None,
            Self::Grouped(g) => Some(&g.keys),
        }
    }

    pub fn height(&self) -> usize {
        self.frame().height()
    }

    pub fn width(&self) -> usize {
        self.frame().width()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame()
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame().get_column_index(name).is_some()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.frame()
            .column(name)
            .ok()
            .map(|c| ColumnKind::of(c.dtype()))
    }

    /// Names containing a match for `pattern`, in schema order.
    pub fn columns_matching(&self, pattern: &Regex) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| pattern.is_match(name))
            .collect()
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.frame()
            .get_columns()
            .iter()
            .filter(|c| ColumnKind::of(c.dtype()) == kind)
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Keep only `names`, in the given order.
    pub fn project(self, names: &[String]) -> Result<Self> {
        self.map_frame(|df| Ok(df.select(names.iter().map(String::as_str))?))
    }

    /// Merge `other` into this frame on `keys`.
    pub fn merge(&self, other: &DataFrame, how: JoinHow, keys: &[String]) -> Result<DataFrame> {
        let on: Vec<&str> = keys.iter().map(String::as_str).collect();
        Ok(self
            .frame()
            .join(other, on.clone(), on, how.join_args(), None)?)
    }

    /// Turn the dataset into a grouped view keyed by `keys`.
    pub fn group_by(self, keys: Vec<String>) -> Result<Self> {
        let missing: Vec<&String> = keys.iter().filter(|k| !self.has_column(k)).collect();
        if !missing.is_empty() {
            return Err(LeavenError::Validation(format!(
                "The following columns are missing: {missing:?}"
            )));
        }
        Ok(Self::Grouped(GroupedFrame {
            frame: self.into_frame(),
            keys,
        }))
    }

    /// Drop the grouping, keeping the rows as they are.
    pub fn ungroup(self) -> DataFrame {
        self.into_frame()
    }

    /// Give every column a new name, position by position. Group keys follow their column.
    pub fn rename_columns(self, names: Vec<String>) -> Result<Self> {
        let renamed = |old: &str| -> Option<String> {
            let idx = self.frame().get_column_index(old)?;
            names.get(idx).cloned()
        };
        let keys: Option<Vec<String>> = self
            .group_keys()
            .map(|keys| keys.iter().filter_map(|k| renamed(k.as_str())).collect());
        let mut frame = self.into_frame();
        frame.set_column_names(names)?;
        Ok(match keys {
            Some(keys) => Self::Grouped(GroupedFrame { frame, keys }),
            None => Self::Frame(frame),
        })
    }

    /// Apply `f` to the underlying frame. A grouped view must keep all of its keys.
    pub fn map_frame<F>(self, f: F) -> Result<Self>
    where
        F: FnOnce(DataFrame) -> Result<DataFrame>,
    {
        match self {
            Self::Frame(df) => Ok(Self::Frame(f(df)?)),
            Self::Grouped(g) => {
                let frame = f(g.frame)?;
                let lost: Vec<&String> = g
                    .keys
                    .iter()
                    .filter(|k| frame.get_column_index(k).is_none())
                    .collect();
                if !lost.is_empty() {
                    return Err(LeavenError::Validation(format!(
                        "Group keys {lost:?} cannot be removed from a grouped view"
                    )));
                }
                Ok(Self::Grouped(GroupedFrame {
                    frame,
                    keys: g.keys,
                }))
            }
        }
    }
}

impl From<DataFrame> for Dataset {
    fn from(df: DataFrame) -> Self {
        Self::Frame(df)
    }
}
