//! Structural column steps: select, drop, rename, clean names and cast.

use crate::dataset::Dataset;
use crate::error::{LeavenError, Result};
use crate::naming::{NameCase, dedupe_names};
use crate::selector::{Selector, require_columns};
use crate::step::Operation;
use polars::prelude::*;

/// Keep only the selected columns, in selector order.
#[derive(Debug, Clone)]
pub struct SelectColumns {
    selector: Selector,
}

impl SelectColumns {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl Operation for SelectColumns {
    fn name(&self) -> &'static str {
        "select_columns"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let names = self.selector.resolve(&data);
        data.project(&names)
    }
}

#[derive(Debug, Clone)]
pub struct DropColumns {
    selector: Selector,
}

impl DropColumns {
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl Operation for DropColumns {
    fn name(&self) -> &'static str {
        "drop_columns"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        require_columns(data, &self.selector.resolve(data))
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let names = self.selector.resolve(&data);
        data.map_frame(|df| Ok(df.drop_many(names.iter().map(String::as_str))))
    }
}

/// Rename columns with an `old → new` mapping. Absent old names are ignored.
#[derive(Debug, Clone)]
pub struct RenameColumns {
    mapping: Vec<(String, String)>,
}

impl RenameColumns {
    pub fn new<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Operation for RenameColumns {
    fn name(&self) -> &'static str {
        "rename_columns"
    }

    fn do_validate(&self, _data: &Dataset) -> Result<()> {
        for (old, new) in &self.mapping {
            if old.trim().is_empty() {
                return Err(LeavenError::Validation(format!(
                    "Old column name \"{old}\" should be a non empty string"
                )));
            }
            if new.trim().is_empty() {
                return Err(LeavenError::Validation(format!(
                    "New column name \"{new}\" should be a non empty string"
                )));
            }
        }
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let names: Vec<String> = data
            .column_names()
            .into_iter()
            .map(|name| {
                self.mapping
                    .iter()
                    .find(|(old, _)| *old == name)
                    .map_or(name, |(_, new)| new.clone())
            })
            .collect();
        data.rename_columns(names)
    }
}

/// Normalize every column name to one case. Collisions get `_1`, `_2`, ... suffixes.
#[derive(Debug, Clone, Default)]
pub struct CleanColumnNames {
    case: NameCase,
}

impl CleanColumnNames {
    pub fn new(case: NameCase) -> Self {
        Self { case }
    }
}

impl Operation for CleanColumnNames {
    fn name(&self) -> &'static str {
        "clean_column_names"
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let names = dedupe_names(
            data.column_names()
                .iter()
                .map(|name| self.case.apply(name))
                .collect(),
        );
        data.rename_columns(names)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CastTarget {
    String,
    Boolean,
    Int64,
    Int32,
    Float64,
    Float32,
    Datetime,
    Category,
}

impl CastTarget {
    fn dtype(self) -> DataType {
        match self {
            Self::String => DataType::String,
            Self::Boolean => DataType::Boolean,
            Self::Int64 => DataType::Int64,
            Self::Int32 => DataType::Int32,
            Self::Float64 => DataType::Float64,
            Self::Float32 => DataType::Float32,
            Self::Datetime => DataType::Datetime(TimeUnit::Microseconds, None),
            Self::Category => DataType::Categorical(None, Default::default()),
        }
    }
}

/// Cast columns to named types, e.g. `{"age": "integer", "joined": "date"}`.
#[derive(Debug, Clone)]
pub struct CastColumns {
    mapping: Vec<(String, String)>,
}

impl CastColumns {
    const TYPE_ALIASES: &'static [(&'static str, CastTarget)] = &[
        ("string", CastTarget::String),
        ("str", CastTarget::String),
        ("boolean", CastTarget::Boolean),
        ("bool", CastTarget::Boolean),
        ("integer", CastTarget::Int64),
        ("int64", CastTarget::Int64),
        ("int32", CastTarget::Int32),
        ("float", CastTarget::Float64),
        ("float64", CastTarget::Float64),
        ("float32", CastTarget::Float32),
        ("datetime64", CastTarget::Datetime),
        ("datetime", CastTarget::Datetime),
        ("date", CastTarget::Datetime),
        ("category", CastTarget::Category),
    ];

    pub fn new<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Type names accepted in the mapping.
    pub fn type_names() -> Vec<&'static str> {
        Self::TYPE_ALIASES.iter().map(|(name, _)| *name).collect()
    }

    fn target(type_name: &str) -> Option<CastTarget> {
        Self::TYPE_ALIASES
            .iter()
            .find(|(name, _)| *name == type_name)
            .map(|(_, target)| *target)
    }
}

impl Operation for CastColumns {
    fn name(&self) -> &'static str {
        "cast_columns"
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        for (column, type_name) in &self.mapping {
            if !data.has_column(column) {
                return Err(LeavenError::Validation(format!(
                    "Column {column} not found on the DataFrame"
                )));
            }
            if Self::target(type_name).is_none() {
                return Err(LeavenError::Validation(format!(
                    "Data type {type_name} not available. Choose from: {:?}",
                    Self::type_names()
                )));
            }
        }
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let exprs: Vec<Expr> = self
            .mapping
            .iter()
            .filter_map(|(column, type_name)| {
                Self::target(type_name)
                    .map(|target| col(column.as_str()).strict_cast(target.dtype()))
            })
            .collect();
        data.map_frame(|df| Ok(df.lazy().with_columns(exprs).collect()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Predicate;
    use crate::step::Step;
    use crate::steps::GroupBy;

    fn shows() -> Result<Dataset> {
        Ok(df!(
            "Title" => ["Lost", "Dark"],
            "Seasons" => [6i64, 3],
            "Rating" => ["8.3", "8.7"],
        )?
        .into())
    }

    #[test]
    fn test_select_and_drop() -> Result<()> {
        let out = Step::new(SelectColumns::new(["Rating", "Title"])).bake(shows()?)?;
        assert_eq!(out.column_names(), vec!["Rating", "Title"]);

        let out = Step::new(DropColumns::new(Predicate::AllNumeric)).bake(shows()?)?;
        assert_eq!(out.column_names(), vec!["Title", "Rating"]);
        Ok(())
    }

    #[test]
    fn test_select_missing_column() -> Result<()> {
        let err = Step::new(SelectColumns::new("Year")).bake(shows()?);
        assert!(matches!(err, Err(LeavenError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_rename_ignores_unknown_columns() -> Result<()> {
        let step = Step::new(RenameColumns::new([("Title", "name"), ("Year", "year")]));
        let out = step.bake(shows()?)?;
        assert_eq!(out.column_names(), vec!["name", "Seasons", "Rating"]);

        let empty = Step::new(RenameColumns::new([("Title", " ")]));
        assert!(matches!(empty.bake(shows()?), Err(LeavenError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_rename_group_key_keeps_grouping() -> Result<()> {
        let grouped = Step::new(GroupBy::new("Title")).bake(shows()?)?;
        let out = Step::new(RenameColumns::new([("Title", "name")])).bake(grouped)?;
        assert_eq!(out.group_keys(), Some(&["name".to_owned()][..]));

        let err = Step::new(DropColumns::new("name")).bake(out);
        assert!(matches!(err, Err(LeavenError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_clean_column_names() -> Result<()> {
        let df = df!(
            "Total Sales" => [1i64],
            "clientId" => [2i64],
            "total_sales" => [3i64],
        )?;
        let out = Step::new(CleanColumnNames::default()).bake(df.into())?;
        assert_eq!(
            out.column_names(),
            vec!["total_sales", "client_id", "total_sales_1"]
        );
        Ok(())
    }

    #[test]
    fn test_cast_columns() -> Result<()> {
        let step = Step::new(CastColumns::new([("Rating", "float"), ("Seasons", "int32")]));
        let out = step.bake(shows()?)?;
        assert_eq!(out.frame().column("Rating")?.dtype(), &DataType::Float64);
        assert_eq!(out.frame().column("Seasons")?.dtype(), &DataType::Int32);

        let bad_type = Step::new(CastColumns::new([("Rating", "decimal")]));
        assert!(matches!(bad_type.bake(shows()?), Err(LeavenError::Validation(_))));

        let bad_column = Step::new(CastColumns::new([("Year", "int64")]));
        assert!(matches!(bad_column.bake(shows()?), Err(LeavenError::Validation(_))));
        Ok(())
    }
}
