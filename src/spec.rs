//! JSON recipe definitions.
//!
//! A [`RecipeSpec`] describes the steps of a recipe as data, so recipes can live in files
//! next to the datasets they clean:
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "name": "tidy shows",
//!   "steps": [
//!     {"op": "clean_column_names"},
//!     {"op": "drop_duplicate_rows", "columns": "title", "keep": "last"},
//!     {"op": "mean_impute", "columns": {"predicate": "all_numeric"}},
//!     {"op": "filter_rows", "expression": "seasons > 1", "role": "train"}
//!   ]
//! }
//! ```
//!
//! Steps built from closures or in-memory frames (`Custom`, inline `Mutate` functions,
//! `Join`) have no JSON form.

use crate::aggregations::Aggregation;
use crate::error::{LeavenError, Result};
use crate::naming::NameCase;
use crate::recipe::Recipe;
use crate::selector::{Predicate, Selector, SelectorItem};
use crate::step::Step;
use crate::steps::{
    CastColumns, CleanColumnNames, ColumnTransform, ConstantImpute, DropColumns,
    DropDuplicateRows, DropZeroVarianceColumns, FillValue, FilterRows, GroupBy, Keep,
    MeanImpute, MedianImpute, Mutate, OrdinalEncoder, RenameColumns, ReplaceNa,
    SelectColumns, SortRows, StringTransform, Summarize,
};
use crate::transformers::Transformer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current recipe spec version
pub const SPEC_VERSION: &str = "0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum PredicateSpec {
    AllColumns,
    AllNumeric,
    AllText,
    AllBoolean,
    AllTemporal,
    AllCategorical,
    AllMatching { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorItemSpec {
    Name(String),
    Predicate(PredicateSpec),
}

/// A column name, a predicate object, or a list mixing both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    One(SelectorItemSpec),
    Many(Vec<SelectorItemSpec>),
}

impl SelectorSpec {
    fn build(&self) -> Result<Selector> {
        let items = match self {
            Self::One(item) => vec![item.build()?],
            Self::Many(items) => items
                .iter()
                .map(SelectorItemSpec::build)
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(Selector::new(items))
    }
}

impl SelectorItemSpec {
    fn build(&self) -> Result<SelectorItem> {
        let predicate = match self {
            Self::Name(name) => return Ok(SelectorItem::Name(name.clone())),
            Self::Predicate(PredicateSpec::AllColumns) => Predicate::AllColumns,
            Self::Predicate(PredicateSpec::AllNumeric) => Predicate::AllNumeric,
            Self::Predicate(PredicateSpec::AllText) => Predicate::AllText,
            Self::Predicate(PredicateSpec::AllBoolean) => Predicate::AllBoolean,
            Self::Predicate(PredicateSpec::AllTemporal) => Predicate::AllTemporal,
            Self::Predicate(PredicateSpec::AllCategorical) => Predicate::AllCategorical,
            Self::Predicate(PredicateSpec::AllMatching { pattern }) => {
                Predicate::matching(pattern)?
            }
        };
        Ok(SelectorItem::Predicate(predicate))
    }
}

/// One `Summarize` output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAggregation {
    pub name: String,
    #[serde(flatten)]
    pub aggregation: Aggregation,
}

/// One `Mutate` target and the transformers applied to it, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutateTarget {
    pub name: String,
    pub transformers: Vec<Transformer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpSpec {
    SelectColumns {
        columns: SelectorSpec,
    },
    DropColumns {
        columns: SelectorSpec,
    },
    RenameColumns {
        mapping: BTreeMap<String, String>,
    },
    CleanColumnNames {
        #[serde(default)]
        case: NameCase,
    },
    CastColumns {
        mapping: BTreeMap<String, String>,
    },
    SortRows {
        columns: SelectorSpec,
        #[serde(default = "default_true")]
        ascending: bool,
    },
    FilterRows {
        expression: String,
    },
    DropDuplicateRows {
        #[serde(default)]
        columns: Option<SelectorSpec>,
        #[serde(default)]
        keep: Keep,
    },
    MeanImpute {
        columns: SelectorSpec,
    },
    MedianImpute {
        columns: SelectorSpec,
    },
    ConstantImpute {
        columns: SelectorSpec,
        value: FillValue,
    },
    ReplaceNa {
        mapping: BTreeMap<String, FillValue>,
    },
    OrdinalEncoder {
        columns: SelectorSpec,
    },
    DropZeroVarianceColumns {
        #[serde(default)]
        columns: Option<SelectorSpec>,
        #[serde(default)]
        na_omit: bool,
    },
    StringTransform {
        columns: SelectorSpec,
        transformers: Vec<Transformer>,
    },
    Mutate {
        columns: Vec<MutateTarget>,
    },
    GroupBy {
        columns: SelectorSpec,
    },
    Summarize {
        aggregations: Vec<NamedAggregation>,
    },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(flatten)]
    pub op: OpSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<OpSpec> for StepSpec {
    fn from(op: OpSpec) -> Self {
        Self { op, role: None }
    }
}

impl OpSpec {
    fn build(&self) -> Result<Step> {
        let step = match self {
            Self::SelectColumns { columns } => Step::new(SelectColumns::new(columns.build()?)),
            Self::DropColumns { columns } => Step::new(DropColumns::new(columns.build()?)),
            Self::RenameColumns { mapping } => Step::new(RenameColumns::new(mapping.clone())),
            Self::CleanColumnNames { case } => Step::new(CleanColumnNames::new(*case)),
            Self::CastColumns { mapping } => {
                let known = CastColumns::type_names();
                if let Some(unknown) = mapping.values().find(|t| !known.contains(&t.as_str())) {
                    return Err(LeavenError::Construction(format!(
                        "Data type {unknown} not available. Choose from: {known:?}"
                    )));
                }
                Step::new(CastColumns::new(mapping.clone()))
            }
            Self::SortRows { columns, ascending } => {
                let selector = columns.build()?;
                if *ascending {
                    Step::new(SortRows::new(selector))
                } else {
                    Step::new(SortRows::descending(selector))
                }
            }
            Self::FilterRows { expression } => Step::new(FilterRows::new(expression.clone())),
            Self::DropDuplicateRows { columns, keep } => {
                let op = match columns {
                    Some(columns) => DropDuplicateRows::on(columns.build()?),
                    None => DropDuplicateRows::new(),
                };
                Step::new(op.keep(*keep))
            }
            Self::MeanImpute { columns } => Step::new(MeanImpute::new(columns.build()?)),
            Self::MedianImpute { columns } => Step::new(MedianImpute::new(columns.build()?)),
            Self::ConstantImpute { columns, value } => {
                Step::new(ConstantImpute::new(columns.build()?, value.clone()))
            }
            Self::ReplaceNa { mapping } => Step::new(ReplaceNa::new(mapping.clone())),
            Self::OrdinalEncoder { columns } => Step::new(OrdinalEncoder::new(columns.build()?)),
            Self::DropZeroVarianceColumns { columns, na_omit } => {
                let selector = match columns {
                    Some(columns) => columns.build()?,
                    None => Selector::all(),
                };
                Step::new(DropZeroVarianceColumns::new(selector).na_omit(*na_omit))
            }
            Self::StringTransform {
                columns,
                transformers,
            } => Step::new(StringTransform::new(columns.build()?, transformers.clone())),
            Self::Mutate { columns } => Step::new(Mutate::new(columns.iter().map(|target| {
                let transforms = target
                    .transformers
                    .iter()
                    .cloned()
                    .map(ColumnTransform::Named)
                    .collect();
                (target.name.clone(), transforms)
            }))),
            Self::GroupBy { columns } => Step::new(GroupBy::new(columns.build()?)),
            Self::Summarize { aggregations } => Step::new(Summarize::new(
                aggregations
                    .iter()
                    .map(|a| (a.name.clone(), a.aggregation.clone())),
            )),
        };
        Ok(step)
    }
}

/// A recipe as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSpec {
    /// Specification version for future migrations
    pub version: String,
    pub name: String,
    pub steps: Vec<StepSpec>,
}

impl RecipeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Load a recipe spec from a JSON file.
    ///
    /// # Errors
    ///
    /// I/O error if the file cannot be read; construction error if it is not a valid spec.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Construction error on malformed JSON or an unknown op.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Construction error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build an unprepared recipe.
    ///
    /// # Errors
    ///
    /// Construction error for an invalid regex, an unknown type name or an unsupported
    /// spec version.
    pub fn build(&self) -> Result<Recipe> {
        if self.version != SPEC_VERSION {
            return Err(LeavenError::Construction(format!(
                "Unsupported recipe spec version {} (expected {SPEC_VERSION})",
                self.version
            )));
        }
        let steps = self
            .steps
            .iter()
            .map(|spec| {
                let step = spec.op.build()?;
                Ok(match &spec.role {
                    Some(role) => step.with_role(role.clone()),
                    None => step,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Recipe::new(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use polars::df;

    const TIDY: &str = r#"{
        "version": "0.1",
        "name": "tidy",
        "steps": [
            {"op": "clean_column_names", "case": "snake"},
            {"op": "drop_duplicate_rows", "columns": ["id"], "keep": "last"},
            {"op": "mean_impute", "columns": {"predicate": "all_numeric"}},
            {"op": "filter_rows", "expression": "id > 1", "role": "train"},
            {"op": "mutate", "columns": [
                {"name": "title", "transformers": [{"fn": "trim"}, {"fn": "upper"}]}
            ]},
            {"op": "summarize", "aggregations": [{"name": "n", "fn": "count", "column": "id"}]}
        ]
    }"#;

    #[test]
    fn test_build_from_json() -> Result<()> {
        let spec = RecipeSpec::from_json(TIDY)?;
        let recipe = spec.build()?;

        let names: Vec<&str> = recipe.steps().iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec![
                "clean_column_names",
                "drop_duplicate_rows",
                "mean_impute",
                "filter_rows",
                "mutate",
                "summarize"
            ]
        );
        assert_eq!(recipe.steps()[3].role(), "train");
        assert!(recipe.needs_preparation());
        Ok(())
    }

    #[test]
    fn test_serialization_keeps_shape() -> Result<()> {
        let spec = RecipeSpec::from_json(TIDY)?;
        let again = RecipeSpec::from_json(&spec.to_json()?)?;
        assert_eq!(spec, again);
        Ok(())
    }

    #[test]
    fn test_zero_variance_keeps_nulls_by_default() -> Result<()> {
        let json = r#"{"version": "0.1", "name": "zv", "steps": [{"op": "drop_zero_variance_columns"}]}"#;
        let spec = RecipeSpec::from_json(json)?;
        assert!(matches!(
            spec.steps.first().map(|s| &s.op),
            Some(OpSpec::DropZeroVarianceColumns { na_omit: false, .. })
        ));

        let df = df!("c" => [None, Some("a"), Some("a")], "v" => [1i64, 2, 3])?;
        let data = Dataset::from(df);
        let mut recipe = spec.build()?;
        recipe.prepare(&data)?;
        assert_eq!(recipe.bake_all(&data)?.column_names(), vec!["c", "v"]);
        Ok(())
    }

    #[test]
    fn test_malformed_specs_are_construction_errors() -> Result<()> {
        let unknown_op = r#"{"version": "0.1", "name": "x", "steps": [{"op": "bake_bread"}]}"#;
        assert!(matches!(
            RecipeSpec::from_json(unknown_op),
            Err(LeavenError::Construction(_))
        ));

        let mut spec = RecipeSpec::new("x");
        spec.steps.push(
            OpSpec::SelectColumns {
                columns: SelectorSpec::One(SelectorItemSpec::Predicate(
                    PredicateSpec::AllMatching {
                        pattern: "(".to_owned(),
                    },
                )),
            }
            .into(),
        );
        assert!(matches!(spec.build(), Err(LeavenError::Construction(_))));

        let mut spec = RecipeSpec::new("x");
        spec.steps.push(
            OpSpec::CastColumns {
                mapping: BTreeMap::from([("age".to_owned(), "decimal".to_owned())]),
            }
            .into(),
        );
        assert!(matches!(spec.build(), Err(LeavenError::Construction(_))));
        Ok(())
    }
}
