//! Concrete steps.
//!
//! Every type here implements [`Operation`](crate::step::Operation) and is wrapped in a
//! [`Step`](crate::step::Step) before joining a recipe. They fall into a few groups:
//! - **Structure**: `SelectColumns`, `DropColumns`, `RenameColumns`, `CleanColumnNames`,
//!   `CastColumns`
//! - **Rows**: `SortRows`, `FilterRows`, `DropDuplicateRows`
//! - **Missing values**: `MeanImpute`, `MedianImpute` (fitted), `ConstantImpute`, `ReplaceNa`
//! - **Encoding**: `OrdinalEncoder`, `DropZeroVarianceColumns` (both fitted)
//! - **Column transforms**: `StringTransform`, `Mutate`
//! - **Grouping**: `GroupBy`, `Summarize`
//! - **Relational**: `Join`
//! - **Escape hatch**: `Custom`
//!
//! # Example
//!
//! ```
//! use leaven::recipe::Recipe;
//! use leaven::step::Step;
//! use leaven::steps::{DropDuplicateRows, MeanImpute, SortRows};
//! use polars::df;
//!
//! let train = df!("id" => [3i64, 1, 1], "age" => [Some(30.0), None, Some(40.0)])?;
//! let mut recipe = Recipe::new(vec![
//!     Step::new(DropDuplicateRows::on("id")),
//!     Step::new(MeanImpute::new("age")),
//!     Step::new(SortRows::new("id")),
//! ]);
//! recipe.prepare(&train.clone().into())?;
//!
//! let baked = recipe.bake_all(&train.into())?;
//! assert_eq!(baked.height(), 2);
//! # Ok::<(), leaven::error::LeavenError>(())
//! ```

pub mod columns;
pub mod custom;
pub mod encode;
pub mod group;
pub mod impute;
pub mod join;
pub mod mutate;
pub mod rows;

pub use columns::{CastColumns, CleanColumnNames, DropColumns, RenameColumns, SelectColumns};
pub use custom::Custom;
pub use encode::{DropZeroVarianceColumns, OrdinalEncoder, OrdinalLevels};
pub use group::{GroupBy, Summarize};
pub use impute::{ConstantImpute, FillValue, MeanImpute, MedianImpute, ReplaceNa};
pub use join::{Join, JoinRight};
pub use mutate::{ColumnTransform, InlineFn, Mutate, StringTransform};
pub use rows::{DropDuplicateRows, FilterRows, Keep, SortRows};
