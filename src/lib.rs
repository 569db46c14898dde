//! # Leaven - Fit-Once, Bake-Many Pipelines for Tabular Data
//!
//! Leaven lets you describe a data-cleaning workflow as an ordered [`recipe::Recipe`] of
//! steps, fit it once on a reference dataset and then apply ("bake") it to any number of
//! datasets, getting identical, reproducible transformations every time.
//!
//! ## Quick Start
//!
//! ```
//! use leaven::recipe::Recipe;
//! use leaven::selector::Predicate;
//! use leaven::step::Step;
//! use leaven::steps::{CleanColumnNames, MeanImpute};
//! use polars::df;
//!
//! let train = df!("Client Age" => [Some(20.0), None, Some(40.0)])?;
//! let mut recipe = Recipe::new(vec![
//!     Step::new(CleanColumnNames::default()),
//!     Step::new(MeanImpute::new(Predicate::AllNumeric)),
//! ]);
//!
//! // Fit once: the mean (30.0) is learned here
//! recipe.prepare(&train.into())?;
//!
//! // Bake many times: new data gets the fitted mean
//! let fresh = df!("Client Age" => [None, Some(10.0)])?;
//! let baked = recipe.bake_all(&fresh.into())?;
//! assert_eq!(baked.column_names(), vec!["client_age"]);
//! # Ok::<(), leaven::error::LeavenError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`step`]: The validate → prepare → bake lifecycle and the `Operation` trait
//! - [`recipe`]: Ordering, role gating and error wrapping across steps
//! - [`steps`]: Built-in steps (columns, rows, imputation, encoding, grouping, joins)
//! - [`selector`]: Name and schema-predicate column selection
//! - [`transformers`] / [`aggregations`]: Building blocks for `Mutate` and `Summarize`
//! - [`cookbook`]: A named registry of recipes
//! - [`spec`]: Recipes defined as JSON
//! - [`error`]: The error taxonomy
//!
//! ## Roles
//!
//! Every step carries a role (`"all"` by default). `Recipe::bake(data, role)` runs the
//! steps whose role matches, so one recipe can hold training-only steps such as row
//! filters next to steps that run everywhere.
//!
//! ## Key Concepts
//!
//! ### Fitted State
//!
//! Steps like `MeanImpute` or `OrdinalEncoder` learn parameters in `prepare` and must not
//! be baked before. Their fitted values never change during a bake.
//!
//! ### No Mutation
//!
//! Baking works on a private copy. The caller's dataset is never modified.

#![warn(clippy::all, rust_2018_idioms)]

pub mod aggregations;
pub mod config;
pub mod cookbook;
pub mod dataset;
pub mod error;
pub mod io;
pub mod logging;
pub mod naming;
pub mod recipe;
pub mod selector;
pub mod spec;
pub mod step;
pub mod steps;
pub mod transformers;
