//! Relational merge with another dataset or with the output of a nested recipe.

use crate::dataset::{Dataset, JoinHow};
use crate::error::{LeavenError, Result};
use crate::recipe::Recipe;
use crate::step::Operation;
use polars::prelude::*;
use tracing::debug;

/// Right-hand side of a join.
#[derive(Debug)]
pub enum JoinRight {
    Frame(DataFrame),
    /// A recipe plus the dataset it is prepared and baked on.
    Recipe { recipe: Box<Recipe>, input: Dataset },
}

impl From<DataFrame> for JoinRight {
    fn from(df: DataFrame) -> Self {
        Self::Frame(df)
    }
}

#[derive(Debug)]
pub struct Join {
    right: JoinRight,
    how: JoinHow,
    by: Option<Vec<String>>,
}

impl Join {
    pub fn new(right: impl Into<JoinRight>, how: JoinHow) -> Self {
        Self {
            right: right.into(),
            how,
            by: None,
        }
    }

    pub fn left_join(right: impl Into<JoinRight>) -> Self {
        Self::new(right, JoinHow::Left)
    }

    pub fn right_join(right: impl Into<JoinRight>) -> Self {
        Self::new(right, JoinHow::Right)
    }

    pub fn inner_join(right: impl Into<JoinRight>) -> Self {
        Self::new(right, JoinHow::Inner)
    }

    pub fn full_join(right: impl Into<JoinRight>) -> Self {
        Self::new(right, JoinHow::Full)
    }

    /// Join against the output of `recipe` baked on `input`.
    pub fn with_recipe(recipe: Recipe, input: impl Into<Dataset>, how: JoinHow) -> Self {
        Self::new(
            JoinRight::Recipe {
                recipe: Box::new(recipe),
                input: input.into(),
            },
            how,
        )
    }

    /// Join keys. Defaults to the columns both sides share.
    pub fn by<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn how(&self) -> JoinHow {
        self.how
    }

    fn keys(&self, left: &Dataset, right: &DataFrame) -> Vec<String> {
        match &self.by {
            Some(keys) => keys.clone(),
            None => left
                .column_names()
                .into_iter()
                .filter(|name| right.get_column_index(name).is_some())
                .collect(),
        }
    }

    fn check_keys(keys: &[String], left: &Dataset, right: &DataFrame) -> Result<()> {
        if keys.is_empty() {
            return Err(LeavenError::Validation(
                "No common columns to merge on".to_owned(),
            ));
        }
        let missing_left: Vec<&String> = keys.iter().filter(|k| !left.has_column(k)).collect();
        if !missing_left.is_empty() {
            return Err(LeavenError::Validation(format!(
                "Columns {missing_left:?} not found on the left side of the merge"
            )));
        }
        let missing_right: Vec<&String> = keys
            .iter()
            .filter(|k| right.get_column_index(k).is_none())
            .collect();
        if !missing_right.is_empty() {
            return Err(LeavenError::Validation(format!(
                "Columns {missing_right:?} not found on the right side of the merge"
            )));
        }
        Ok(())
    }
}

impl Operation for Join {
    fn name(&self) -> &'static str {
        "join"
    }

    fn needs_preparation(&self) -> bool {
        match &self.right {
            JoinRight::Frame(_) => false,
            JoinRight::Recipe { recipe, .. } => recipe.needs_preparation(),
        }
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        if data.is_grouped() {
            return Err(LeavenError::Validation(
                "Previous Step didn't return a DataFrame".to_owned(),
            ));
        }
        // a nested recipe's output is only known at bake time
        if let JoinRight::Frame(right) = &self.right {
            Self::check_keys(&self.keys(data, right), data, right)?;
        }
        Ok(())
    }

    fn do_prepare(&mut self, _data: &Dataset) -> Result<()> {
        if let JoinRight::Recipe { recipe, input } = &mut self.right {
            debug!(steps = recipe.len(), "Preparing nested recipe");
            recipe.prepare(input)?;
        }
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        let baked;
        let right = match &self.right {
            JoinRight::Frame(df) => df,
            JoinRight::Recipe { recipe, input } => {
                baked = recipe.bake_all(input)?.into_frame();
                &baked
            }
        };
        let keys = self.keys(&data, right);
        Self::check_keys(&keys, &data, right)?;
        debug!(how = self.how.as_str(), keys = ?keys, "Merging");
        Ok(Dataset::Frame(data.merge(right, self.how, &keys)?))
    }
}
