//! User-defined steps built from closures.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::step::Operation;
use serde_json::Value;
use std::fmt;

type ValidateFn = Box<dyn Fn(&Dataset) -> Result<()> + Send + Sync>;
type PrepareFn = Box<dyn Fn(&Dataset) -> Result<Value> + Send + Sync>;
type BakeFn = Box<dyn Fn(Dataset, &Value) -> Result<Dataset> + Send + Sync>;

/// A step assembled from optional closures.
///
/// The prepare closure returns the fitted state, which is stored on the step and handed
/// to the bake closure. The step needs preparation only when a prepare closure is set.
///
/// ```
/// use leaven::step::Step;
/// use leaven::steps::Custom;
/// use serde_json::json;
///
/// let step = Step::new(
///     Custom::new("row_count")
///         .prepare(|data| Ok(json!(data.height())))
///         .bake(|data, _state| Ok(data)),
/// );
/// assert!(step.needs_preparation());
/// ```
pub struct Custom {
    name: &'static str,
    validate: Option<ValidateFn>,
    prepare: Option<PrepareFn>,
    bake: Option<BakeFn>,
    state: Value,
}

impl Custom {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            validate: None,
            prepare: None,
            bake: None,
            state: Value::Null,
        }
    }

    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Dataset) -> Result<()> + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(f));
        self
    }

    pub fn prepare<F>(mut self, f: F) -> Self
    where
        F: Fn(&Dataset) -> Result<Value> + Send + Sync + 'static,
    {
        self.prepare = Some(Box::new(f));
        self
    }

    pub fn bake<F>(mut self, f: F) -> Self
    where
        F: Fn(Dataset, &Value) -> Result<Dataset> + Send + Sync + 'static,
    {
        self.bake = Some(Box::new(f));
        self
    }

    /// State produced by the last prepare, `null` before that.
    pub fn state(&self) -> &Value {
        &self.state
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("name", &self.name)
            .field("validate", &self.validate.is_some())
            .field("prepare", &self.prepare.is_some())
            .field("bake", &self.bake.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl Operation for Custom {
    fn name(&self) -> &'static str {
        self.name
    }

    fn needs_preparation(&self) -> bool {
        self.prepare.is_some()
    }

    fn do_validate(&self, data: &Dataset) -> Result<()> {
        match &self.validate {
            Some(f) => f(data),
            None => Ok(()),
        }
    }

    fn do_prepare(&mut self, data: &Dataset) -> Result<()> {
        if let Some(f) = &self.prepare {
            self.state = f(data)?;
        }
        Ok(())
    }

    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        match &self.bake {
            Some(f) => f(data, &self.state),
            None => Ok(data),
        }
    }
}
