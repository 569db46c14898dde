//! The step lifecycle.
//!
//! Every operation in a recipe is wrapped in a [`Step`], which owns the state machine:
//!
//! ```text
//! Unprepared ──prepare──▶ Prepared ──prepare──▶ Prepared (re-fitted)
//!      │                     │
//!      └─bake: error if the  └─bake: validate, then transform
//!        operation needs
//!        preparation
//! ```
//!
//! Concrete operations implement [`Operation`] and only supply the extension points.
//! They cannot change the order of validation, fitting and transformation.

use crate::dataset::Dataset;
use crate::error::{LeavenError, Result};
use std::fmt;
use tracing::debug;

/// Role that matches every bake call.
pub const ALL_ROLES: &str = "all";

/// Extension points of a step.
///
/// `do_prepare` is the only place fitted parameters may change; `do_bake` sees the
/// operation through a shared reference.
pub trait Operation: fmt::Debug {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Whether baking requires a prior `prepare`.
    fn needs_preparation(&self) -> bool {
        false
    }

    /// Check preconditions against `data`. Must not have visible side effects.
    fn do_validate(&self, _data: &Dataset) -> Result<()> {
        Ok(())
    }

    /// Fit parameters from `data`.
    fn do_prepare(&mut self, _data: &Dataset) -> Result<()> {
        Ok(())
    }

    /// Transform `data` using the fitted parameters.
    fn do_bake(&self, data: Dataset) -> Result<Dataset> {
        Ok(data)
    }
}

/// A configured operation plus its lifecycle state and role.
#[derive(Debug)]
pub struct Step {
    operation: Box<dyn Operation>,
    prepared: bool,
    role: String,
}

impl Step {
    pub fn new(operation: impl Operation + 'static) -> Self {
        Self {
            operation: Box::new(operation),
            prepared: false,
            role: ALL_ROLES.to_owned(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn needs_preparation(&self) -> bool {
        self.operation.needs_preparation()
    }

    pub fn operation(&self) -> &dyn Operation {
        self.operation.as_ref()
    }

    /// Role gate: does a bake called with `role` execute this step?
    pub fn runs_for(&self, role: &str) -> bool {
        role == ALL_ROLES || self.role == ALL_ROLES || self.role == role
    }

    /// Run the operation's checks; only the error matters.
    ///
    /// # Errors
    ///
    /// Whatever `do_validate` reports.
    pub fn validate(&self, data: &Dataset) -> Result<()> {
        self.operation.do_validate(data)
    }

    /// Validate, then fit against `data`. Calling it again re-fits.
    ///
    /// # Errors
    ///
    /// Propagates validation and fitting failures unchanged.
    pub fn prepare(&mut self, data: &Dataset) -> Result<&mut Self> {
        self.validate(data)?;
        self.operation.do_prepare(data)?;
        self.prepared = true;
        debug!(step = self.name(), "Step prepared");
        Ok(self)
    }

    /// Validate, then transform `data`.
    ///
    /// # Errors
    ///
    /// Returns a bake error, before any validation, if the operation needs preparation
    /// and `prepare` has not run.
    pub fn bake(&self, data: Dataset) -> Result<Dataset> {
        if self.needs_preparation() && !self.prepared {
            return Err(LeavenError::bake_failure(format!(
                "Step '{}' must be prepared before baking",
                self.name()
            )));
        }
        self.validate(&data)?;
        let out = self.operation.do_bake(data)?;
        debug!(
            step = self.name(),
            rows = out.height(),
            columns = out.width(),
            "Step baked"
        );
        Ok(out)
    }
}

impl<T: Operation + 'static> From<T> for Step {
    fn from(operation: T) -> Self {
        Self::new(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Counting {
        validations: Rc<Cell<usize>>,
        fitted: Option<usize>,
    }

    impl Operation for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn needs_preparation(&self) -> bool {
            true
        }

        fn do_validate(&self, data: &Dataset) -> Result<()> {
            self.validations.set(self.validations.get() + 1);
            if data.has_column("x") {
                Ok(())
            } else {
                Err(LeavenError::Validation("x is required".to_owned()))
            }
        }

        fn do_prepare(&mut self, data: &Dataset) -> Result<()> {
            self.fitted = Some(data.height());
            Ok(())
        }
    }

    fn data() -> Result<Dataset> {
        Ok(df!("x" => [1i64, 2, 3])?.into())
    }

    #[test]
    fn test_unprepared_bake_fails_without_validation() -> Result<()> {
        let validations = Rc::new(Cell::new(0));
        let step = Step::new(Counting {
            validations: Rc::clone(&validations),
            fitted: None,
        });
        let err = step.bake(data()?);

        assert!(matches!(err, Err(LeavenError::Bake { cause: None, .. })));
        assert_eq!(validations.get(), 0);
        Ok(())
    }

    #[test]
    fn test_prepare_then_bake() -> Result<()> {
        let mut step = Step::new(Counting::default());
        assert!(!step.is_prepared());

        step.prepare(&data()?)?;
        assert!(step.is_prepared());

        let out = step.bake(data()?)?;
        assert_eq!(out.height(), 3);
        Ok(())
    }

    #[test]
    fn test_prepare_validates_first() -> Result<()> {
        let mut step = Step::new(Counting::default());
        let empty: Dataset = df!("y" => [1i64])?.into();

        assert!(matches!(step.prepare(&empty), Err(LeavenError::Validation(_))));
        assert!(!step.is_prepared());
        Ok(())
    }

    #[test]
    fn test_role_gate() {
        let train = Step::new(Counting::default()).with_role("train");
        let shared = Step::new(Counting::default());

        assert!(train.runs_for(ALL_ROLES));
        assert!(train.runs_for("train"));
        assert!(!train.runs_for("test"));
        assert!(shared.runs_for("test"));
    }
}
