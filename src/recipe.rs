//! Recipe orchestration.
//!
//! A [`Recipe`] threads a private copy of the caller's dataset through its steps. It is
//! also the only place where unclassified failures become `Preparation` or `Bake`
//! errors; recognized errors raised by a step come out exactly as the step raised them.

use crate::dataset::Dataset;
use crate::error::{LeavenError, Result};
use crate::step::{ALL_ROLES, Step};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Summary of a single bake.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
    pub steps_applied: usize,
    /// Steps skipped by the role gate
    pub steps_skipped: usize,
    pub duration: Duration,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Recipe baked: {} rows ({} → {}), {} columns ({} → {}), {} steps applied, {} skipped, {:.2}s",
            change(self.rows_before, self.rows_after),
            self.rows_before,
            self.rows_after,
            change(self.columns_before, self.columns_after),
            self.columns_before,
            self.columns_after,
            self.steps_applied,
            self.steps_skipped,
            self.duration.as_secs_f64()
        )
    }
}

fn change(before: usize, after: usize) -> &'static str {
    if after > before {
        "added"
    } else if after < before {
        "removed"
    } else {
        "unchanged"
    }
}

/// Ordered sequence of steps, fitted once and baked many times.
#[derive(Debug, Default)]
pub struct Recipe {
    steps: Vec<Step>,
}

impl Recipe {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn from_step(step: Step) -> Self {
        Self { steps: vec![step] }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True if any step needs preparation. Recomputed on every call.
    pub fn needs_preparation(&self) -> bool {
        self.steps.iter().any(Step::needs_preparation)
    }

    /// Fit every step against `data`.
    ///
    /// Each step is prepared on the output of the previous steps' bake, so fitted
    /// parameters see the same data a real bake would hand them. Role gates are not
    /// applied here. Stateless steps still validate and mark themselves prepared.
    ///
    /// # Errors
    ///
    /// Construction error for a grouped input; recognized step errors unchanged;
    /// anything else wrapped in a preparation error.
    pub fn prepare(&mut self, data: &Dataset) -> Result<&mut Self> {
        ensure_frame(data)?;
        info!(
            steps = self.len(),
            rows = data.height(),
            columns = data.width(),
            "Preparing recipe"
        );
        let mut working = data.clone();
        for (idx, step) in self.steps.iter_mut().enumerate() {
            let name = step.name();
            let wrap = |err| {
                at_boundary(err, |cause| {
                    LeavenError::preparation(format!("Step {} ({name}) failed", idx + 1), cause)
                })
            };
            step.prepare(&working).map_err(wrap)?;
            working = step.bake(working).map_err(wrap)?;
        }
        info!("Recipe prepared");
        Ok(self)
    }

    /// Apply the recipe to a copy of `data`, executing only steps whose role matches.
    ///
    /// # Errors
    ///
    /// Construction error for a grouped input; recognized step errors unchanged;
    /// anything else wrapped in a bake error.
    pub fn bake(&self, data: &Dataset, role: &str) -> Result<Dataset> {
        self.bake_with_report(data, role).map(|(out, _)| out)
    }

    /// Same as [`Recipe::bake`], also returning the run summary.
    ///
    /// # Errors
    ///
    /// See [`Recipe::bake`].
    pub fn bake_with_report(&self, data: &Dataset, role: &str) -> Result<(Dataset, RunReport)> {
        ensure_frame(data)?;
        let start = Instant::now();
        let (rows_before, columns_before) = (data.height(), data.width());

        let mut working = data.clone();
        let mut steps_applied = 0;
        let mut steps_skipped = 0;
        for (idx, step) in self.steps.iter().enumerate() {
            if !step.runs_for(role) {
                debug!(step = step.name(), step_role = step.role(), role, "Step skipped");
                steps_skipped += 1;
                continue;
            }
            working = step.bake(working).map_err(|err| {
                at_boundary(err, |cause| {
                    LeavenError::bake(format!("Step {} ({}) failed", idx + 1, step.name()), cause)
                })
            })?;
            steps_applied += 1;
        }

        let report = RunReport {
            rows_before,
            columns_before,
            rows_after: working.height(),
            columns_after: working.width(),
            steps_applied,
            steps_skipped,
            duration: start.elapsed(),
        };
        info!(role, "{}", report.summary());
        Ok((working, report))
    }

    /// Bake with every step enabled.
    ///
    /// # Errors
    ///
    /// See [`Recipe::bake`].
    pub fn bake_all(&self, data: &Dataset) -> Result<Dataset> {
        self.bake(data, ALL_ROLES)
    }
}

impl From<Step> for Recipe {
    fn from(step: Step) -> Self {
        Self::from_step(step)
    }
}

impl From<Vec<Step>> for Recipe {
    fn from(steps: Vec<Step>) -> Self {
        Self::new(steps)
    }
}

fn ensure_frame(data: &Dataset) -> Result<()> {
    if data.is_grouped() {
        return Err(LeavenError::Construction(
            "Data must be a DataFrame".to_owned(),
        ));
    }
    Ok(())
}

fn at_boundary(err: LeavenError, wrap: impl FnOnce(LeavenError) -> LeavenError) -> LeavenError {
    if err.is_recognized() {
        return err;
    }
    let wrapped = wrap(err);
    warn!("{wrapped}");
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Operation;
    use crate::steps::SelectColumns;
    use polars::prelude::*;

    #[derive(Debug)]
    struct AddOne {
        column: &'static str,
    }

    impl Operation for AddOne {
        fn name(&self) -> &'static str {
            "add_one"
        }

        fn do_bake(&self, data: Dataset) -> crate::error::Result<Dataset> {
            data.map_frame(|df| {
                Ok(df
                    .lazy()
                    .with_column(col(self.column) + lit(1))
                    .collect()?)
            })
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Operation for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn do_bake(&self, _data: Dataset) -> crate::error::Result<Dataset> {
            Err(LeavenError::Other("boom".to_owned()))
        }
    }

    fn frame() -> crate::error::Result<Dataset> {
        Ok(df!("x" => [1i64, 2, 3])?.into())
    }

    fn values(ds: &Dataset) -> crate::error::Result<Vec<Option<i64>>> {
        Ok(ds.frame().column("x")?.i64()?.into_iter().collect())
    }

    #[test]
    fn test_bake_does_not_touch_input() -> crate::error::Result<()> {
        let input = frame()?;
        let recipe = Recipe::from_step(Step::new(AddOne { column: "x" }));

        let out = recipe.bake_all(&input)?;
        assert_eq!(values(&out)?, vec![Some(2), Some(3), Some(4)]);
        assert_eq!(values(&input)?, vec![Some(1), Some(2), Some(3)]);
        Ok(())
    }

    #[test]
    fn test_role_gate_skips_steps() -> crate::error::Result<()> {
        let recipe = Recipe::new(vec![
            Step::new(AddOne { column: "x" }).with_role("train"),
            Step::new(AddOne { column: "x" }),
            Step::new(AddOne { column: "x" }).with_role("test"),
        ]);

        let (train, report) = recipe.bake_with_report(&frame()?, "train")?;
        assert_eq!(values(&train)?, vec![Some(3), Some(4), Some(5)]);
        assert_eq!(report.steps_applied, 2);
        assert_eq!(report.steps_skipped, 1);

        let all = recipe.bake_all(&frame()?)?;
        assert_eq!(values(&all)?, vec![Some(4), Some(5), Some(6)]);
        Ok(())
    }

    #[test]
    fn test_unclassified_errors_are_wrapped() -> crate::error::Result<()> {
        let recipe = Recipe::new(vec![Step::new(AddOne { column: "x" }), Step::new(Failing)]);

        match recipe.bake_all(&frame()?) {
            Err(err @ LeavenError::Bake { .. }) => {
                assert!(err.to_string().contains("Step 2 (failing) failed"));
                assert!(matches!(err.cause(), Some(LeavenError::Other(_))));
            }
            other => panic!("expected bake error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_grouped_input_is_rejected() -> crate::error::Result<()> {
        let grouped = frame()?.group_by(vec!["x".to_owned()])?;
        let mut recipe = Recipe::from_step(Step::new(AddOne { column: "x" }));

        assert!(matches!(
            recipe.bake_all(&grouped),
            Err(LeavenError::Construction(_))
        ));
        assert!(matches!(
            recipe.prepare(&grouped),
            Err(LeavenError::Construction(_))
        ));
        Ok(())
    }

    #[test]
    fn test_prepare_runs_stateless_steps() -> crate::error::Result<()> {
        let mut recipe = Recipe::from(vec![
            Step::new(AddOne { column: "x" }),
            Step::new(AddOne { column: "x" }),
        ]);
        assert!(!recipe.needs_preparation());
        recipe.prepare(&frame()?)?;
        assert!(recipe.steps().iter().all(Step::is_prepared));
        Ok(())
    }

    #[test]
    fn test_prepare_validates_stateless_steps() -> crate::error::Result<()> {
        let mut recipe = Recipe::from_step(Step::new(SelectColumns::new("missing")));
        let err = recipe.prepare(&frame()?).map(|_| ());
        assert!(matches!(err, Err(LeavenError::Validation(_))), "got {err:?}");
        assert!(!recipe.steps()[0].is_prepared());
        Ok(())
    }
}
