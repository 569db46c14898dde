//! Error taxonomy shared by every stage of a recipe run.
//!
//! Errors fall into two groups:
//!
//! ## Recognized kinds
//!
//! `Construction`, `Validation`, `Preparation`, `Bake`, `Transformer` and `Cookbook`
//! describe a failure class the caller can act on. When one of them is raised inside a
//! step it crosses the [`Recipe`](crate::recipe::Recipe) boundary untouched.
//!
//! ## Unclassified kinds
//!
//! `Data` (polars), `Io` and `Other` come from collaborators. The recipe boundary wraps
//! them into `Preparation` or `Bake`, keeping the original as the cause:
//!
//! ```
//! use leaven::error::LeavenError;
//! use std::error::Error as _;
//!
//! let cause = LeavenError::Other("division by zero".to_owned());
//! let wrapped = LeavenError::bake("Step 2 (mutate) failed", cause);
//!
//! assert!(wrapped.is_recognized());
//! assert_eq!(wrapped.source().map(ToString::to_string).as_deref(), Some("division by zero"));
//! ```

use std::fmt;

/// Main error type for leaven operations.
#[derive(Debug)]
pub enum LeavenError {
    /// Malformed recipe or wrong input handed to `prepare`/`bake`
    Construction(String),

    /// A step precondition failed (missing column, bad parameter, wrong input shape)
    Validation(String),

    /// Failure while fitting a recipe
    Preparation {
        message: String,
        cause: Option<Box<LeavenError>>,
    },

    /// Failure while baking, including baking a step that was never prepared
    Bake {
        message: String,
        cause: Option<Box<LeavenError>>,
    },

    /// A column transform could not bind its target column
    Transformer(String),

    /// Recipe registry misuse
    Cookbook(String),

    /// Errors raised by the table engine
    Data(polars::error::PolarsError),

    /// I/O errors (CSV files, settings)
    Io(std::io::Error),

    /// Generic error with context
    Other(String),
}

impl LeavenError {
    /// Wrap `cause` into a preparation error.
    pub fn preparation(message: impl Into<String>, cause: Self) -> Self {
        Self::Preparation {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Wrap `cause` into a bake error.
    pub fn bake(message: impl Into<String>, cause: Self) -> Self {
        Self::Bake {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// A bake error that has no underlying cause.
    pub fn bake_failure(message: impl Into<String>) -> Self {
        Self::Bake {
            message: message.into(),
            cause: None,
        }
    }

    /// A preparation error that has no underlying cause.
    pub fn preparation_failure(message: impl Into<String>) -> Self {
        Self::Preparation {
            message: message.into(),
            cause: None,
        }
    }

    /// Whether this error belongs to the taxonomy and must pass boundaries unchanged.
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            Self::Construction(_)
                | Self::Validation(_)
                | Self::Preparation { .. }
                | Self::Bake { .. }
                | Self::Transformer(_)
                | Self::Cookbook(_)
        )
    }

    /// The wrapped cause of a `Preparation` or `Bake` error.
    pub fn cause(&self) -> Option<&Self> {
        match self {
            Self::Preparation { cause, .. } | Self::Bake { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for LeavenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Construction(msg) => write!(f, "Recipe construction error: {msg}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Preparation { message, cause } => match cause {
                Some(cause) => write!(f, "Preparation error: {message}: {cause}"),
                None => write!(f, "Preparation error: {message}"),
            },
            Self::Bake { message, cause } => match cause {
                Some(cause) => write!(f, "Bake error: {message}: {cause}"),
                None => write!(f, "Bake error: {message}"),
            },
            Self::Transformer(msg) => write!(f, "Transformer error: {msg}"),
            Self::Cookbook(msg) => write!(f, "Cookbook error: {msg}"),
            Self::Data(e) => write!(f, "Data processing error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LeavenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Preparation { cause, .. } | Self::Bake { cause, .. } => cause
                .as_deref()
                .map(|c| c as &(dyn std::error::Error + 'static)),
            Self::Data(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LeavenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<polars::error::PolarsError> for LeavenError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::Data(err)
    }
}

impl From<serde_json::Error> for LeavenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Construction(format!("JSON error: {err}"))
    }
}

impl From<regex::Error> for LeavenError {
    fn from(err: regex::Error) -> Self {
        Self::Construction(format!("Invalid pattern: {err}"))
    }
}

impl From<LeavenError> for String {
    fn from(err: LeavenError) -> Self {
        err.to_string()
    }
}

/// Result type alias for leaven operations.
pub type Result<T> = std::result::Result<T, LeavenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = LeavenError::Validation("The following columns are missing: [\"x\"]".to_owned());
        assert_eq!(
            err.to_string(),
            "Validation error: The following columns are missing: [\"x\"]"
        );
    }

    #[test]
    fn test_recognized_kinds() {
        assert!(LeavenError::Construction("x".to_owned()).is_recognized());
        assert!(LeavenError::Transformer("x".to_owned()).is_recognized());
        assert!(LeavenError::bake_failure("x").is_recognized());
        assert!(!LeavenError::Other("x".to_owned()).is_recognized());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!LeavenError::from(io).is_recognized());
    }

    #[test]
    fn test_wrapped_cause_is_kept() {
        let err = LeavenError::preparation("Step 1 (mean_impute) failed", LeavenError::Other("boom".to_owned()));

        assert!(matches!(err.cause(), Some(LeavenError::Other(msg)) if msg == "boom"));
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "Preparation error: Step 1 (mean_impute) failed: boom"
        );
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = LeavenError::Cookbook("Recipe \"a\" already registered".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Cookbook error: Recipe \"a\" already registered");
    }
}
