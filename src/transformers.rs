//! Column transformers used by `Mutate` and `StringTransform`.
//!
//! A [`Transformer`] computes a new column from a source column. String transformers
//! are element-wise; group-aware ones (row number, lag, lead) are evaluated per group
//! when the dataset is a grouped view.

use crate::error::{LeavenError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadSide {
    #[default]
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fn", rename_all = "snake_case")]
pub enum TransformerKind {
    /// `"Yeast"` → `"YEAST"`
    Upper,
    /// `"Yeast"` → `"yeast"`
    Lower,
    /// `"yeast help"` → `"Yeast help"`
    Sentence,
    /// `"yeast help"` → `"Yeast Help"`
    Title,
    /// `" Yeast "` → `"Yeast"`
    Trim,
    /// Replace the first regex match.
    Replace { pattern: String, replacement: String },
    /// Replace every regex match.
    ReplaceAll { pattern: String, replacement: String },
    Pad {
        width: usize,
        #[serde(default)]
        side: PadSide,
        #[serde(default = "default_pad")]
        pad: char,
    },
    /// 1-based position of the row within its group.
    RowNumber,
    Lag {
        #[serde(default = "default_offset")]
        n: i64,
    },
    Lead {
        #[serde(default = "default_offset")]
        n: i64,
    },
}

fn default_pad() -> char {
    ' '
}

fn default_offset() -> i64 {
    1
}

/// A transformer plus the column it reads from.
///
/// Without an explicit column the transformer reads the column it writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer {
    #[serde(flatten)]
    kind: TransformerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<String>,
}

impl Transformer {
    pub fn new(kind: TransformerKind) -> Self {
        Self { kind, column: None }
    }

    pub fn upper() -> Self {
        Self::new(TransformerKind::Upper)
    }

    pub fn lower() -> Self {
        Self::new(TransformerKind::Lower)
    }

    pub fn sentence() -> Self {
        Self::new(TransformerKind::Sentence)
    }

    pub fn title() -> Self {
        Self::new(TransformerKind::Title)
    }

    pub fn trim() -> Self {
        Self::new(TransformerKind::Trim)
    }

    pub fn replace(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(TransformerKind::Replace {
            pattern: pattern.into(),
            replacement: replacement.into(),
        })
    }

    pub fn replace_all(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new(TransformerKind::ReplaceAll {
            pattern: pattern.into(),
            replacement: replacement.into(),
        })
    }

    pub fn pad(width: usize, side: PadSide, pad: char) -> Self {
        Self::new(TransformerKind::Pad { width, side, pad })
    }

    pub fn row_number() -> Self {
        Self::new(TransformerKind::RowNumber)
    }

    pub fn lag(n: i64) -> Self {
        Self::new(TransformerKind::Lag { n })
    }

    pub fn lead(n: i64) -> Self {
        Self::new(TransformerKind::Lead { n })
    }

    /// Read from `column` instead of the target column.
    pub fn on(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn kind(&self) -> &TransformerKind {
        &self.kind
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            TransformerKind::Upper => "upper",
            TransformerKind::Lower => "lower",
            TransformerKind::Sentence => "sentence",
            TransformerKind::Title => "title",
            TransformerKind::Trim => "trim",
            TransformerKind::Replace { .. } => "replace",
            TransformerKind::ReplaceAll { .. } => "replace_all",
            TransformerKind::Pad { .. } => "pad",
            TransformerKind::RowNumber => "row_number",
            TransformerKind::Lag { .. } => "lag",
            TransformerKind::Lead { .. } => "lead",
        }
    }

    pub fn is_string(&self) -> bool {
        !self.is_group_aware()
    }

    pub fn is_group_aware(&self) -> bool {
        matches!(
            self.kind,
            TransformerKind::RowNumber | TransformerKind::Lag { .. } | TransformerKind::Lead { .. }
        )
    }

    fn reads_column(&self) -> bool {
        !matches!(self.kind, TransformerKind::RowNumber)
    }

    /// The column this transformer reads when writing to `target`.
    pub fn source<'a>(&'a self, target: &'a str) -> &'a str {
        self.column.as_deref().unwrap_or(target)
    }

    /// Expression computing the transformed values of `source`.
    pub fn expr(&self, source: &str) -> Expr {
        let input = col(source);
        match &self.kind {
            TransformerKind::Upper => input.str().to_uppercase(),
            TransformerKind::Lower => input.str().to_lowercase(),
            TransformerKind::Sentence => map_text(input, sentence_case),
            TransformerKind::Title => map_text(input, title_case),
            TransformerKind::Trim => input.str().strip_chars(lit(NULL)),
            TransformerKind::Replace {
                pattern,
                replacement,
            } => input
                .str()
                .replace(lit(pattern.as_str()), lit(replacement.as_str()), false),
            TransformerKind::ReplaceAll {
                pattern,
                replacement,
            } => input
                .str()
                .replace_all(lit(pattern.as_str()), lit(replacement.as_str()), false),
            TransformerKind::Pad { width, side, pad } => {
                let (width, pad) = (*width, *pad);
                match side {
                    PadSide::Left => input.str().pad_start(width, pad),
                    PadSide::Right => input.str().pad_end(width, pad),
                    PadSide::Both => map_text(input, move |s| center(s, width, pad)),
                }
            }
            TransformerKind::RowNumber => {
                int_range(lit(0), len(), 1, DataType::Int64) + lit(1)
            }
            TransformerKind::Lag { n } => input.shift(lit(*n)),
            TransformerKind::Lead { n } => input.shift(lit(-*n)),
        }
    }

    /// Write the transformed column to `target` in `frame`.
    ///
    /// Group-aware transformers are evaluated per group of `keys` when given.
    ///
    /// # Errors
    ///
    /// Returns a transformer error if the bound source column is absent.
    pub fn apply(&self, frame: DataFrame, target: &str, keys: Option<&[String]>) -> Result<DataFrame> {
        let source = self.source(target);
        if self.reads_column() && frame.get_column_index(source).is_none() {
            return Err(LeavenError::Transformer(format!(
                "Transformer '{}' cannot bind column '{source}' for '{target}'",
                self.name()
            )));
        }

        let mut expr = self.expr(source);
        if let Some(keys) = keys.filter(|_| self.is_group_aware()) {
            let partition: Vec<Expr> = keys.iter().map(|k| col(k.as_str())).collect();
            expr = expr.over(partition);
        }
        Ok(frame.lazy().with_column(expr.alias(target)).collect()?)
    }
}

fn map_text<F>(input: Expr, f: F) -> Expr
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    input.map(
        move |c: Column| {
            let out: StringChunked = c.str()?.into_iter().map(|v| v.map(&f)).collect();
            Ok(Some(out.with_name(c.name().clone()).into_column()))
        },
        GetOutput::from_type(DataType::String),
    )
}

fn sentence_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

fn center(s: &str, width: usize, pad: char) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_owned();
    }
    let total = width - len;
    let left = total / 2;
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat_n(pad, left));
    out.push_str(s);
    out.extend(std::iter::repeat_n(pad, total - left));
    out
}
