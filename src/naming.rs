//! Column-name case conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Target case for [`CleanColumnNames`](crate::steps::CleanColumnNames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    #[default]
    Snake,
    LowerCamel,
    UpperCamel,
}

impl NameCase {
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Snake => to_snake_case(name),
            Self::LowerCamel => to_camel_case(name, false),
            Self::UpperCamel => to_camel_case(name, true),
        }
    }
}

/// `"Total Sales"` → `"total_sales"`, `"HTTPServer"` → `"http_server"`.
pub fn to_snake_case(name: &str) -> String {
    let spaced = name.trim().replace("  ", " ").replace(' ', "_");
    let chars: Vec<char> = spaced.chars().collect();

    let mut result = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars.get(i - 1).copied().unwrap_or('_');
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_lowercase() || prev.is_ascii_digit();
            let ends_acronym = prev.is_uppercase() && next.is_some_and(char::is_lowercase);
            if after_lower || ends_acronym {
                result.push('_');
            }
        }
        if c == '-' {
            result.push('_');
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

/// `"total_sales"` → `"TotalSales"` (or `"totalSales"` when `upper_first` is false).
pub fn to_camel_case(name: &str, upper_first: bool) -> String {
    let joined = name.trim().replace("  ", " ").replace(' ', "");

    let mut result = String::with_capacity(joined.len());
    let mut capitalize = true;
    for c in joined.chars() {
        if c == '_' {
            if capitalize {
                // consecutive or leading underscores are kept
                result.push(c);
            }
            capitalize = true;
        } else if capitalize {
            result.extend(c.to_uppercase());
            capitalize = false;
        } else {
            result.push(c);
        }
    }

    if upper_first {
        return result;
    }
    let mut chars = result.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => result,
    }
}

/// Make names unique by appending `_1`, `_2`, ... to repeats.
pub fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(names.len());

    for base in names {
        let mut candidate = base.clone();
        let mut count = 0;
        while seen.contains(&candidate) {
            count += 1;
            candidate = format!("{base}_{count}");
        }
        seen.insert(candidate.clone());
        cleaned.push(candidate);
    }
    cleaned
}
