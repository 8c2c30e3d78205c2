//! WVS missing-value codes
//!
//! Survey cells carry negative sentinel codes instead of blanks. They are
//! normalized to `None` before any statistic sees them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingCode {
    DontKnow,
    NoAnswer,
    NotAsked,
    Missing,
}

impl MissingCode {
    pub const ALL: [MissingCode; 4] = [
        Self::DontKnow,
        Self::NoAnswer,
        Self::NotAsked,
        Self::Missing,
    ];

    /// Numeric code as it appears in the raw file
    pub fn code(self) -> i64 {
        match self {
            Self::DontKnow => -1,
            Self::NoAnswer => -2,
            Self::NotAsked => -4,
            Self::Missing => -5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DontKnow => "Don’t know",
            Self::NoAnswer => "No answer",
            Self::NotAsked => "Not asked",
            Self::Missing => "Missing",
        }
    }

    /// Match a raw value against the sentinel set
    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|code| value == code.code() as f64)
    }
}

impl fmt::Display for MissingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // U+2212 keeps the README footnote typographically consistent.
        write!(f, "\u{2212}{} {}", self.code().abs(), self.label())
    }
}

/// Map sentinel codes to `None`, pass every other value through.
pub fn normalize(value: f64) -> Option<f64> {
    match MissingCode::from_value(value) {
        Some(_) => None,
        None => Some(value),
    }
}

/// Footnote listing every sentinel, e.g. `−1 Don’t know, −2 No answer, ...`
pub fn footnote() -> String {
    MissingCode::ALL
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinels_become_absent() {
        for code in [-1.0, -2.0, -4.0, -5.0] {
            assert_eq!(normalize(code), None, "code {code} should be absent");
        }
    }

    #[test]
    fn ordinary_values_pass_through() {
        assert_eq!(normalize(-3.0), Some(-3.0));
        assert_eq!(normalize(0.0), Some(0.0));
        assert_eq!(normalize(7.0), Some(7.0));
        assert_eq!(normalize(-1.5), Some(-1.5));
    }

    #[test]
    fn footnote_lists_all_codes_in_order() {
        assert_eq!(
            footnote(),
            "\u{2212}1 Don’t know, \u{2212}2 No answer, \u{2212}4 Not asked, \u{2212}5 Missing"
        );
    }
}
