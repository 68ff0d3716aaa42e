use regex::{Regex, RegexBuilder};

use crate::domain::errors::ValidationError;

/// Predicate over bucket names and object leaf names.
///
/// `Like` is a case-insensitive regex anchored at the start of the
/// candidate but not at its end, so `"foo"` matches `"foobar"`. Filters in
/// the wild rely on that partial match; do not turn it into a full match.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Exact(String),
    Like { pattern: String, compiled: Regex },
}

impl NameMatcher {
    /// Create an equality matcher
    pub fn exact(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(NameMatcher::Exact(name))
    }

    /// Create a case-insensitive, start-anchored regex matcher
    pub fn like(pattern: impl Into<String>) -> Result<Self, ValidationError> {
        let pattern = pattern.into();
        let compiled = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(true)
            .build()
            .map_err(|e| ValidationError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

        Ok(NameMatcher::Like { pattern, compiled })
    }

    /// Pick the variant from a CLI-style `exact` flag
    pub fn from_flag(value: &str, exact: bool) -> Result<Self, ValidationError> {
        if exact {
            Self::exact(value)
        } else {
            Self::like(value)
        }
    }

    /// Check whether a candidate name passes this matcher
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            NameMatcher::Exact(name) => candidate == name,
            NameMatcher::Like { compiled, .. } => compiled.is_match(candidate),
        }
    }

    /// The raw name or pattern this matcher was built from
    pub fn as_str(&self) -> &str {
        match self {
            NameMatcher::Exact(name) => name,
            NameMatcher::Like { pattern, .. } => pattern,
        }
    }
}

impl std::fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameMatcher::Exact(name) => write!(f, "exact '{}'", name),
            NameMatcher::Like { pattern, .. } => write!(f, "like '{}'", pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_is_case_insensitive_prefix_match() {
        let matcher = NameMatcher::like("report").unwrap();

        assert!(matcher.matches("report-2024.csv"));
        assert!(matcher.matches("REPORT_FINAL"));
        assert!(matcher.matches("report"));
        assert!(!matcher.matches("monthly-report"));
    }

    #[test]
    fn test_like_does_not_require_full_match() {
        let matcher = NameMatcher::like("foo").unwrap();
        assert!(matcher.matches("foobar"));

        let matcher = NameMatcher::like(r"app-\d{4}").unwrap();
        assert!(matcher.matches("app-2024-01-01.log"));
        assert!(!matcher.matches("app-24.log"));
    }

    #[test]
    fn test_like_alternation_stays_anchored() {
        let matcher = NameMatcher::like("a|b").unwrap();

        assert!(matcher.matches("alpha"));
        assert!(matcher.matches("beta"));
        assert!(!matcher.matches("zeta-b"));
    }

    #[test]
    fn test_exact_matches_only_equal_names() {
        let matcher = NameMatcher::exact("logs").unwrap();

        assert!(matcher.matches("logs"));
        assert!(!matcher.matches("logs2"));
        assert!(!matcher.matches("LOGS"));
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        assert!(matches!(
            NameMatcher::like("report("),
            Err(ValidationError::InvalidPattern { .. })
        ));
        assert!(matches!(
            NameMatcher::exact(""),
            Err(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn test_from_flag_selects_variant() {
        assert!(matches!(
            NameMatcher::from_flag("logs", true).unwrap(),
            NameMatcher::Exact(_)
        ));
        assert!(matches!(
            NameMatcher::from_flag("logs", false).unwrap(),
            NameMatcher::Like { .. }
        ));
        assert_eq!(NameMatcher::like("x").unwrap().to_string(), "like 'x'");
    }
}
