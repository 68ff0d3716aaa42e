/// Validation errors for user-supplied filters, templates and dates
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // NameMatcher errors
    EmptyName,
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    // UrlTemplate errors
    InvalidTemplate {
        template: String,
        missing: Vec<String>,
    },

    // Date parsing errors
    InvalidDate {
        input: String,
    },
    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Name filter cannot be empty"),
            ValidationError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid like-name pattern '{}': {}", pattern, reason)
            }
            ValidationError::InvalidTemplate { template, missing } => {
                write!(
                    f,
                    "Invalid url template '{}': missing placeholder(s) {}",
                    template,
                    missing.join(", ")
                )
            }
            ValidationError::InvalidDate { input } => {
                write!(
                    f,
                    "Invalid date '{}' (expected 2024-01-15, 2024-01-15T10:30:00 or RFC 3339)",
                    input
                )
            }
            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': '{}' (expected: {})",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
