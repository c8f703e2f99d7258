use std::fmt;

/// Errors raised while producing the sync report.
///
/// None of these are fatal to the reporter: a `QueryFailure` skips its section,
/// `MalformedRow` and `InvalidField` skip a single row.
#[derive(Debug)]
pub enum ReportError {
    /// The backing store was unreachable or rejected the query.
    QueryFailure(sqlx::Error),
    /// A delimited row carried fewer fields than its section expects.
    MalformedRow {
        expected: usize,
        found: usize,
        line: String,
    },
    /// A field was present but could not be decoded.
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// Missing or invalid configuration.
    Config(String),
}

impl ReportError {
    /// Shorthand for building an `InvalidField` error.
    pub fn invalid_field(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ReportError::InvalidField {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::QueryFailure(e) => write!(f, "Query failed: {}", e),
            ReportError::MalformedRow {
                expected,
                found,
                line,
            } => write!(
                f,
                "Malformed row: expected {} fields, found {} ({:?})",
                expected, found, line
            ),
            ReportError::InvalidField {
                field,
                value,
                reason,
            } => write!(f, "Invalid {} {:?}: {}", field, value, reason),
            ReportError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::QueryFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ReportError {
    /// Converts a `sqlx::Error` into a `QueryFailure`.
    fn from(err: sqlx::Error) -> Self {
        ReportError::QueryFailure(err)
    }
}
