use std::path::PathBuf;

// ============================================================================
// Names Lookup Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NamesError {
    #[error("year {0} not available")]
    YearUnavailable(i64),

    #[error("name {id} not found for year {year}")]
    NotFound { year: i64, id: i64 },

    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("duplicate id {id} for year {year} on line {line}")]
    DuplicateId { year: i64, id: i64, line: usize },
}

impl NamesError {
    /// True when the lookup itself found nothing, as opposed to a broken dataset
    pub fn is_not_found(&self) -> bool {
        matches!(self, NamesError::YearUnavailable(_) | NamesError::NotFound { .. })
    }
}

/// Rejected list / get parameters
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("incorrect request parameters, {0} must be >= 0")]
    Negative(&'static str),

    #[error("incorrect request parameters, page*limit must be <= count")]
    PageOutOfRange,

    #[error(transparent)]
    Names(#[from] NamesError),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::Names(e) if e.is_not_found())
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, QueryError::Negative(_) | QueryError::PageOutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_io_failure() {
        assert!(NamesError::NotFound { year: 2024, id: 7 }.is_not_found());
        assert!(NamesError::YearUnavailable(1999).is_not_found());

        let io = NamesError::Io {
            path: PathBuf::from("names.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!io.is_not_found());
        assert_eq!(io.to_string(), "failed to read dataset names.csv: missing");
    }

    #[test]
    fn test_query_error_classification() {
        assert!(QueryError::Negative("limit").is_invalid());
        assert!(QueryError::PageOutOfRange.is_invalid());
        assert!(QueryError::from(NamesError::YearUnavailable(1)).is_not_found());
        assert_eq!(
            QueryError::Negative("year").to_string(),
            "incorrect request parameters, year must be >= 0"
        );
    }
}
