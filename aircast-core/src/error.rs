use thiserror::Error;

/// Failure of one stage of a search.
///
/// Every variant aborts the current search only; callers surface
/// [`PipelineError::user_message`] and stay ready for the next one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Geocoding returned zero candidates.
    #[error("no location matched the query")]
    NotFound,

    /// The upstream payload was failure-flagged or structurally invalid.
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// The request could not complete or the body was not valid JSON.
    #[error("network error: {0}")]
    Network(String),

    /// A user-entered date was not a valid `YYYY-MM-DD` value.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

impl PipelineError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::NotFound => "City not found.".to_string(),
            PipelineError::Upstream(_) => {
                "The weather service returned an error. Please try again.".to_string()
            }
            PipelineError::Network(_) => {
                "Could not reach the weather service. Check your connection.".to_string()
            }
            PipelineError::InvalidDate(input) => {
                format!("Invalid date ({input}). Dates use the YYYY-MM-DD format.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_city_message() {
        assert_eq!(PipelineError::NotFound.user_message(), "City not found.");
    }

    #[test]
    fn upstream_detail_stays_out_of_user_message() {
        let err = PipelineError::Upstream("cod 401: Invalid API key".into());

        assert!(!err.user_message().contains("401"));
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn invalid_date_echoes_input() {
        let err = PipelineError::InvalidDate("2024-13-01".into());
        assert!(err.user_message().contains("2024-13-01"));
    }
}
