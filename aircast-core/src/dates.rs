use chrono::{DateTime, NaiveDate, Utc};

use crate::error::PipelineError;

/// Unix seconds at UTC midnight of a `YYYY-MM-DD` date.
pub fn to_unix_timestamp(date: &str) -> Result<i64, PipelineError> {
    let trimmed = date.trim();
    let day = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| PipelineError::InvalidDate(trimmed.to_string()))?;

    day.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp())
        .ok_or_else(|| PipelineError::InvalidDate(trimmed.to_string()))
}

pub fn from_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_year_2024_is_utc_midnight() {
        assert_eq!(to_unix_timestamp("2024-01-01"), Ok(1_704_067_200));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(to_unix_timestamp(" 1970-01-02 "), Ok(86_400));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for input in ["", "2024-02-30", "01/01/2024", "2024-1-1x"] {
            assert!(
                matches!(to_unix_timestamp(input), Err(PipelineError::InvalidDate(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn timestamp_back_to_datetime() {
        let dt = from_unix_timestamp(1_704_067_200).expect("in range");
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }
}
