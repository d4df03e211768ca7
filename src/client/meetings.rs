//! Classroom meetings lookup
//!
//! Builds the Classrooms API path for a facility's meetings between two
//! dates and runs it through [`ApiClient::call`].

use chrono::NaiveDate;

use super::{ApiClient, CallResult, RequestOptions};
use crate::error::ApiError;

/// Date format the Classrooms API expects in query strings
pub const MEETINGS_DATE_FORMAT: &str = "%m-%d-%Y";

/// Accepted input formats, tried in order
const INPUT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", MEETINGS_DATE_FORMAT];

/// Parses a user-supplied date (`YYYY-MM-DD` or `MM-DD-YYYY`)
pub fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    let s = s.trim();
    INPUT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .ok_or_else(|| ApiError::InvalidArgument(format!("Invalid date: '{}'", s)))
}

/// Returns the meetings path for `facility_id` between `start` and `end`
///
/// # Returns
/// * `Ok(String)` - e.g. `/Curriculum/Classrooms/v1/Classrooms/AH1001/Meetings?startDate=01-05-2026&endDate=01-09-2026`
/// * `Err(ApiError::InvalidArgument)` - if the facility id is empty or would
///   change the path structure
pub fn meetings_path(
    facility_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<String, ApiError> {
    let facility_id = facility_id.trim();
    if facility_id.is_empty() {
        return Err(ApiError::InvalidArgument(
            "facility id must not be empty".to_string(),
        ));
    }
    if facility_id
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '&' | '#'))
    {
        return Err(ApiError::InvalidArgument(format!(
            "Invalid facility id: '{}'",
            facility_id
        )));
    }

    Ok(format!(
        "/Curriculum/Classrooms/v1/Classrooms/{}/Meetings?startDate={}&endDate={}",
        facility_id,
        start.format(MEETINGS_DATE_FORMAT),
        end.format(MEETINGS_DATE_FORMAT)
    ))
}

impl ApiClient {
    /// Fetches the meetings scheduled in a room between two dates
    ///
    /// Uses the default host and the client's global cache toggle.
    pub async fn get_meetings(
        &self,
        facility_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CallResult {
        let path = meetings_path(facility_id, start, end)?;
        self.call(RequestOptions::new(path)).await
    }
}
