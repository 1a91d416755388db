use serde::Deserialize;

use crate::attendance::repo::AttendanceStatus;

/// Request body for marking attendance. `date` is a `YYYY-MM-DD` string and
/// must name the current day.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    pub roll_number: String,
    pub date: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Query filters for the teacher report; all optional, all exact-match.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub date: Option<String>,
    pub class_name: Option<String>,
    pub subject: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_request_takes_camel_case_fields() {
        let req: MarkRequest = serde_json::from_str(
            r#"{"rollNumber":"R1","date":"2026-08-06","status":"Present","className":"10A"}"#,
        )
        .unwrap();
        assert_eq!(req.roll_number, "R1");
        assert_eq!(req.status, AttendanceStatus::Present);
        assert_eq!(req.class_name.as_deref(), Some("10A"));
        assert!(req.subject.is_none());
    }
}
