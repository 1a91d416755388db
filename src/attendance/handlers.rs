use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use time::{macros::format_description, Date, OffsetDateTime};
use tracing::{error, info, instrument, warn};

use crate::{
    attendance::{
        dto::{MarkRequest, ReportQuery},
        repo::{AttendanceRecord, ReportRow, StatusCount},
    },
    auth::{
        dto::MessageResponse,
        jwt::AuthUser,
        repo::{Role, User},
    },
    error::{unique_violation, ApiError},
    state::AppState,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/mark", post(mark))
        .route("/attendance/student/roll/:roll_number", get(student_attendance))
        .route("/attendance/stats", get(stats))
        .route("/attendance/teacher/report", get(teacher_report))
}

/// Parse a day-granular date. Accepts a bare `YYYY-MM-DD` or a full ISO
/// timestamp, from which only the day part is used.
pub(crate) fn parse_day(input: &str) -> Result<Date, ApiError> {
    let fmt = format_description!("[year]-[month]-[day]");
    let input = input.trim();
    let day = input.get(..10).unwrap_or(input);
    Date::parse(day, &fmt)
        .map_err(|_| ApiError::Validation("Invalid date, expected YYYY-MM-DD".into()))
}

pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state, auth, payload))]
pub async fn mark(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<MarkRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.require(&[Role::Teacher])?;

    let student = User::find_student_by_roll(&state.db, payload.roll_number.trim())
        .await?
        .ok_or_else(|| {
            warn!(roll_number = %payload.roll_number, "mark for unknown student");
            ApiError::NotFound("Student not found".into())
        })?;

    let date = parse_day(&payload.date)?;
    let today = today_utc();
    if date != today {
        warn!(%date, %today, "mark for a day other than today");
        return Err(ApiError::Validation(
            "You can only mark attendance for the current day.".into(),
        ));
    }

    match AttendanceRecord::insert(
        &state.db,
        student.id,
        today,
        payload.status,
        auth.id,
        payload.class_name.as_deref(),
        payload.subject.as_deref(),
    )
    .await
    {
        Ok(record) => {
            info!(student_id = %student.id, marked_by = %auth.id, status = ?record.status, "attendance marked");
            Ok(Json(MessageResponse {
                message: "Attendance marked successfully".into(),
            }))
        }
        Err(e) => Err(match unique_violation(&e) {
            Some("attendance_student_id_date_key") => {
                warn!(student_id = %student.id, "attendance already marked");
                ApiError::Conflict("Attendance already marked for today.".into())
            }
            _ => {
                error!(error = %e, "insert attendance failed");
                ApiError::Unavailable
            }
        }),
    }
}

#[instrument(skip(state, auth))]
pub async fn student_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(roll_number): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    auth.require(&[Role::Student, Role::Teacher, Role::Hod])?;

    let student = User::find_student_by_roll(&state.db, roll_number.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".into()))?;

    // Students may only read their own records; staff roles see any student.
    if auth.role == Role::Student && auth.id != student.id {
        warn!(user_id = %auth.id, student_id = %student.id, "student requested another student's records");
        return Err(ApiError::Forbidden);
    }

    let records = AttendanceRecord::list_by_student(&state.db, student.id).await?;
    Ok(Json(records))
}

#[instrument(skip(state, auth))]
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<StatusCount>>, ApiError> {
    auth.require(&[Role::Hod])?;
    let counts = AttendanceRecord::stats(&state.db).await?;
    Ok(Json(counts))
}

#[instrument(skip(state, auth))]
pub async fn teacher_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filters): Query<ReportQuery>,
) -> Result<Json<Vec<ReportRow>>, ApiError> {
    auth.require(&[Role::Teacher])?;

    let date = filters.date.as_deref().map(parse_day).transpose()?;
    let rows = AttendanceRecord::teacher_report(
        &state.db,
        auth.id,
        date,
        filters.class_name.as_deref(),
        filters.subject.as_deref(),
    )
    .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parse_day_accepts_plain_dates() {
        assert_eq!(parse_day("2026-08-06").unwrap(), date!(2026 - 08 - 06));
        assert_eq!(parse_day(" 2026-08-06 ").unwrap(), date!(2026 - 08 - 06));
    }

    #[test]
    fn parse_day_takes_the_day_part_of_timestamps() {
        assert_eq!(
            parse_day("2026-08-06T09:30:00.000Z").unwrap(),
            date!(2026 - 08 - 06)
        );
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert!(parse_day("yesterday").is_err());
        assert!(parse_day("06-08-2026").is_err());
        assert!(parse_day("2026-13-01").is_err());
        assert!(parse_day("").is_err());
    }

    #[test]
    fn today_matches_itself() {
        // The current-day-only rule reduces to Date equality.
        assert_eq!(today_utc(), today_utc());
        assert_ne!(today_utc().previous_day().unwrap(), today_utc());
    }
}
