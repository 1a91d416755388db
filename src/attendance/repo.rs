use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

/// Attendance status for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One marking event. Never updated or deleted; the (student, date) pair is
/// unique at the store level.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub date: Date,
    pub status: AttendanceStatus,
    pub marked_by: Uuid,
    pub class_name: Option<String>,
    pub subject: Option<String>,
}

/// Aggregate count per status, for the HOD dashboard.
#[derive(Debug, Serialize, FromRow)]
pub struct StatusCount {
    pub status: AttendanceStatus,
    pub count: i64,
}

/// A teacher-report row: the record joined with the student it refers to.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub roll_number: String,
    pub date: Date,
    pub status: AttendanceStatus,
    pub class_name: Option<String>,
    pub subject: Option<String>,
}

const RECORD_COLUMNS: &str = "id, student_id, date, status, marked_by, class_name, subject";

impl AttendanceRecord {
    /// Insert one mark. The unique index on (student_id, date) is the
    /// check: a concurrent duplicate loses with a unique violation the
    /// caller maps to the already-marked conflict.
    pub async fn insert(
        db: &PgPool,
        student_id: Uuid,
        date: Date,
        status: AttendanceStatus,
        marked_by: Uuid,
        class_name: Option<&str>,
        subject: Option<&str>,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        sqlx::query_as::<_, AttendanceRecord>(&format!(
            "INSERT INTO attendance (student_id, date, status, marked_by, class_name, subject) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RECORD_COLUMNS}"
        ))
        .bind(student_id)
        .bind(date)
        .bind(status)
        .bind(marked_by)
        .bind(class_name)
        .bind(subject)
        .fetch_one(db)
        .await
    }

    /// All records for one student, newest day first.
    pub async fn list_by_student(
        db: &PgPool,
        student_id: Uuid,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM attendance \
             WHERE student_id = $1 \
             ORDER BY date DESC"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Counts grouped by status across all records.
    pub async fn stats(db: &PgPool) -> anyhow::Result<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM attendance GROUP BY status",
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Records marked by one teacher, joined with student name and roll
    /// number, optionally narrowed by exact day, class or subject. Dates are
    /// stored day-granular, so the day filter is plain equality.
    pub async fn teacher_report(
        db: &PgPool,
        marked_by: Uuid,
        date: Option<Date>,
        class_name: Option<&str>,
        subject: Option<&str>,
    ) -> anyhow::Result<Vec<ReportRow>> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT a.id, a.student_id, u.name AS student_name, u.roll_number, \
                    a.date, a.status, a.class_name, a.subject \
             FROM attendance a \
             JOIN users u ON u.id = a.student_id \
             WHERE a.marked_by = $1 \
               AND ($2::date IS NULL OR a.date = $2) \
               AND ($3::text IS NULL OR a.class_name = $3) \
               AND ($4::text IS NULL OR a.subject = $4) \
             ORDER BY a.date DESC, a.created_at DESC",
        )
        .bind(marked_by)
        .bind(date)
        .bind(class_name)
        .bind(subject)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_capitalized() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Present).unwrap(),
            "\"Present\""
        );
        assert_eq!(
            serde_json::from_str::<AttendanceStatus>("\"Absent\"").unwrap(),
            AttendanceStatus::Absent
        );
        assert!(serde_json::from_str::<AttendanceStatus>("\"present\"").is_err());
    }
}
