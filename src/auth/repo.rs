use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Actor role. Immutable after registration; carried in session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Hod,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Hod => "hod",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record as the handlers see it. The transient recovery columns
/// (`reset_token`/`reset_otp` and their expiries) are deliberately not
/// selected: they are written and consumed only by the recovery statements
/// below, never carried around in memory.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub roll_number: String,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, roll_number, created_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Resolve a roll number to a student. Non-student matches (placeholder
    /// roll numbers) are excluded in the query itself.
    pub async fn find_student_by_roll(
        db: &PgPool,
        roll_number: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE roll_number = $1 AND role = 'student'"
        ))
        .bind(roll_number)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. Email and roll-number uniqueness are enforced by
    /// the database; callers map the violated constraint to a conflict error.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        roll_number: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, role, roll_number) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(roll_number)
        .fetch_one(db)
        .await
    }

    /// List users, optionally filtered by role.
    pub async fn list(db: &PgPool, role: Option<Role>) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::text IS NULL OR role = $1) \
             ORDER BY created_at"
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Store a link-scheme recovery token with its expiry.
    pub async fn set_reset_token(
        db: &PgPool,
        user_id: Uuid,
        token: &str,
        expiry: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET reset_token = $2, reset_token_expiry = $3 WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .bind(expiry)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Store an OTP-scheme recovery code with its expiry.
    pub async fn set_reset_otp(
        db: &PgPool,
        user_id: Uuid,
        otp: &str,
        expiry: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET reset_otp = $2, reset_otp_expiry = $3 WHERE id = $1")
            .bind(user_id)
            .bind(otp)
            .bind(expiry)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Replace the password for the user holding `token`, clearing the token
    /// pair in the same statement. Validation and consumption are one atomic
    /// write: a replayed token matches zero rows. Returns whether a row was
    /// updated; false means invalid, expired, or already used.
    pub async fn consume_reset_token(
        db: &PgPool,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $2, reset_token = NULL, reset_token_expiry = NULL \
             WHERE reset_token = $1 AND reset_token_expiry > now()",
        )
        .bind(token)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// OTP counterpart of [`User::consume_reset_token`].
    pub async fn consume_reset_otp(
        db: &PgPool,
        email: &str,
        otp: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE users \
             SET password_hash = $2, reset_otp = NULL, reset_otp_expiry = NULL \
             WHERE email = $1 AND reset_otp = $3 AND reset_otp_expiry > now()",
        )
        .bind(email)
        .bind(password_hash)
        .bind(otp)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
