use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfig {
    /// Frontend URL the reset token is appended to.
    pub base_url: String,
    /// Return the reset link in the response body as well as sending it.
    /// Debug/compatibility posture only; leave off in production.
    pub expose_link: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub reset: ResetConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "rollcall".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "rollcall-users".into()),
            // Sessions are valid for one day unless overridden.
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let reset = ResetConfig {
            base_url: std::env::var("RESET_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173/reset-password".into()),
            expose_link: std::env::var("EXPOSE_RESET_LINK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };
        Ok(Self {
            database_url,
            jwt,
            reset,
        })
    }
}
