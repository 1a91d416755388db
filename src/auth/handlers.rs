use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
            MessageResponse, Profile, RegisterRequest, ResetPasswordOtpRequest,
            ResetPasswordRequest, UserSummary,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        recovery::{
            expiry_from_now, generate_otp, generate_reset_token, placeholder_roll_number,
            RESET_OTP_TTL, RESET_TOKEN_TTL,
        },
        repo::{Role, User},
    },
    error::{unique_violation, ApiError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/:token", post(reset_password))
        .route("/auth/forgot-password-otp", post(forgot_password_otp))
        .route("/auth/reset-password-otp", post(reset_password_otp))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    validate_password(&payload.password)?;

    // Students register with their real roll number; everyone else gets a
    // synthesized placeholder so the uniqueness index holds for every row.
    let roll_number = if payload.role == Role::Student {
        match payload.roll_number.as_deref().map(str::trim) {
            Some(roll) if !roll.is_empty() => roll.to_string(),
            _ => {
                warn!("student registration without roll number");
                return Err(ApiError::Validation(
                    "Roll Number is required for students".into(),
                ));
            }
        }
    } else {
        placeholder_roll_number(payload.role)
    };

    // Fast-path duplicate check for a friendly error; the unique index below
    // is what actually closes the race.
    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(
        &state.db,
        payload.name.trim(),
        &payload.email,
        &hash,
        payload.role,
        &roll_number,
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            return Err(match unique_violation(&e) {
                Some("users_email_key") => {
                    warn!(email = %payload.email, "email already registered");
                    ApiError::Conflict("Email already registered".into())
                }
                Some("users_roll_number_key") => {
                    warn!(roll_number = %roll_number, "roll number already registered");
                    ApiError::Conflict("Roll number already registered".into())
                }
                _ => {
                    error!(error = %e, "create user failed");
                    ApiError::Unavailable
                }
            })
        }
    };

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(UserSummary::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound("User not found".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Validation("Wrong password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: Profile {
            name: user.name,
            role: user.role,
            roll_number: user.roll_number,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "forgot password for unknown email");
            ApiError::NotFound("User not found".into())
        })?;

    let token = generate_reset_token();
    let expiry = expiry_from_now(RESET_TOKEN_TTL);
    User::set_reset_token(&state.db, user.id, &token, expiry).await?;

    let link = format!(
        "{}/{}",
        state.config.reset.base_url.trim_end_matches('/'),
        token
    );
    state
        .notifier
        .send(
            &user.email,
            "Password reset",
            &format!("Reset your password within 15 minutes: {link}"),
        )
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "reset link delivery failed");
            ApiError::Unavailable
        })?;

    info!(user_id = %user.id, "reset token issued");
    Ok(Json(ForgotPasswordResponse {
        message: "Password reset link sent".into(),
        reset_link: state.config.reset.expose_link.then_some(link),
    }))
}

#[instrument(skip(state, token, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.password)?;
    let hash = hash_password(&payload.password)?;

    // Single statement: validates the token, replaces the hash and clears
    // the token pair, so a secret can never be replayed.
    if !User::consume_reset_token(&state.db, &token, &hash).await? {
        warn!("reset with invalid or expired token");
        return Err(ApiError::Validation("Invalid or expired token".into()));
    }

    info!("password reset via token");
    Ok(Json(MessageResponse {
        message: "Password has been reset".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password_otp(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "otp request for unknown email");
            ApiError::NotFound("User not found".into())
        })?;

    let otp = generate_otp();
    let expiry = expiry_from_now(RESET_OTP_TTL);
    User::set_reset_otp(&state.db, user.id, &otp, expiry).await?;

    // The OTP travels only through the notification sink, never the
    // response body.
    state
        .notifier
        .send(
            &user.email,
            "Your password reset OTP",
            &format!("Your OTP is {otp}. It is valid for 10 minutes."),
        )
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "otp delivery failed");
            ApiError::Unavailable
        })?;

    info!(user_id = %user.id, "reset otp issued");
    Ok(Json(MessageResponse {
        message: "OTP sent to your email".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password_otp(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&payload.password)?;
    let email = payload.email.trim().to_lowercase();
    let hash = hash_password(&payload.password)?;

    if !User::consume_reset_otp(&state.db, &email, payload.otp.trim(), &hash).await? {
        // Wrong and expired are deliberately indistinguishable.
        warn!(email = %email, "reset with invalid or expired otp");
        return Err(ApiError::Validation("Invalid or expired OTP".into()));
    }

    info!(email = %email, "password reset via otp");
    Ok(Json(MessageResponse {
        message: "Password has been reset".into(),
    }))
}
