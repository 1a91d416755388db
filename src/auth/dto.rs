use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::{Role, User};

/// Request body for user registration. `rollNumber` is required for
/// students and ignored for everyone else.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub roll_number: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for both forgot-password flows.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for the link-scheme reset (token travels in the path).
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Request body for the OTP-scheme reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordOtpRequest {
    pub email: String,
    pub otp: String,
    pub password: String,
}

/// Non-sensitive view of a user returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub roll_number: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            roll_number: user.roll_number,
        }
    }
}

/// Profile view embedded in the login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub role: Role,
    pub roll_number: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Profile,
}

/// Response for the link-scheme forgot-password request. The link itself is
/// only present when the deployment explicitly opts in to exposing it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_link: Option<String>,
}

/// Plain confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_takes_camel_case_roll_number() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"S1","email":"s1@example.com","password":"password1","role":"student","rollNumber":"R1"}"#,
        )
        .unwrap();
        assert_eq!(req.roll_number.as_deref(), Some("R1"));
        assert_eq!(req.role, Role::Student);
    }

    #[test]
    fn register_request_roll_number_is_optional() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"T","email":"t@example.com","password":"password1","role":"teacher"}"#,
        )
        .unwrap();
        assert!(req.roll_number.is_none());
    }

    #[test]
    fn forgot_response_omits_absent_link() {
        let body = ForgotPasswordResponse {
            message: "Password reset link sent".into(),
            reset_link: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("resetLink"));

        let body = ForgotPasswordResponse {
            message: "Password reset link sent".into(),
            reset_link: Some("http://localhost:5173/reset-password/abc".into()),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"resetLink\""));
    }

    #[test]
    fn login_response_shape() {
        let body = LoginResponse {
            token: "jwt".into(),
            user: Profile {
                name: "S1".into(),
                role: Role::Student,
                roll_number: "R1".into(),
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"token\":\"jwt\""));
        assert!(json.contains("\"rollNumber\":\"R1\""));
        assert!(json.contains("\"role\":\"student\""));
    }
}
