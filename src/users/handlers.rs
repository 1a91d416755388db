use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::{
        dto::UserSummary,
        jwt::AuthUser,
        repo::{Role, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub role: Option<Role>,
}

/// Staff directory: all users, optionally filtered by role, without
/// password hashes or recovery secrets.
#[instrument(skip(state, auth))]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    auth.require(&[Role::Teacher, Role::Hod])?;

    let users = User::list(&state.db, query.role).await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_filter_is_optional() {
        let q: UsersQuery = serde_json::from_str(r#"{"role":"student"}"#).unwrap();
        assert_eq!(q.role, Some(Role::Student));
        let q: UsersQuery = serde_json::from_str("{}").unwrap();
        assert!(q.role.is_none());
    }
}
