//! Extractor for the authenticated user.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No JWT cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but malformed
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session_cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Expired or invalid token. Keep checking the other
                        // cookies rather than failing the whole request.
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::auth::session::create_session_token;
    use crate::test_utils::create_test_config;
    use axum::extract::FromRequestParts as _;
    use sqlx::PgPool;
    use uuid::Uuid;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[sqlx::test]
    async fn test_valid_session_cookie(pool: PgPool) {
        let config = create_test_config();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "vendor".to_string(),
            email: "vendor@example.com".to_string(),
            role: Role::Supplier,
            supplier_id: Some(Uuid::new_v4()),
        };
        let token = create_session_token(&user, &config).unwrap();
        let cookie_name = config.auth.session_cookie_name.clone();
        let state = crate::test_utils::create_test_app_state(pool, config).await;

        let mut parts = parts_with_cookie(&format!("{cookie_name}={token}"));
        let extracted = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.id, user.id);
        assert_eq!(extracted.role, Role::Supplier);
    }

    #[sqlx::test]
    async fn test_missing_cookie_returns_unauthorized(pool: PgPool) {
        let config = create_test_config();
        let state = crate::test_utils::create_test_app_state(pool, config).await;

        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let error = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_garbage_cookie_returns_unauthorized(pool: PgPool) {
        let config = create_test_config();
        let cookie_name = config.auth.session_cookie_name.clone();
        let state = crate::test_utils::create_test_app_state(pool, config).await;

        let mut parts = parts_with_cookie(&format!("{cookie_name}=not.a.jwt"));
        let error = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
