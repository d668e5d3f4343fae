use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| Error::Unauthorized("Token subject is not a user id".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(UserRole::Admin.as_str()))
    }

    pub fn ensure_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden("Operazione riservata agli amministratori".to_string()))
        }
    }

    /// Owners see their own records; admins see everything.
    pub fn ensure_can_access(&self, owner_id: Uuid) -> Result<()> {
        if self.is_admin() || self.user_id()? == owner_id {
            Ok(())
        } else {
            Err(Error::Forbidden("Accesso negato".to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingAuthorization,
    BadAuthorization,
    UnsupportedScheme,
    InvalidToken,
}

impl AuthRejection {
    fn code(self) -> &'static str {
        match self {
            AuthRejection::MissingAuthorization => "missing_authorization",
            AuthRejection::BadAuthorization => "bad_authorization",
            AuthRejection::UnsupportedScheme => "unsupported_scheme",
            AuthRejection::InvalidToken => "invalid_token",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": self.code() }))).into_response()
    }
}

/// Validates the `Authorization: Bearer` header of a request against the
/// configured HS256 secret.
pub fn decode_bearer(req: &Request) -> std::result::Result<Claims, AuthRejection> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection::MissingAuthorization)?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthRejection::BadAuthorization)?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthRejection::UnsupportedScheme)?;

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthRejection::InvalidToken)
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match decode_bearer(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match decode_bearer(&req) {
        Ok(claims) if claims.is_admin() => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(claims) => {
            tracing::warn!(sub = %claims.sub, "non-admin caller rejected");
            (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response()
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// Page-style guard: callers without a valid token are sent to the login
/// prompt with the requested path as `next`.
pub async fn redirect_unauthenticated(mut req: Request, next: Next) -> Response {
    match decode_bearer(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(_) => {
            let target = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            Redirect::to(&login_redirect(&crate::config::get_config().login_url, target))
                .into_response()
        }
    }
}

pub fn login_redirect(login_url: &str, next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{}{}next={}", login_url, separator, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_encodes_next() {
        assert_eq!(
            login_redirect("/login", "/api/tests/1/summary"),
            "/login?next=%2Fapi%2Ftests%2F1%2Fsummary"
        );
        assert_eq!(
            login_redirect("/auth?mode=x", "/a?b=c"),
            "/auth?mode=x&next=%2Fa%3Fb%3Dc"
        );
    }

    #[test]
    fn admin_role_is_case_insensitive() {
        let claims = Claims {
            sub: Uuid::nil().to_string(),
            exp: 0,
            role: Some("admin".into()),
        };
        assert!(claims.is_admin());
        let user = Claims {
            role: Some("USER".into()),
            ..claims.clone()
        };
        assert!(!user.is_admin());
        assert_eq!(user.user_id().unwrap(), Uuid::nil());
        assert!(user.ensure_can_access(Uuid::nil()).is_ok());
        assert!(matches!(
            user.ensure_can_access(Uuid::new_v4()),
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(user.ensure_admin(), Err(Error::Forbidden(_))));
        assert!(claims.ensure_can_access(Uuid::new_v4()).is_ok());
    }
}
