use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::encode;
use std::sync::Arc;
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::config::Config;
use crate::entities::sea_orm_active_enums::Role;
use crate::web::api::ErrorResponse;

pub mod api;

/// Name of the cookie carrying the session JWT.
pub const AUTH_COOKIE: &str = "auth_token";

/// Represents the currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// Creates a new CurrentUser instance.
    pub fn new(id: i32, email: String, role: Role) -> Self {
        Self { id, email, role }
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.email, claims.role)
    }
}

/// Authentication state containing the JWT secret and session cookie settings.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub session_max_age: chrono::Duration,
    pub cookie_secure: bool,
}

impl AuthState {
    /// Creates a new AuthState from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            session_max_age: chrono::Duration::days(config.session_max_age_days),
            cookie_secure: config.cookie_secure,
        }
    }

    /// Builds the session cookie for a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, token))
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.session_max_age.num_seconds()))
            .path("/")
            .build()
    }

    /// Builds the removal cookie used on logout.
    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, "")).path("/").build()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub exp: usize,  // Expiry time of the token
    pub iat: usize,  // Issued at time of the token
    pub sub: i32,    // Id of the authenticated user
    pub email: String,
    pub role: Role,
}

pub async fn encode_jwt(user: &CurrentUser, state: &AuthState) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let exp = (now + state.session_max_age).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claims = Claims {
        exp,
        iat,
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    let jwt = encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )?;
    Ok(jwt)
}

pub async fn decode_jwt(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let token_data = jsonwebtoken::decode(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Pulls the session token from the `Authorization: Bearer` header, falling back to the cookie.
fn session_token<'a>(headers: &'a HeaderMap, jar: &'a CookieJar) -> Option<&'a str> {
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    bearer.or_else(|| jar.get(AUTH_COOKIE).map(|cookie| cookie.value()))
}

/// Authentication middleware that checks for a valid JWT and sets the CurrentUser extension.
/// This middleware only populates the extension and never rejects a request.
pub async fn auth_user_middleware(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(&headers, &jar) {
        match decode_jwt(token, &state.jwt_secret).await {
            Ok(claims) => {
                request.extensions_mut().insert(CurrentUser::from(claims));
            }
            Err(err) => tracing::debug!("Ignoring invalid session token: {}", err),
        }
    }

    next.run(request).await
}

/// Middleware that ensures the current user is authenticated.
/// Returns UNAUTHORIZED if the CurrentUser extension is not found in the request.
/// This middleware should be applied after auth_user_middleware.
pub async fn require_auth_middleware(request: Request, next: Next) -> Response {
    let is_authenticated = request.extensions().get::<CurrentUser>().is_some();

    if !is_authenticated {
        let error_response = ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: "Authentication required to access this resource".to_string(),
        };
        return (StatusCode::UNAUTHORIZED, Json(error_response)).into_response();
    }

    next.run(request).await
}

/// Custom span maker that keeps auth routes out of detailed request logging.
#[derive(Clone, Debug)]
pub struct FilteredMakeSpan;

impl<B> MakeSpan<B> for FilteredMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let uri = request.uri();
        let method = request.method();
        let matched_path = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);

        if uri.path().starts_with("/api/auth") {
            tracing::info_span!(
                "request",
                method = %method,
                path = %uri.path(),
                matched_path,
                sensitive_route = true,
            )
        } else {
            tracing::info_span!(
                "request",
                method = %method,
                uri = %uri,
                matched_path,
            )
        }
    }
}
