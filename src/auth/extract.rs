/// 세션 쿠키 기반 인증 추출기
/// AuthUser: 세션이 없으면 401, MaybeUser: 익명 허용
// region:    --- Imports
use crate::auth::commands::{self, SESSION_TTL_DAYS};
use crate::auth::model::User;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use std::sync::Arc;
// endregion: --- Imports

// 세션 쿠키 이름
pub const SESSION_COOKIE: &str = "sid";

// region:    --- Cookies

/// 요청 헤더에서 세션 토큰 추출
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value.to_owned()))
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// 세션 쿠키 생성 (HttpOnly, SameSite=Lax)
pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// 세션 쿠키 제거용 쿠키 생성
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

// endregion: --- Cookies

// region:    --- Extractors

/// 인증된 사용자 (세션 필수)
pub struct AuthUser(pub User);

/// 인증되었을 수도 있는 사용자 (익명 허용)
pub struct MaybeUser(pub Option<User>);

async fn user_from_parts(
    parts: &Parts,
    db_manager: &DatabaseManager,
) -> Result<Option<User>, ApiError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    commands::lookup_session(db_manager, token).await
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<DatabaseManager>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<DatabaseManager>,
    ) -> Result<Self, Self::Rejection> {
        match user_from_parts(parts, state).await? {
            Some(user) => Ok(AuthUser(user)),
            None => Err(ApiError::Unauthorized),
        }
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<DatabaseManager>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<DatabaseManager>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_parts(parts, state).await?))
    }
}

// endregion: --- Extractors

// endregion: --- Tests
