/// 인증 관련 커맨드 처리
/// 1. 회원가입 (가입 즉시 세션 시작)
/// 2. 로그인 / 로그아웃
/// 3. 세션 조회 (만료 세션은 조회 시점에 지연 삭제)
// region:    --- Imports
use crate::auth::model::{Session, User};
use crate::auth::password;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;
// endregion: --- Imports

// 세션 유효 기간 (일)
pub const SESSION_TTL_DAYS: i64 = 14;

// region:    --- SQL
const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash, created_at)
    VALUES (?, ?, ?, ?)
    RETURNING id, username, email, password_hash, created_at
"#;

const GET_USER_BY_USERNAME: &str =
    "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?";

const INSERT_SESSION: &str = r#"
    INSERT INTO sessions (token, user_id, created_at, expires_at)
    VALUES (?, ?, ?, ?)
    RETURNING token, user_id, created_at, expires_at
"#;

const GET_SESSION: &str =
    "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?";

const GET_USER_BY_ID: &str =
    "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?";

const DELETE_SESSION: &str = "DELETE FROM sessions WHERE token = ?";
// endregion: --- SQL

// region:    --- Commands

/// 회원가입 명령
#[derive(Debug, Deserialize, Clone)]
pub struct RegisterCommand {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirmation: Option<String>,
}

/// 로그인 명령
#[derive(Debug, Deserialize, Clone)]
pub struct LoginCommand {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// 1. 회원가입
/// 중복 사용자명이면 IntegrityConflict, 성공 시 바로 세션을 연다
pub async fn handle_register(
    cmd: RegisterCommand,
    db_manager: &DatabaseManager,
) -> Result<(User, Session), ApiError> {
    info!("{:<12} --> 회원가입 요청: {:?}", "Auth", cmd.username);

    let mut fields = BTreeMap::new();
    let username = required_field(&mut fields, "username", cmd.username);
    let email = required_field(&mut fields, "email", cmd.email);
    let password = required_field(&mut fields, "password", cmd.password);
    if let (Some(p), c) = (&password, &cmd.confirmation) {
        if c.as_deref() != Some(p.as_str()) {
            fields.insert("confirmation".to_string(), "Passwords must match.".to_string());
        }
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }
    let (username, email, password) = (username.unwrap(), email.unwrap(), password.unwrap());

    let password_hash = password::hash_password(&password)?;

    let result = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let user = sqlx::query_as::<_, User>(INSERT_USER)
                    .bind(&username)
                    .bind(&email)
                    .bind(&password_hash)
                    .bind(Utc::now())
                    .fetch_one(&mut **tx)
                    .await?;

                let session = insert_session(tx, user.id).await?;
                Ok((user, session))
            })
        })
        .await;

    match result {
        Ok(ok) => Ok(ok),
        Err(ApiError::IntegrityConflict(_)) => Err(ApiError::IntegrityConflict(
            "Username already taken.".to_string(),
        )),
        Err(e) => Err(e),
    }
}

/// 2. 로그인
/// 존재하지 않는 계정과 비밀번호 불일치는 같은 에러로 응답함
pub async fn handle_login(
    cmd: LoginCommand,
    db_manager: &DatabaseManager,
) -> Result<(User, Session), ApiError> {
    info!("{:<12} --> 로그인 요청: {:?}", "Auth", cmd.username);

    let username = cmd.username.unwrap_or_default();
    let password = cmd.password.unwrap_or_default();

    let user = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(GET_USER_BY_USERNAME)
                    .bind(&username)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let session = open_session(db_manager, user.id).await?;
    Ok((user, session))
}

/// 세션 시작
pub async fn open_session(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Session, ApiError> {
    db_manager
        .transaction(|tx| Box::pin(async move { insert_session(tx, user_id).await }))
        .await
}

/// 세션 종료 (이미 없는 세션이어도 성공으로 취급)
pub async fn close_session(db_manager: &DatabaseManager, token: String) -> Result<(), ApiError> {
    info!("{:<12} --> 로그아웃", "Auth");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(DELETE_SESSION)
                    .bind(&token)
                    .execute(&mut **tx)
                    .await
                    .map_err(ApiError::from)?;
                Ok(())
            })
        })
        .await
}

/// 세션 토큰으로 사용자 조회
/// 만료된 세션은 이 시점에 삭제하고 익명으로 취급함 (백그라운드 청소 작업 없음)
pub async fn lookup_session(
    db_manager: &DatabaseManager,
    token: String,
) -> Result<Option<User>, ApiError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let session = sqlx::query_as::<_, Session>(GET_SESSION)
                    .bind(&token)
                    .fetch_optional(&mut **tx)
                    .await?;

                let Some(session) = session else {
                    return Ok(None);
                };

                if session.expires_at <= Utc::now() {
                    sqlx::query(DELETE_SESSION)
                        .bind(&token)
                        .execute(&mut **tx)
                        .await?;
                    return Ok(None);
                }

                let user = sqlx::query_as::<_, User>(GET_USER_BY_ID)
                    .bind(session.user_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                Ok(user)
            })
        })
        .await
}

async fn insert_session(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
) -> Result<Session, ApiError> {
    let now = Utc::now();
    let session = sqlx::query_as::<_, Session>(INSERT_SESSION)
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(now)
        .bind(now + Duration::days(SESSION_TTL_DAYS))
        .fetch_one(&mut **tx)
        .await?;
    Ok(session)
}

fn required_field(
    fields: &mut BTreeMap<String, String>,
    name: &str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            fields.insert(name.to_string(), "필수 입력 항목입니다.".to_string());
            None
        }
    }
}

// endregion: --- Commands
