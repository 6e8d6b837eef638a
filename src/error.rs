// region:    --- Imports
use crate::money::Amount;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;
// endregion: --- Imports

// region:    --- ApiError

/// 요청 경계에서 처리되는 서비스 에러
/// 각 variant는 하나의 HTTP 상태 코드에 대응하며, 내부 정보는 노출하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    /// 필드 단위 검증 실패
    #[error("입력값이 올바르지 않습니다.")]
    Validation(BTreeMap<String, String>),

    /// 존재하지 않는 리소스 조회
    #[error("{0} not found")]
    NotFound(&'static str),

    /// 인증이 필요한 요청에 세션 없음
    #[error("로그인이 필요합니다.")]
    Unauthorized,

    /// 로그인 실패 (존재하지 않는 계정과 비밀번호 오류를 구분하지 않음)
    #[error("Invalid username and/or password.")]
    InvalidCredentials,

    /// 입찰 거절: 현재 가격 이하의 입찰
    #[error("입찰 가격은 현재 가격보다 높아야 합니다.")]
    BidRejected { current_bid: Amount },

    /// 고유 제약 위반 (중복 사용자명 등)
    #[error("{0}")]
    IntegrityConflict(String),

    /// 라우트는 존재하지만 동작이 정의되지 않은 기능
    #[error("아직 구현되지 않은 기능입니다.")]
    NotImplemented,

    /// 데이터베이스 오류
    #[error("데이터베이스 오류가 발생했습니다.")]
    Database(sqlx::Error),

    /// 기타 내부 오류
    #[error("내부 오류가 발생했습니다.")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::BidRejected { .. } => (StatusCode::BAD_REQUEST, "LOW_BID"),
            ApiError::IntegrityConflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::NotImplemented => (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let mut body = json!({
            "error": self.to_string(),
            "code": code,
        });

        match &self {
            ApiError::Validation(fields) => {
                body["fields"] = json!(fields);
            }
            ApiError::BidRejected { current_bid } => {
                body["current_bid"] = json!(current_bid);
            }
            // 내부 오류는 로그에만 상세를 남김
            ApiError::Database(e) => {
                error!("{:<12} --> 데이터베이스 오류: {:?}", "Database", e);
            }
            ApiError::Internal(detail) => {
                error!("{:<12} --> 내부 오류: {}", "Main", detail);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource"),
            sqlx::Error::Database(db)
                if db.is_unique_violation() =>
            {
                ApiError::IntegrityConflict("이미 존재하는 값입니다.".to_string())
            }
            _ => ApiError::Database(err),
        }
    }
}

/// 단일 필드 검증 실패를 만드는 헬퍼
pub fn field_error(field: &str, message: impl Into<String>) -> ApiError {
    let mut fields = BTreeMap::new();
    fields.insert(field.to_string(), message.into());
    ApiError::Validation(fields)
}

// endregion: --- ApiError
