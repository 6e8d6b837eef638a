// region:    --- Imports
use anyhow::{Context, Result};
use std::env;
// endregion: --- Imports

// region:    --- Config

/// 애플리케이션 설정 (환경변수에서 로드)
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 3000)
    pub port: u16,
    /// SQLite 연결 문자열
    pub database_url: String,
}

impl Config {
    /// 환경변수에서 설정 로드
    /// 필수 값이 잘못된 형식이면 시작 시점에 바로 실패 (fail-fast)
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://auction_platform.db?mode=rwc".to_string()),
        })
    }
}

// endregion: --- Config
