use crate::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 출품 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub current_bid: Amount,
    pub photo: Option<String>,
    pub category_id: i64,
    pub listed_by: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// 카테고리 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub photo: Option<String>,
}

// 카테고리 + 소속 상품 수 (목록 화면용)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub photo: Option<String>,
    pub listing_count: i64,
}

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub value: Amount,
    pub created_at: DateTime<Utc>,
}

// 댓글 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// 관심 목록 토글 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchlistToggle {
    Added,
    Removed,
}

impl WatchlistToggle {
    pub fn in_watchlist(self) -> bool {
        matches!(self, WatchlistToggle::Added)
    }
}

/// 수락된 입찰과 갱신된 현재 가격
#[derive(Debug, Clone, Serialize)]
pub struct BidAccepted {
    pub bid: Bid,
    pub current_bid: Amount,
}
