/// 경매 도메인 커맨드 처리
/// 1. 상품 등록
/// 2. 입찰 (입찰 기록 + 현재 가격 갱신을 한 트랜잭션으로)
/// 3. 댓글 작성
/// 4. 관심 목록 토글
// region:    --- Imports
use crate::auction::model::{Bid, BidAccepted, Comment, Listing, WatchlistToggle};
use crate::auth::model::User;
use crate::database::DatabaseManager;
use crate::error::{field_error, ApiError};
use crate::money::Amount;
use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- SQL
const INSERT_LISTING: &str = r#"
    INSERT INTO listings (name, description, current_bid, photo, category_id, listed_by, is_active, created_at)
    VALUES (?, ?, ?, ?, ?, ?, 1, ?)
    RETURNING id, name, description, current_bid, photo, category_id, listed_by, is_active, created_at
"#;

const CATEGORY_EXISTS: &str = "SELECT id FROM categories WHERE id = ?";

const LISTING_EXISTS: &str = "SELECT id FROM listings WHERE id = ?";

const GET_CURRENT_BID: &str = "SELECT current_bid FROM listings WHERE id = ?";

/// 현재 가격보다 높은 경우에만 갱신하는 단조 조건부 업데이트
/// 동시에 들어온 낮은 입찰이 나중에 커밋되어도 가격이 내려가지 않음
const RAISE_CURRENT_BID: &str =
    "UPDATE listings SET current_bid = ?1 WHERE id = ?2 AND current_bid < ?1";

const INSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, value, created_at)
    VALUES (?, ?, ?, ?)
    RETURNING id, listing_id, bidder_id, value, created_at
"#;

const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (listing_id, author_id, content, created_at)
    VALUES (?, ?, ?, ?)
    RETURNING id, listing_id, author_id, content, created_at
"#;

const DELETE_WATCH: &str = "DELETE FROM watchlist WHERE user_id = ? AND listing_id = ?";

const INSERT_WATCH: &str =
    "INSERT INTO watchlist (user_id, listing_id, created_at) VALUES (?, ?, ?)";
// endregion: --- SQL

// region:    --- Commands

/// 상품 등록 명령
#[derive(Debug, Deserialize, Clone)]
pub struct CreateListingCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub current_bid: Option<String>,
    pub category_id: Option<i64>,
    pub photo: Option<String>,
}

/// 입찰 명령
#[derive(Debug, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub value: Option<String>,
}

/// 댓글 작성 명령
#[derive(Debug, Deserialize, Clone)]
pub struct AddCommentCommand {
    pub content: Option<String>,
}

/// 1. 상품 등록
/// 필수 필드 누락/금액 형식 오류는 필드 단위 에러로 모아서 반환하고 아무것도 저장하지 않음
pub async fn handle_create_listing(
    cmd: CreateListingCommand,
    owner: &User,
    db_manager: &DatabaseManager,
) -> Result<Listing, ApiError> {
    info!("{:<12} --> 상품 등록 요청 처리 시작: {:?}", "Command", cmd);

    let mut fields = BTreeMap::new();

    let name = match cmd.name.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            fields.insert("name".to_string(), "필수 입력 항목입니다.".to_string());
            None
        }
    };
    let description = match cmd.description.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            fields.insert("description".to_string(), "필수 입력 항목입니다.".to_string());
            None
        }
    };
    let current_bid = match cmd.current_bid.as_deref() {
        Some(raw) => match raw.parse::<Amount>() {
            Ok(v) => Some(v),
            Err(e) => {
                fields.insert("current_bid".to_string(), e.to_string());
                None
            }
        },
        None => {
            fields.insert("current_bid".to_string(), "필수 입력 항목입니다.".to_string());
            None
        }
    };
    if cmd.category_id.is_none() {
        fields.insert("category_id".to_string(), "필수 입력 항목입니다.".to_string());
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation(fields));
    }

    let (name, description, current_bid) =
        (name.unwrap(), description.unwrap(), current_bid.unwrap());
    let category_id = cmd.category_id.unwrap();
    let photo = cmd.photo;
    let owner_id = owner.id;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 카테고리 확인
                let category = sqlx::query(CATEGORY_EXISTS)
                    .bind(category_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                if category.is_none() {
                    return Err(field_error("category_id", "존재하지 않는 카테고리입니다."));
                }

                let listing = sqlx::query_as::<_, Listing>(INSERT_LISTING)
                    .bind(&name)
                    .bind(&description)
                    .bind(current_bid)
                    .bind(&photo)
                    .bind(category_id)
                    .bind(owner_id)
                    .bind(Utc::now())
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(listing)
            })
        })
        .await
}

/// 2. 입찰
/// 현재 가격보다 높은 경우에만 수락하고, 입찰 기록과 가격 갱신을 같은 트랜잭션으로 커밋함
/// 가격 갱신이 단조 조건부이므로 동시 입찰이 서로 덮어써도 최종 가격은 최고 입찰가로 수렴함
pub async fn handle_place_bid(
    listing_id: i64,
    bidder: &User,
    cmd: PlaceBidCommand,
    db_manager: &DatabaseManager,
) -> Result<BidAccepted, ApiError> {
    info!(
        "{:<12} --> 입찰 요청 처리 시작: listing_id={} {:?}",
        "Command", listing_id, cmd
    );

    let value = match cmd.value.as_deref() {
        Some(raw) => raw
            .parse::<Amount>()
            .map_err(|e| field_error("value", e.to_string()))?,
        None => return Err(field_error("value", "필수 입력 항목입니다.")),
    };
    let bidder_id = bidder.id;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 가격 갱신을 먼저 시도해서 쓰기 잠금을 잡음
                let updated = sqlx::query(RAISE_CURRENT_BID)
                    .bind(value)
                    .bind(listing_id)
                    .execute(&mut **tx)
                    .await?;

                if updated.rows_affected() == 0 {
                    // 상품이 없거나, 현재 가격 이하의 입찰
                    let current: Option<Amount> = sqlx::query_scalar(GET_CURRENT_BID)
                        .bind(listing_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    return match current {
                        Some(current_bid) => {
                            warn!(
                                "{:<12} --> 입찰 거절: value={} current_bid={}",
                                "Command", value, current_bid
                            );
                            Err(ApiError::BidRejected { current_bid })
                        }
                        None => Err(ApiError::NotFound("listing")),
                    };
                }

                let bid = sqlx::query_as::<_, Bid>(INSERT_BID)
                    .bind(listing_id)
                    .bind(bidder_id)
                    .bind(value)
                    .bind(Utc::now())
                    .fetch_one(&mut **tx)
                    .await?;

                info!(
                    "{:<12} --> 입찰 수락: listing_id={} value={}",
                    "Command", listing_id, value
                );
                Ok(BidAccepted {
                    bid,
                    current_bid: value,
                })
            })
        })
        .await
}

/// 3. 댓글 작성
pub async fn handle_add_comment(
    listing_id: i64,
    author: &User,
    cmd: AddCommentCommand,
    db_manager: &DatabaseManager,
) -> Result<Comment, ApiError> {
    info!(
        "{:<12} --> 댓글 작성 요청 처리 시작: listing_id={}",
        "Command", listing_id
    );

    let content = match cmd.content.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return Err(field_error("content", "필수 입력 항목입니다.")),
    };
    let author_id = author.id;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let listing = sqlx::query(LISTING_EXISTS)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                if listing.is_none() {
                    return Err(ApiError::NotFound("listing"));
                }

                let comment = sqlx::query_as::<_, Comment>(INSERT_COMMENT)
                    .bind(listing_id)
                    .bind(author_id)
                    .bind(&content)
                    .bind(Utc::now())
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(comment)
            })
        })
        .await
}

/// 4. 관심 목록 토글
/// (user, listing) 쌍에 항목이 있으면 삭제, 없으면 추가
/// 고유 제약이 쌍당 최대 한 건을 보장함
pub async fn handle_toggle_watchlist(
    listing_id: i64,
    user: &User,
    db_manager: &DatabaseManager,
) -> Result<WatchlistToggle, ApiError> {
    info!(
        "{:<12} --> 관심 목록 토글: listing_id={} user_id={}",
        "Command", listing_id, user.id
    );

    let user_id = user.id;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let listing = sqlx::query(LISTING_EXISTS)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await?;
                if listing.is_none() {
                    return Err(ApiError::NotFound("listing"));
                }

                let deleted = sqlx::query(DELETE_WATCH)
                    .bind(user_id)
                    .bind(listing_id)
                    .execute(&mut **tx)
                    .await?;
                if deleted.rows_affected() > 0 {
                    return Ok(WatchlistToggle::Removed);
                }

                sqlx::query(INSERT_WATCH)
                    .bind(user_id)
                    .bind(listing_id)
                    .bind(Utc::now())
                    .execute(&mut **tx)
                    .await?;
                Ok(WatchlistToggle::Added)
            })
        })
        .await
}

// endregion: --- Commands
