// region:    --- Imports
use super::queries;
use crate::auction::model::{Bid, Category, CategorySummary, Comment, Listing};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 전체 상품 조회
pub async fn get_all_listings(db_manager: &DatabaseManager) -> Result<Vec<Listing>, ApiError> {
    info!("{:<12} --> 전체 상품 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_ALL_LISTINGS)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

/// 상품 조회
pub async fn get_listing(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Listing, ApiError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(ApiError::NotFound("listing"))
            })
        })
        .await
}

/// 카테고리 목록 조회 (소속 상품 수 포함)
pub async fn get_categories(
    db_manager: &DatabaseManager,
) -> Result<Vec<CategorySummary>, ApiError> {
    info!("{:<12} --> 카테고리 목록 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, CategorySummary>(queries::GET_CATEGORIES)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

/// 카테고리 조회
pub async fn get_category(
    db_manager: &DatabaseManager,
    category_id: i64,
) -> Result<Category, ApiError> {
    info!("{:<12} --> 카테고리 조회 id: {}", "Query", category_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Category>(queries::GET_CATEGORY)
                    .bind(category_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(ApiError::NotFound("category"))
            })
        })
        .await
}

/// 카테고리별 상품 조회
pub async fn get_listings_by_category(
    db_manager: &DatabaseManager,
    category_id: i64,
) -> Result<Vec<Listing>, ApiError> {
    info!("{:<12} --> 카테고리별 상품 조회 id: {}", "Query", category_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_LISTINGS_BY_CATEGORY)
                    .bind(category_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

/// 입찰 이력 조회 (최신 순)
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Vec<Bid>, ApiError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
                    .bind(listing_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

/// 최고 입찰 조회
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Bid>, ApiError> {
    info!("{:<12} --> 최고 입찰 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

/// 댓글 조회 (작성 순)
pub async fn get_comments(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Vec<Comment>, ApiError> {
    info!("{:<12} --> 댓글 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Comment>(queries::GET_COMMENTS)
                    .bind(listing_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

/// 관심 목록 등록 여부 조회
pub async fn is_watchlisted(
    db_manager: &DatabaseManager,
    user_id: i64,
    listing_id: i64,
) -> Result<bool, ApiError> {
    info!(
        "{:<12} --> 관심 목록 등록 여부 조회 user_id: {} listing_id: {}",
        "Query", user_id, listing_id
    );
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let count: i64 = sqlx::query_scalar(queries::IS_WATCHLISTED)
                    .bind(user_id)
                    .bind(listing_id)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(count > 0)
            })
        })
        .await
}

/// 사용자의 관심 목록 상품 조회
pub async fn get_watchlist(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Listing>, ApiError> {
    info!("{:<12} --> 관심 목록 조회 user_id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_WATCHLIST)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(ApiError::from)
            })
        })
        .await
}

// endregion: --- Query Handlers
