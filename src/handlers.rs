// region:    --- Imports
use crate::auction::commands::{
    handle_add_comment, handle_create_listing, handle_place_bid, handle_toggle_watchlist,
    AddCommentCommand, CreateListingCommand, PlaceBidCommand,
};
use crate::auction::model::{Bid, Category, Comment, Listing};
use crate::auth::commands::{self as auth_commands, LoginCommand, RegisterCommand};
use crate::auth::extract::{clear_session_cookie, session_cookie, session_token, AuthUser, MaybeUser};
use crate::auth::model::User;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::query;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- Router

/// 라우터 설정
pub fn app(db_manager: Arc<DatabaseManager>) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_get_listings))
        .route("/categories", get(handle_get_categories))
        .route("/categories/:id", get(handle_get_category_listings))
        .route("/listing/:id", get(handle_get_listing_detail))
        .route("/create", post(handle_create))
        .route("/watchlist", get(handle_get_watchlist))
        .route(
            "/listing/:id/toggle_watchlist",
            post(handle_toggle_watchlist_route),
        )
        .route("/listing/:id/bid", post(handle_bid))
        .route("/listing/:id/comment", post(handle_comment))
        .route("/listing/:id/close_auction", post(handle_close_auction))
        .route("/register", post(handle_register))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(db_manager)
}

// endregion: --- Router

// region:    --- Responses

/// 상품 상세 응답: 상품, 입찰 이력(최신 순), 최고 입찰, 댓글(작성 순), 관심 목록 여부
#[derive(Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub bids: Vec<Bid>,
    pub highest_bid: Option<Bid>,
    pub comments: Vec<Comment>,
    pub in_watchlist: bool,
}

/// 카테고리별 상품 응답
#[derive(Serialize)]
pub struct CategoryListings {
    pub category: Category,
    pub listings: Vec<Listing>,
}

// endregion: --- Responses

// region:    --- Query Handlers

/// 전체 상품 조회
async fn handle_get_listings(
    State(db_manager): State<Arc<DatabaseManager>>,
) -> Result<impl IntoResponse, ApiError> {
    info!("{:<12} --> 전체 상품 조회", "HandlerQuery");
    let listings = query::handlers::get_all_listings(&db_manager).await?;
    Ok(Json(listings))
}

/// 카테고리 목록 조회
async fn handle_get_categories(
    State(db_manager): State<Arc<DatabaseManager>>,
) -> Result<impl IntoResponse, ApiError> {
    info!("{:<12} --> 카테고리 목록 조회", "HandlerQuery");
    let categories = query::handlers::get_categories(&db_manager).await?;
    Ok(Json(categories))
}

/// 카테고리별 상품 조회
async fn handle_get_category_listings(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "{:<12} --> 카테고리별 상품 조회 id: {}",
        "HandlerQuery", category_id
    );
    let category = query::handlers::get_category(&db_manager, category_id).await?;
    let listings = query::handlers::get_listings_by_category(&db_manager, category_id).await?;
    Ok(Json(CategoryListings { category, listings }))
}

/// 상품 상세 조회
/// 인증된 사용자에게만 관심 목록 여부를 채워서 응답함
async fn handle_get_listing_detail(
    State(db_manager): State<Arc<DatabaseManager>>,
    MaybeUser(user): MaybeUser,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!("{:<12} --> 상품 상세 조회 id: {}", "HandlerQuery", listing_id);
    let listing = query::handlers::get_listing(&db_manager, listing_id).await?;
    let bids = query::handlers::get_bid_history(&db_manager, listing_id).await?;
    let highest_bid = query::handlers::get_highest_bid(&db_manager, listing_id).await?;
    let comments = query::handlers::get_comments(&db_manager, listing_id).await?;
    let in_watchlist = match &user {
        Some(u) => query::handlers::is_watchlisted(&db_manager, u.id, listing_id).await?,
        None => false,
    };

    Ok(Json(ListingDetail {
        listing,
        bids,
        highest_bid,
        comments,
        in_watchlist,
    }))
}

/// 관심 목록 조회
async fn handle_get_watchlist(
    State(db_manager): State<Arc<DatabaseManager>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "{:<12} --> 관심 목록 조회 user_id: {}",
        "HandlerQuery", user.id
    );
    let listings = query::handlers::get_watchlist(&db_manager, user.id).await?;
    Ok(Json(listings))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 상품 등록 요청 처리
async fn handle_create(
    State(db_manager): State<Arc<DatabaseManager>>,
    AuthUser(user): AuthUser,
    Json(cmd): Json<CreateListingCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = handle_create_listing(cmd, &user, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// 입찰 요청 처리
async fn handle_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    AuthUser(user): AuthUser,
    Path(listing_id): Path<i64>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let accepted = handle_place_bid(listing_id, &user, cmd, &db_manager).await?;
    Ok(Json(serde_json::json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "current_bid": accepted.current_bid,
        "bid": accepted.bid,
    })))
}

/// 댓글 작성 요청 처리
async fn handle_comment(
    State(db_manager): State<Arc<DatabaseManager>>,
    AuthUser(user): AuthUser,
    Path(listing_id): Path<i64>,
    Json(cmd): Json<AddCommentCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = handle_add_comment(listing_id, &user, cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// 관심 목록 토글 요청 처리
async fn handle_toggle_watchlist_route(
    State(db_manager): State<Arc<DatabaseManager>>,
    AuthUser(user): AuthUser,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toggle = handle_toggle_watchlist(listing_id, &user, &db_manager).await?;
    Ok(Json(serde_json::json!({
        "status": toggle,
        "in_watchlist": toggle.in_watchlist(),
    })))
}

/// 경매 종료 요청 처리
/// 라우트만 존재하고 종료 정책(종료 권한, 낙찰자 결정)이 정해지지 않아 미구현 상태로 응답함
async fn handle_close_auction(
    State(db_manager): State<Arc<DatabaseManager>>,
    AuthUser(user): AuthUser,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "{:<12} --> 경매 종료 요청(미구현): listing_id={} user_id={}",
        "Command", listing_id, user.id
    );
    // 상품이 없으면 404를 먼저 돌려줌
    query::handlers::get_listing(&db_manager, listing_id).await?;
    Err::<(), _>(ApiError::NotImplemented)
}

// endregion: --- Command Handlers

// region:    --- Auth Handlers

/// 회원가입 요청 처리 (성공 시 바로 세션 시작)
async fn handle_register(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<RegisterCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) = auth_commands::handle_register(cmd, &db_manager).await?;
    Ok(session_response(StatusCode::CREATED, user, &session.token))
}

/// 로그인 요청 처리
async fn handle_login(
    State(db_manager): State<Arc<DatabaseManager>>,
    Json(cmd): Json<LoginCommand>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) = auth_commands::handle_login(cmd, &db_manager).await?;
    Ok(session_response(StatusCode::OK, user, &session.token))
}

/// 로그아웃 요청 처리 (세션이 없어도 성공)
async fn handle_logout(
    State(db_manager): State<Arc<DatabaseManager>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        auth_commands::close_session(&db_manager, token).await?;
    }
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie().to_string())],
        Json(serde_json::json!({ "message": "로그아웃되었습니다." })),
    ))
}

fn session_response(status: StatusCode, user: User, token: &str) -> impl IntoResponse {
    (
        status,
        [(header::SET_COOKIE, session_cookie(token).to_string())],
        Json(user),
    )
}

// endregion: --- Auth Handlers
