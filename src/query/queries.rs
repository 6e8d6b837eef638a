/// 전체 상품 조회 (등록 순)
pub const GET_ALL_LISTINGS: &str =
    "SELECT id, name, description, current_bid, photo, category_id, listed_by, is_active, created_at FROM listings ORDER BY id";

/// 상품 조회
pub const GET_LISTING: &str =
    "SELECT id, name, description, current_bid, photo, category_id, listed_by, is_active, created_at FROM listings WHERE id = ?";

/// 카테고리 목록 조회 (소속 상품 수 포함)
pub const GET_CATEGORIES: &str = r#"
    SELECT c.id, c.name, c.photo, COUNT(l.id) AS listing_count
    FROM categories c
    LEFT JOIN listings l ON l.category_id = c.id
    GROUP BY c.id, c.name, c.photo
    ORDER BY c.id
"#;

/// 카테고리 조회
pub const GET_CATEGORY: &str = "SELECT id, name, photo FROM categories WHERE id = ?";

/// 카테고리별 상품 조회 (등록 순)
pub const GET_LISTINGS_BY_CATEGORY: &str =
    "SELECT id, name, description, current_bid, photo, category_id, listed_by, is_active, created_at FROM listings WHERE category_id = ? ORDER BY id";

/// 입찰 이력 조회 (최신 순)
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, listing_id, bidder_id, value, created_at
    FROM bids
    WHERE listing_id = ?
    ORDER BY created_at DESC, id DESC
"#;

/// 최고 입찰 조회 (동액이면 먼저 제출된 입찰, 그 다음 낮은 id)
pub const GET_HIGHEST_BID: &str = r#"
    SELECT id, listing_id, bidder_id, value, created_at
    FROM bids
    WHERE listing_id = ?
    ORDER BY value DESC, created_at ASC, id ASC
    LIMIT 1
"#;

/// 댓글 조회 (작성 순)
pub const GET_COMMENTS: &str = r#"
    SELECT id, listing_id, author_id, content, created_at
    FROM comments
    WHERE listing_id = ?
    ORDER BY created_at ASC, id ASC
"#;

/// 관심 목록 등록 여부 조회
pub const IS_WATCHLISTED: &str =
    "SELECT COUNT(*) FROM watchlist WHERE user_id = ? AND listing_id = ?";

/// 사용자의 관심 목록 상품 조회 (담은 순)
pub const GET_WATCHLIST: &str = r#"
    SELECT l.id, l.name, l.description, l.current_bid, l.photo, l.category_id, l.listed_by, l.is_active, l.created_at
    FROM listings l
    JOIN watchlist w ON w.listing_id = l.id
    WHERE w.user_id = ?
    ORDER BY w.id
"#;
