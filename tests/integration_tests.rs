use auction_platform::database::DatabaseManager;
use auction_platform::handlers;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

/// 인메모리 데이터베이스로 서버를 임시 포트에 띄우고 베이스 URL을 돌려줌
async fn spawn_server() -> String {
    let db_manager = Arc::new(DatabaseManager::new_in_memory().await.unwrap());
    db_manager.initialize_database().await.unwrap();

    let app = handlers::app(Arc::clone(&db_manager));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    format!("http://{addr}")
}

/// 세션 쿠키를 유지하는 클라이언트
fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

/// 회원가입 (성공 시 클라이언트에 세션 쿠키가 남음)
async fn register(client: &Client, base: &str, username: &str) -> Value {
    let response = client
        .post(format!("{base}/register"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret-password",
            "confirmation": "secret-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

/// 상품 등록
async fn create_listing(client: &Client, base: &str, name: &str, price: &str) -> Value {
    let response = client
        .post(format!("{base}/create"))
        .json(&json!({
            "name": name,
            "description": format!("{name} 설명"),
            "current_bid": price,
            "category_id": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

/// 경매 전체 흐름 테스트: 등록 → 출품 → 입찰/거절 → 상세 확인
#[tokio::test]
async fn test_auction_flow() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;

    let listing = create_listing(&seller, &base, "Lamp", "10.00").await;
    let listing_id = listing["id"].as_i64().unwrap();
    assert_eq!(listing["current_bid"], "10.00");

    // 전체 목록에 노출
    let index: Value = seller
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(index.as_array().unwrap().len(), 1);

    let bidder = client();
    register(&bidder, &base, "bidder").await;

    // 12.00 입찰 수락
    let response = bidder
        .post(format!("{base}/listing/{listing_id}/bid"))
        .json(&json!({ "value": "12.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["current_bid"], "12.00");

    // 11.00 입찰 거절, 가격 유지
    let response = bidder
        .post(format!("{base}/listing/{listing_id}/bid"))
        .json(&json!({ "value": "11.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "LOW_BID");
    assert_eq!(body["current_bid"], "12.00");

    // 15.00 입찰 수락
    let response = bidder
        .post(format!("{base}/listing/{listing_id}/bid"))
        .json(&json!({ "value": "15.00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 상세 조회: 현재 가격 == 최고 입찰, 입찰 이력은 최신 순
    let detail: Value = bidder
        .get(format!("{base}/listing/{listing_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["listing"]["current_bid"], "15.00");
    assert_eq!(detail["highest_bid"]["value"], "15.00");
    let bids = detail["bids"].as_array().unwrap();
    assert_eq!(bids.len(), 2);
    assert_eq!(bids[0]["value"], "15.00");
    assert_eq!(bids[1]["value"], "12.00");
}

/// 인증 게이트 테스트 (익명 요청은 401)
#[tokio::test]
async fn test_auth_required_routes() {
    let base = spawn_server().await;
    let anonymous = client();

    for (method, path, body) in [
        ("POST", "/create", Some(json!({ "name": "Lamp" }))),
        ("GET", "/watchlist", None),
        ("POST", "/listing/1/bid", Some(json!({ "value": "1.00" }))),
        ("POST", "/listing/1/comment", Some(json!({ "content": "hi" }))),
        ("POST", "/listing/1/toggle_watchlist", None),
        ("POST", "/listing/1/close_auction", None),
    ] {
        let request = match method {
            "GET" => anonymous.get(format!("{base}{path}")),
            _ => {
                let builder = anonymous.post(format!("{base}{path}"));
                match body {
                    Some(json) => builder.json(&json),
                    None => builder,
                }
            }
        };
        let response = request.send().await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {path}"
        );
    }
}

/// 회원가입/로그인/로그아웃 테스트
#[tokio::test]
async fn test_register_login_logout() {
    let base = spawn_server().await;
    let alice = client();
    let user = register(&alice, &base, "alice").await;
    assert_eq!(user["username"], "alice");
    assert!(user.get("password_hash").is_none());

    // 중복 사용자명은 409, 첫 사용자는 영향 없음
    let response = client()
        .post(format!("{base}/register"))
        .json(&json!({
            "username": "alice",
            "email": "alice2@example.com",
            "password": "other-password",
            "confirmation": "other-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Username already taken.");

    // 비밀번호 확인 불일치는 400
    let response = client()
        .post(format!("{base}/register"))
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "secret-password",
            "confirmation": "different",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fields"]["confirmation"], "Passwords must match.");

    // 로그인 실패는 계정 유무와 무관하게 같은 메시지
    let response = client()
        .post(format!("{base}/login"))
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid username and/or password.");

    // 로그인 성공 후 인증 라우트 접근 가능
    let fresh = client();
    let response = fresh
        .post(format!("{base}/login"))
        .json(&json!({ "username": "alice", "password": "secret-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = fresh.get(format!("{base}/watchlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 로그아웃 후에는 다시 401, 로그아웃은 멱등
    let response = fresh.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = fresh.get(format!("{base}/watchlist")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = fresh.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// 관심 목록 흐름 테스트 (토글 두 번이면 원래 상태)
#[tokio::test]
async fn test_watchlist_flow() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;
    let listing = create_listing(&seller, &base, "Lamp", "10.00").await;
    let listing_id = listing["id"].as_i64().unwrap();

    let watcher = client();
    register(&watcher, &base, "watcher").await;

    let body: Value = watcher
        .post(format!("{base}/listing/{listing_id}/toggle_watchlist"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "Added");
    assert_eq!(body["in_watchlist"], true);

    let watchlist: Value = watcher
        .get(format!("{base}/watchlist"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(watchlist.as_array().unwrap().len(), 1);
    assert_eq!(watchlist[0]["id"], listing_id);

    // 상세 조회에도 반영
    let detail: Value = watcher
        .get(format!("{base}/listing/{listing_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["in_watchlist"], true);

    // 익명 조회는 항상 false
    let detail: Value = client()
        .get(format!("{base}/listing/{listing_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["in_watchlist"], false);

    let body: Value = watcher
        .post(format!("{base}/listing/{listing_id}/toggle_watchlist"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "Removed");
    assert_eq!(body["in_watchlist"], false);

    let watchlist: Value = watcher
        .get(format!("{base}/watchlist"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(watchlist.as_array().unwrap().is_empty());
}

/// 댓글 흐름 테스트
#[tokio::test]
async fn test_comment_flow() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;
    let listing = create_listing(&seller, &base, "Lamp", "10.00").await;
    let listing_id = listing["id"].as_i64().unwrap();

    let response = seller
        .post(format!("{base}/listing/{listing_id}/comment"))
        .json(&json!({ "content": "멋진 램프네요" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // 빈 댓글은 400
    let response = seller
        .post(format!("{base}/listing/{listing_id}/comment"))
        .json(&json!({ "content": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let detail: Value = seller
        .get(format!("{base}/listing/{listing_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "멋진 램프네요");
}

/// 카테고리 브라우징 테스트
#[tokio::test]
async fn test_category_browsing() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;
    create_listing(&seller, &base, "Lamp", "10.00").await;

    let categories: Value = client()
        .get(format!("{base}/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let categories = categories.as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(categories[0]["listing_count"], 1);

    let matches: Value = client()
        .get(format!("{base}/categories/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(matches["listings"].as_array().unwrap().len(), 1);

    let response = client()
        .get(format!("{base}/categories/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 존재하지 않는 상품 조회 테스트
#[tokio::test]
async fn test_listing_not_found() {
    let base = spawn_server().await;
    let response = client()
        .get(format!("{base}/listing/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 경매 종료 스텁 테스트 (501, 없는 상품이면 404)
#[tokio::test]
async fn test_close_auction_stub() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;
    let listing = create_listing(&seller, &base, "Lamp", "10.00").await;
    let listing_id = listing["id"].as_i64().unwrap();

    let response = seller
        .post(format!("{base}/listing/{listing_id}/close_auction"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    // 종료되지 않았으므로 여전히 활성 상태
    let detail: Value = seller
        .get(format!("{base}/listing/{listing_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["listing"]["is_active"], true);

    let response = seller
        .post(format!("{base}/listing/999/close_auction"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 상품 등록 검증 실패 테스트 (필드 단위 에러 응답)
#[tokio::test]
async fn test_create_listing_validation() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;

    let response = seller
        .post(format!("{base}/create"))
        .json(&json!({ "description": "설명", "current_bid": "10.123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"].get("name").is_some());
    assert!(body["fields"].get("current_bid").is_some());
    assert!(body["fields"].get("category_id").is_some());
}

/// 동시 입찰 테스트
/// 10.00 상품에 20.00과 21.00이 동시에 제출되면 최종 가격은 항상 21.00
#[tokio::test]
async fn test_concurrent_bidding() {
    let base = spawn_server().await;
    let seller = client();
    register(&seller, &base, "seller").await;
    let listing = create_listing(&seller, &base, "Lamp", "10.00").await;
    let listing_id = listing["id"].as_i64().unwrap();

    let bidder_a = client();
    register(&bidder_a, &base, "bidder_a").await;
    let bidder_b = client();
    register(&bidder_b, &base, "bidder_b").await;

    let (a, b) = tokio::join!(
        bidder_a
            .post(format!("{base}/listing/{listing_id}/bid"))
            .json(&json!({ "value": "20.00" }))
            .send(),
        bidder_b
            .post(format!("{base}/listing/{listing_id}/bid"))
            .json(&json!({ "value": "21.00" }))
            .send(),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(a.status() == StatusCode::OK || b.status() == StatusCode::OK);

    let detail: Value = seller
        .get(format!("{base}/listing/{listing_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["listing"]["current_bid"], "21.00");
    assert_eq!(detail["highest_bid"]["value"], "21.00");

    // 기록된 모든 입찰은 수락 시점의 현재 가격보다 높았던 입찰뿐
    for bid in detail["bids"].as_array().unwrap() {
        let value: f64 = bid["value"].as_str().unwrap().parse().unwrap();
        assert!(value > 10.0);
    }
}
