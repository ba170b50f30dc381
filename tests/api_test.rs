mod common;

use artfolio::domain::NewImage;
use artfolio::models::PostStatus;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{artwork, collection, get, post, send, setup, token_for};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use serde_json::json;

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let (status, body) = get(&app.router(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "artfolio");
}

#[tokio::test]
async fn test_catalog_pagination_is_clamped() {
    let app = setup().await;
    for i in 0..15 {
        app.state
            .artwork_repo
            .create(artwork(&format!("Work {}", i), 30, 30))
            .await
            .unwrap();
    }
    let router = app.router();

    let (status, body) = get(&router, "/api/catalog?page=999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"]["number"], 2);
    assert_eq!(body["artworks"]["items"].as_array().unwrap().len(), 3);

    let (_, body) = get(&router, "/api/catalog?page=abc").await;
    assert_eq!(body["artworks"]["number"], 1);

    let (_, body) = get(&router, "/api/catalog?per_page=13").await;
    assert_eq!(body["artworks"]["per_page"], 12);
    assert_eq!(body["filters"]["per_page"], 12);

    let (_, body) = get(&router, "/api/catalog?per_page=24").await;
    assert_eq!(body["artworks"]["total_pages"], 1);
    assert_eq!(body["total_count"], 15);
}

#[tokio::test]
async fn test_catalog_repeated_filters_and_echo() {
    let app = setup().await;
    let repo = &app.state.artwork_repo;
    repo.create(artwork("Tiny", 20, 20)).await.unwrap();
    repo.create(artwork("Huge", 200, 200)).await.unwrap();
    repo.create(artwork("Middle", 30, 50)).await.unwrap();

    let (status, body) = get(
        &app.router(),
        "/api/catalog?size=small&size=large&size=bogus&status=available&order=title",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filtered_count"], 2);
    assert_eq!(body["artworks"]["items"][0]["title"], "Huge");
    assert_eq!(body["artworks"]["items"][1]["title"], "Tiny");
    assert_eq!(body["filters"]["selected_sizes"], json!(["small", "large"]));
    assert_eq!(body["filters"]["current_order"], "title");
    assert_eq!(body["filters"]["show_available_only"], true);
    assert_eq!(body["vocabulary"]["size_choices"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_artwork_view_counted_once_per_session() {
    let app = setup().await;
    app.state
        .artwork_repo
        .create(artwork("Viewed", 30, 30))
        .await
        .unwrap();
    let router = app.router();

    let first = Request::builder()
        .uri("/api/artworks/viewed")
        .body(Body::empty())
        .unwrap();
    let (status, cookie, body) = send(&router, first).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artwork"]["views"], 1);
    let cookie = cookie.expect("session cookie is issued");
    assert!(cookie.starts_with("artfolio_session="));

    let again = Request::builder()
        .uri("/api/artworks/viewed")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = send(&router, again).await;
    assert_eq!(body["artwork"]["views"], 1);

    // a different visitor counts
    let (_, body) = get(&router, "/api/artworks/viewed").await;
    assert_eq!(body["artwork"]["views"], 2);
}

#[tokio::test]
async fn test_artwork_detail_includes_collection_neighbours() {
    let app = setup().await;
    let dragons = app
        .state
        .collection_repo
        .create(collection("Dragons"))
        .await
        .unwrap();
    for title in ["Red dragon", "Blue dragon"] {
        let mut input = artwork(title, 30, 30);
        input.collection_id = Some(dragons.id);
        app.state.artwork_repo.create(input).await.unwrap();
    }
    app.state
        .artwork_repo
        .create(artwork("Loner", 30, 30))
        .await
        .unwrap();
    let router = app.router();

    let (_, body) = get(&router, "/api/artworks/red-dragon").await;
    let neighbours = body["collection_artworks"].as_array().unwrap();
    assert_eq!(neighbours.len(), 1);
    assert_eq!(neighbours[0]["title"], "Blue dragon");

    let (_, body) = get(&router, "/api/artworks/loner").await;
    assert!(body["collection_artworks"].is_null());
}

#[tokio::test]
async fn test_unknown_slugs_are_not_found() {
    let app = setup().await;
    let router = app.router();

    for uri in [
        "/api/artworks/missing",
        "/api/collections/missing",
        "/api/blog/missing",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_draft_posts_are_hidden() {
    let app = setup().await;
    let posts = &app.state.post_repo;
    posts.create(post("Draft", "", PostStatus::Draft)).await.unwrap();
    posts.create(post("Public", "news", PostStatus::Published)).await.unwrap();
    let router = app.router();

    let (status, _) = get(&router, "/api/blog/draft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&router, "/api/blog/public").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["title"], "Public");

    let (_, body) = get(&router, "/api/blog").await;
    assert_eq!(body["posts"]["total_items"], 1);
    assert_eq!(body["sidebar"]["tags"][0]["name"], "news");
}

#[tokio::test]
async fn test_collection_page() {
    let app = setup().await;
    let seasons = app
        .state
        .collection_repo
        .create(collection("Seasons"))
        .await
        .unwrap();
    let mut input = artwork("Winter", 30, 30);
    input.collection_id = Some(seasons.id);
    let winter = app.state.artwork_repo.create(input).await.unwrap();
    app.state
        .artwork_repo
        .add_image(
            winter.card.id,
            NewImage {
                path: "artworks/winter.jpg".into(),
                order: 0,
                is_primary: false,
            },
        )
        .await
        .unwrap();
    let router = app.router();

    let (status, body) = get(&router, "/api/collections/seasons?page=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection"]["artwork_count"], 1);
    assert_eq!(body["artworks"]["number"], 1);
    assert_eq!(body["carousel_images"][0]["url"], "/media/artworks/winter.jpg");

    let (_, body) = get(&router, "/api/collections").await;
    assert_eq!(body["collections"][0]["slug"], "seasons");
}

#[tokio::test]
async fn test_search_spans_all_content() {
    let app = setup().await;
    app.state
        .artwork_repo
        .create(artwork("Dragon at dawn", 30, 30))
        .await
        .unwrap();
    app.state
        .collection_repo
        .create(collection("Dragons"))
        .await
        .unwrap();
    app.state
        .post_repo
        .create(post("Painting dragons", "", PostStatus::Published))
        .await
        .unwrap();
    let router = app.router();

    let (status, body) = get(&router, "/api/search?q=dragon").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks_count"], 1);
    assert_eq!(body["collections_count"], 1);
    assert_eq!(body["posts_count"], 1);
    assert_eq!(body["total_artworks"], 1);

    let (_, body) = get(&router, "/api/search?q=%20%20").await;
    assert_eq!(body["query"], "");
    assert_eq!(body["artworks_count"], 0);
}

#[tokio::test]
async fn test_home_page_degrades_gracefully_when_empty() {
    let app = setup().await;
    let (status, body) = get(&app.router(), "/api/home").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["site_name"], "IrenFantasyArt");
    assert!(body["oil_artwork"].is_null());
    assert_eq!(body["popular_artworks"], json!([]));
    assert_eq!(body["latest_posts"], json!([]));
}

#[tokio::test]
async fn test_admin_requires_admin_token() {
    let app = setup().await;
    let router = app.router();
    let payload = json!({
        "title": "New",
        "width_cm": 30,
        "height_cm": 40,
        "created_year": 2024
    });

    let (status, _, body) = send(
        &router,
        json_request("POST", "/api/admin/artworks", None, payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let viewer = token_for(&app.state, "viewer", "viewer").await;
    let (status, _, body) = send(
        &router,
        json_request("POST", "/api/admin/artworks", Some(&viewer), payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let admin = token_for(&app.state, "editor", "admin").await;
    let (status, _, body) = send(
        &router,
        json_request("POST", "/api/admin/artworks", Some(&admin), payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "new");
    assert_eq!(body["size_category"], "medium");
    assert_eq!(body["status"], "available");
}

#[tokio::test]
async fn test_admin_validation_and_conflicts() {
    let app = setup().await;
    let router = app.router();
    let admin = token_for(&app.state, "editor", "admin").await;

    let (status, _, body) = send(
        &router,
        json_request(
            "POST",
            "/api/admin/artworks",
            Some(&admin),
            json!({"title": "Too wide", "width_cm": 900, "height_cm": 40, "created_year": 2024}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _, _) = send(
        &router,
        json_request(
            "POST",
            "/api/admin/collections",
            Some(&admin),
            json!({"name": "Seasons"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        &router,
        json_request(
            "POST",
            "/api/admin/collections",
            Some(&admin),
            json!({"name": "Other", "slug": "seasons"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_admin_post_defaults_author_to_caller() {
    let app = setup().await;
    let router = app.router();
    let admin = token_for(&app.state, "irina", "admin").await;

    let (status, _, body) = send(
        &router,
        json_request(
            "POST",
            "/api/admin/posts",
            Some(&admin),
            json!({
                "title": "First post",
                "content": "<p>Hello <b>world</b></p>",
                "status": "published"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author"]["username"], "irina");
    assert_eq!(body["excerpt"], "Hello world...");
    assert!(body["published_at"].is_string());
}

#[tokio::test]
async fn test_login_flow() {
    let app = setup().await;
    let router = app.router();

    let (status, _, _) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": "owner", "password": "s3cret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // only the first account may self-register
    let (status, _, _) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"username": "intruder", "password": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "owner", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = send(
        &router,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "owner", "password": "s3cret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let me = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&router, me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "owner");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_repeated_single_value_keys_are_tolerated() {
    let app = setup().await;
    for i in 0..15 {
        app.state
            .artwork_repo
            .create(artwork(&format!("Work {}", i), 30, 30))
            .await
            .unwrap();
    }
    let seasons = app
        .state
        .collection_repo
        .create(collection("Seasons"))
        .await
        .unwrap();
    let router = app.router();

    let (status, body) = get(&router, "/api/catalog?page=1&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"]["number"], 2);

    let (status, body) = get(&router, "/api/catalog?q=a&q=Work%2014").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["query"], "Work 14");

    let (status, body) = get(&router, "/api/catalog?order=title&order=x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["current_order"], "-created_at");

    for uri in [
        "/api/blog?page=1&page=2",
        "/api/search?q=a&q=b",
        "/api/collections/seasons?page=1&page=2",
    ] {
        let (status, _) = get(&router, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
    }
    assert_eq!(seasons.slug, "seasons");
}

#[tokio::test]
async fn test_huge_page_number_goes_to_last_page() {
    let app = setup().await;
    for i in 0..15 {
        app.state
            .artwork_repo
            .create(artwork(&format!("Work {}", i), 30, 30))
            .await
            .unwrap();
    }

    let (status, body) = get(&app.router(), "/api/catalog?page=99999999999999999999999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artworks"]["number"], 2);
}

#[tokio::test]
async fn test_catalog_filters_by_collection() {
    let app = setup().await;
    let dragons = app
        .state
        .collection_repo
        .create(collection("Dragons"))
        .await
        .unwrap();
    let mut input = artwork("Red dragon", 30, 30);
    input.collection_id = Some(dragons.id);
    app.state.artwork_repo.create(input).await.unwrap();
    app.state
        .artwork_repo
        .create(artwork("Loner", 30, 30))
        .await
        .unwrap();

    let (status, body) = get(
        &app.router(),
        &format!("/api/catalog?collection={}&collection=junk", dragons.id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filtered_count"], 1);
    assert_eq!(body["artworks"]["items"][0]["title"], "Red dragon");
    assert_eq!(body["filters"]["selected_collections"], json!([dragons.id]));
}

#[tokio::test]
async fn test_blog_text_search_matches_tags() {
    let app = setup().await;
    let posts = &app.state.post_repo;
    posts
        .create(post("Evening sketch", "dragonlore", PostStatus::Published))
        .await
        .unwrap();
    posts
        .create(post("Morning sketch", "news", PostStatus::Published))
        .await
        .unwrap();

    let (status, body) = get(&app.router(), "/api/blog?q=dragonlore").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "dragonlore");
    assert_eq!(body["posts"]["total_items"], 1);
    assert_eq!(body["posts"]["items"][0]["title"], "Evening sketch");
}

#[tokio::test]
async fn test_failed_view_increment_is_retried_in_same_session() {
    let app = setup().await;
    app.state
        .artwork_repo
        .create(artwork("Fragile", 30, 30))
        .await
        .unwrap();
    let db = app.state.db();
    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        "CREATE TRIGGER block_views BEFORE UPDATE OF views ON artworks \
         BEGIN SELECT RAISE(ABORT, 'views locked'); END;"
            .to_string(),
    ))
    .await
    .unwrap();
    let router = app.router();

    let first = Request::builder()
        .uri("/api/artworks/fragile")
        .body(Body::empty())
        .unwrap();
    let (status, cookie, body) = send(&router, first).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artwork"]["views"], 0);
    let cookie = cookie.expect("session cookie is issued");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        "DROP TRIGGER block_views".to_string(),
    ))
    .await
    .unwrap();

    let again = Request::builder()
        .uri("/api/artworks/fragile")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = send(&router, again).await;
    assert_eq!(body["artwork"]["views"], 1);
}

