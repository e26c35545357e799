use axum::http::StatusCode;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use yak_order_core::config::Settings;
use yak_order_core::store::Catalog;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// genre: Poetry(1), drama(2), Fiction(3) at top level; Sci-Fi(4) and
/// Fantasy(5) under Fiction. tag: flat, registered but not enabled.
/// book: Dune(1), Emma(2), Beloved(3).
fn init_project(dir: &TempDir) {
    let mut catalog = Catalog::default();
    catalog.add_taxonomy("genre", "Genre", true).unwrap();
    catalog.add_taxonomy("tag", "Tag", false).unwrap();
    catalog.add_post_type("book", "Book").unwrap();
    catalog.add_term("genre", "Poetry", 0).unwrap();
    catalog.add_term("genre", "drama", 0).unwrap();
    let fiction = catalog.add_term("genre", "Fiction", 0).unwrap();
    catalog.add_term("genre", "Sci-Fi", fiction).unwrap();
    catalog.add_term("genre", "Fantasy", fiction).unwrap();
    catalog.add_term("tag", "classic", 0).unwrap();
    catalog.add_term("tag", "award", 0).unwrap();
    for title in ["Dune", "Emma", "Beloved"] {
        catalog.add_post("book", title).unwrap();
    }
    catalog.save(dir.path()).unwrap();

    let mut settings = Settings::default();
    settings.enable_taxonomy("genre").unwrap();
    settings.enable_post_type("book").unwrap();
    settings.save(dir.path()).unwrap();
}

fn update_settings(dir: &TempDir, f: impl FnOnce(&mut Settings)) {
    let mut settings = Settings::load(dir.path()).unwrap();
    f(&mut settings);
    settings.save(dir.path()).unwrap();
}

async fn send(
    app: axum::Router,
    req: axum::http::Request<axum::body::Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    send(app, req).await
}

/// Send a PUT request with a JSON body and optional extra headers.
async fn put_json(
    app: axum::Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, req).await
}

fn item_ids(json: &serde_json::Value) -> Vec<u64> {
    json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_u64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_config_returns_settings() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app, "/api/config").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["taxonomies"], serde_json::json!(["genre"]));
    assert_eq!(json["post_types"], serde_json::json!(["book"]));
    assert_eq!(json["secondary_orderby"], "name");
    assert_eq!(json["rank_step"], 10);
}

#[tokio::test]
async fn get_config_returns_error_when_not_initialized() {
    let dir = TempDir::new().unwrap();

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app, "/api/config").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not initialized"));
}

// ---------------------------------------------------------------------------
// Term reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_terms_resolves_unranked_by_name() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app, "/api/taxonomies/genre/terms?parent=0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sorted"], true);
    // Case-insensitive: drama < Fiction < Poetry.
    assert_eq!(item_ids(&json), vec![2, 3, 1]);
    assert!(json["items"][0]["manual_order"].is_null());
}

#[tokio::test]
async fn list_terms_without_parent_returns_whole_taxonomy() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app, "/api/taxonomies/genre/terms").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_ids(&json).len(), 5);
}

#[tokio::test]
async fn list_terms_frontend_respects_toggle() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    update_settings(&dir, |s| s.autosort_enabled = false);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(
        app.clone(),
        "/api/taxonomies/genre/terms?parent=0&context=frontend",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sorted"], false);
    assert_eq!(item_ids(&json), vec![1, 2, 3]);

    // Admin reads are governed by their own toggle.
    let (_, json) = get(app, "/api/taxonomies/genre/terms?parent=0&context=admin").await;
    assert_eq!(json["sorted"], true);
}

#[tokio::test]
async fn list_terms_explicit_orderby_is_not_overridden() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (_, json) = get(app.clone(), "/api/taxonomies/genre/terms?parent=0&orderby=slug").await;
    assert_eq!(json["sorted"], false);

    let (_, json) = get(app, "/api/taxonomies/genre/terms?parent=0&ignore_order=true").await;
    assert_eq!(json["sorted"], false);
}

#[tokio::test]
async fn list_terms_for_missing_parent_is_empty_and_not_cached() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let state = yak_order_server::state::AppState::new(dir.path().to_path_buf());
    let app = yak_order_server::router(state.clone());
    for parent in [900, 901, 902] {
        let (status, json) = get(
            app.clone(),
            &format!("/api/taxonomies/genre/terms?parent={parent}"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(item_ids(&json).is_empty());
    }
    assert!(state.cache.is_empty());

    get(app, "/api/taxonomies/genre/terms?parent=0").await;
    assert_eq!(state.cache.len(), 1);
}

#[tokio::test]
async fn list_terms_unknown_taxonomy_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, _) = get(app, "/api/taxonomies/nope/terms").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_parents_returns_eligible_groups() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app, "/api/taxonomies/genre/parents").await;

    assert_eq!(status, StatusCode::OK);
    let parents: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["parent"].as_u64().unwrap())
        .collect();
    assert_eq!(parents, vec![0, 3]);
    assert_eq!(json[0]["label"], "Top level");
    assert_eq!(json[1]["label"], "Fiction");
    assert_eq!(json[1]["children"], 2);
}

#[tokio::test]
async fn list_parents_for_disabled_taxonomy_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, _) = get(app, "/api/taxonomies/tag/parents").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Term writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_terms_persists_spaced_ranks() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    // Warm the read cache first so the write has something to invalidate.
    let (_, before) = get(app.clone(), "/api/taxonomies/genre/terms?parent=0").await;
    assert_eq!(item_ids(&before), vec![2, 3, 1]);

    let (status, json) = put_json(
        app.clone(),
        "/api/taxonomies/genre/order",
        &[],
        serde_json::json!({ "parent": 0, "order": [1, 3, 2, 1] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["saved"], 3);
    assert_eq!(json["requested"], 3);
    assert_eq!(json["skipped"], 0);
    assert_eq!(json["failed"], 0);
    assert_eq!(json["assignments"][0]["rank"], 10);
    assert_eq!(json["assignments"][2]["rank"], 30);

    let (_, after) = get(app, "/api/taxonomies/genre/terms?parent=0").await;
    assert_eq!(item_ids(&after), vec![1, 3, 2]);
    assert_eq!(after["items"][1]["manual_order"], 20);

    let catalog = Catalog::load(dir.path()).unwrap();
    assert_eq!(catalog.term(2).unwrap().order, Some(30));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_reorders_of_different_groups_both_persist() {
    let dir = TempDir::new().unwrap();
    let mut catalog = Catalog::default();
    catalog.add_taxonomy("genre", "Genre", true).unwrap();
    catalog.add_post_type("book", "Book").unwrap();
    let terms: Vec<u64> = (0..40)
        .map(|i| catalog.add_term("genre", format!("t{i}"), 0).unwrap())
        .collect();
    let posts: Vec<u64> = (0..40)
        .map(|i| catalog.add_post("book", format!("p{i}")).unwrap())
        .collect();
    catalog.save(dir.path()).unwrap();
    let mut settings = Settings::default();
    settings.enable_taxonomy("genre").unwrap();
    settings.enable_post_type("book").unwrap();
    settings.save(dir.path()).unwrap();

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (terms_res, posts_res) = tokio::join!(
        put_json(
            app.clone(),
            "/api/taxonomies/genre/order",
            &[],
            serde_json::json!({ "parent": 0, "order": terms }),
        ),
        put_json(
            app.clone(),
            "/api/post-types/book/order",
            &[],
            serde_json::json!({ "order": posts }),
        ),
    );
    assert_eq!(terms_res.0, StatusCode::OK);
    assert_eq!(posts_res.0, StatusCode::OK);
    assert_eq!(terms_res.1["saved"], 40);
    assert_eq!(posts_res.1["saved"], 40);

    let on_disk = Catalog::load(dir.path()).unwrap();
    let terms_saved = terms
        .iter()
        .filter(|&&id| on_disk.term(id).unwrap().order.is_some())
        .count();
    let posts_saved = posts
        .iter()
        .filter(|&&id| on_disk.post(id).unwrap().menu_order.is_some())
        .count();
    assert_eq!((terms_saved, posts_saved), (40, 40));
}

#[tokio::test]
async fn reorder_terms_skips_ids_from_other_groups() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = put_json(
        app,
        "/api/taxonomies/genre/order",
        &[],
        serde_json::json!({ "parent": 3, "order": [1, 5, 99] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["saved"], 1);
    assert_eq!(json["skipped"], 2);

    let catalog = Catalog::load(dir.path()).unwrap();
    assert_eq!(catalog.term(5).unwrap().order, Some(10));
    assert_eq!(catalog.term(1).unwrap().order, None);
}

#[tokio::test]
async fn reorder_terms_only_foreign_ids_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = put_json(
        app,
        "/api/taxonomies/genre/order",
        &[],
        serde_json::json!({ "parent": 3, "order": [1, 2] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("empty"));
    let catalog = Catalog::load(dir.path()).unwrap();
    assert!(catalog.terms.iter().all(|t| t.order.is_none()));
}

#[tokio::test]
async fn reorder_terms_empty_list_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, _) = put_json(
        app,
        "/api/taxonomies/genre/order",
        &[],
        serde_json::json!({ "parent": 0, "order": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reorder_disabled_taxonomy_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = put_json(
        app,
        "/api/taxonomies/tag/order",
        &[],
        serde_json::json!({ "order": [7, 6] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("not enabled"));
}

#[tokio::test]
async fn reorder_with_bad_actor_header_is_400() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, _) = put_json(
        app,
        "/api/taxonomies/genre/order",
        &[("x-yak-actor", "root")],
        serde_json::json!({ "parent": 0, "order": [1, 2] }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_term_order_moves_single_term() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = put_json(
        app.clone(),
        "/api/terms/1/order",
        &[],
        serde_json::json!({ "value": -5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Poetry");
    assert_eq!(json["manual_order"], -5);

    let (_, after) = get(app, "/api/taxonomies/genre/terms?parent=0").await;
    assert_eq!(item_ids(&after), vec![1, 2, 3]);
}

#[tokio::test]
async fn set_term_order_missing_term_is_404() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, _) = put_json(
        app,
        "/api/terms/99/order",
        &[],
        serde_json::json!({ "value": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn posts_reorder_round_trip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, json) = get(app.clone(), "/api/post-types/book/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_ids(&json), vec![3, 1, 2]);

    let (status, json) = put_json(
        app.clone(),
        "/api/post-types/book/order",
        &[],
        serde_json::json!({ "order": [2, 1] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["saved"], 2);

    // Ranked posts first, then the unranked one.
    let (_, json) = get(app, "/api/post-types/book/posts").await;
    assert_eq!(item_ids(&json), vec![2, 1, 3]);
}

#[tokio::test]
async fn posts_frontend_unsorted_by_default() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (_, json) = get(app, "/api/post-types/book/posts?context=frontend").await;

    assert_eq!(json["sorted"], false);
    assert_eq!(item_ids(&json), vec![1, 2, 3]);
}

#[tokio::test]
async fn set_post_order_updates_menu_order() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let app = yak_order_server::build_router(dir.path().to_path_buf());
    let (status, _) = put_json(
        app,
        "/api/posts/2/order",
        &[],
        serde_json::json!({ "value": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let catalog = Catalog::load(dir.path()).unwrap();
    assert_eq!(catalog.post(2).unwrap().menu_order, Some(0));
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_broadcasts_order_updated() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let state = yak_order_server::state::AppState::new(dir.path().to_path_buf());
    let mut rx = state.event_tx.subscribe();
    let app = yak_order_server::router(state);

    let (status, _) = put_json(
        app,
        "/api/taxonomies/genre/order",
        &[("x-yak-actor", "7")],
        serde_json::json!({ "parent": 0, "order": [3, 1, 2] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.persisted_ids, vec![3, 1, 2]);
    assert_eq!(event.actor, Some(7));
    assert_eq!(event.group.to_string(), "genre/0");
}

#[tokio::test]
async fn failed_reorder_broadcasts_nothing() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let state = yak_order_server::state::AppState::new(dir.path().to_path_buf());
    let mut rx = state.event_tx.subscribe();
    let app = yak_order_server::router(state);

    let (status, _) = put_json(
        app,
        "/api/taxonomies/genre/order",
        &[],
        serde_json::json!({ "parent": 0, "order": [4, 5] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}
