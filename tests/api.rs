#![cfg(feature = "web")]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

use gumbira::app::{AppState, build_router};
use gumbira::catalog::default_roster;
use gumbira::service::{EventService, FallbackPolicy};
use gumbira::workbook::LocalWorkbook;

fn app_with(workbook: LocalWorkbook, fallback: FallbackPolicy) -> Router {
    let service = EventService::new(Arc::new(workbook), fallback);
    build_router(Arc::new(AppState::new(service, default_roster()).unwrap()))
}

fn app() -> Router {
    app_with(LocalWorkbook::in_memory("Alifia Gumbira"), FallbackPolicy::Fail)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn page(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn post_result(app: &Router, competition: &str, team: &str, position: i64, points: i64) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/sheets/leaderboard",
        Some(json!({ "competition": competition, "team": team, "position": position, "points": points })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body
}

#[tokio::test]
async fn standings_follow_posted_results() {
    let app = app();
    post_result(&app, "Tenis Meja", "Cendana (Pattimura)", 1, 5).await;
    post_result(&app, "Gaple", "Boulevard (Soedirman)", 1, 5).await;
    post_result(&app, "Gaple", "Cendana (Pattimura)", 2, 3).await;
    post_result(&app, "Gaple", "Unknown Team", 3, 1).await;

    let (status, body) = call(&app, Method::GET, "/api/standings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    assert_eq!(body["count"], 6);
    assert!(body.get("warning").is_none());

    let first = &body["data"][0];
    assert_eq!(first["rank"], 1);
    assert_eq!(first["team"], "Cendana (Pattimura)");
    assert_eq!(first["shortName"], "Cendana");
    assert_eq!(first["totalPoints"], 8);
    assert_eq!(first["competitionsPlayed"], 2);
    assert_eq!(first["goldCount"], 1);
    assert_eq!(first["medal"], "gold");
    assert_eq!(body["data"][1]["team"], "Boulevard (Soedirman)");
    assert_eq!(body["data"][2]["totalPoints"], 0);
    assert_eq!(body["data"][2]["team"], "Lotus Bougenville Senja (A. Yani)");
}

#[tokio::test]
async fn result_log_round_trip() {
    let app = app();
    let created = post_result(&app, "Suit Jepang", "Jati Kenari (Bung Tomo)", 2, 3).await;
    assert_eq!(created["message"], "Leaderboard result added successfully");
    assert!(!created["data"]["id"].as_str().unwrap().is_empty());

    let (status, body) = call(&app, Method::GET, "/api/sheets/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], created["data"]["id"]);
    assert_eq!(body["data"][0]["position"], 2);
}

#[tokio::test]
async fn invalid_result_reports_fields() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/sheets/leaderboard",
        Some(json!({ "competition": "Gaple", "team": "", "position": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["fields"]["team"].is_string());
    assert!(body["fields"]["position"].is_string());
    assert!(body["fields"]["points"].is_string());
}

#[tokio::test]
async fn update_and_delete_are_not_implemented() {
    let app = app();
    for method in [Method::PUT, Method::DELETE] {
        let (status, body) = call(&app, method, "/api/sheets/leaderboard", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn read_failures_are_errors_without_demo_mode() {
    let app = app_with(LocalWorkbook::empty("blank"), FallbackPolicy::Fail);
    let (status, body) = call(&app, Method::GET, "/api/standings", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["details"]["code"], 404);

    let (status, html) = page(&app, "/leaderboard").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(html.contains("Data tidak dapat dimuat"));
}

#[tokio::test]
async fn demo_mode_is_flagged() {
    let app = app_with(LocalWorkbook::empty("blank"), FallbackPolicy::Demo);
    let (status, body) = call(&app, Method::GET, "/api/standings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "demo");
    assert!(body["warning"].as_str().unwrap().contains("demo data"));
    assert_eq!(body["data"][0]["team"], "Boulevard (Soedirman)");

    let (status, html) = page(&app, "/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("demo-banner"));
    assert!(html.contains("Boulevard"));

    let (_, html) = page(&app, "/participants").await;
    assert!(html.contains("demo-banner"));
    assert!(html.contains("Ahmad Rizki"));
}

#[tokio::test]
async fn participants_register_and_filter() {
    let app = app();
    for (name, team, category) in [
        ("Ahmad", "Boulevard (Soedirman)", "bapak"),
        ("Siti", "Cendana (Pattimura)", "ibu"),
        ("Aisyah", "Boulevard (Soedirman)", "anak"),
    ] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/participants",
            Some(json!({
                "name": name,
                "phone": "08123456789",
                "team": team,
                "competition": "Gaple",
                "category": category,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["status"], "pending");
    }

    let (status, body) = call(&app, Method::GET, "/api/participants?team=Boulevard%20(Soedirman)", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["stats"]["total"], 3);
    assert_eq!(body["stats"]["children"], 1);
    assert_eq!(body["stats"]["pending"], 3);

    let (_, body) = call(&app, Method::GET, "/api/participants?q=SITI&category=Ibu-ibu", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Siti");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/participants",
        Some(json!({ "name": "X", "phone": "12345", "team": "T", "competition": "C", "category": "bapak" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["phone"].as_str().unwrap().starts_with("Invalid"));
}

#[tokio::test]
async fn bazaar_registration_uses_full_row() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/bazaar",
        Some(json!({
            "name": "Maya",
            "phone": "08123456789",
            "team": "Jati Kenari (Bung Tomo)",
            "businessName": "Warung Bu Maya",
            "businessType": "Makanan & Minuman",
            "products": "Soto ayam",
            "needElectricity": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, body) = call(&app, Method::GET, "/api/bazaar", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["needElectricity"], true);
    assert_eq!(body["data"][0]["needTable"], false);
    assert_eq!(body["data"][0]["status"], "pending");

    let (_, raw) = call(&app, Method::GET, "/api/sheets/get?range=Bazaar!A2:M", None).await;
    assert_eq!(raw["data"][0][12], "pending");
}

#[tokio::test]
async fn raw_range_proxy() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/sheets/get", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Range parameter is required");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/sheets/append",
        Some(json!({ "range": "Leaderboard!A:G", "values": [["r1", "Gaple", "Cendana (Pattimura)", 1, 5, null, "t"]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedRows"], 1);

    let (_, body) = call(&app, Method::GET, "/api/sheets/get?range=Leaderboard!A2:E", None).await;
    assert_eq!(body["data"], json!([["r1", "Gaple", "Cendana (Pattimura)", "1", "5"]]));
    assert_eq!(body["range"], "Leaderboard!A2:E");

    let (status, body) = call(&app, Method::GET, "/api/sheets/get?range=Missing!A1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["details"]["suggestions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn connection_test_and_catalog() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/sheets/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["details"]["sheetTitle"], "Alifia Gumbira");
    assert_eq!(body["details"]["participantsTest"]["success"], true);
    assert_eq!(body["steps"].as_array().unwrap().len(), 4);

    let (_, body) = call(&app, Method::GET, "/api/catalog", None).await;
    assert_eq!(body["teams"].as_array().unwrap().len(), 6);
    assert_eq!(body["categories"][1]["key"], "ibu");
    assert_eq!(body["positions"][0]["points"], 5);
}

#[tokio::test]
async fn pages_render() {
    let app = app();
    post_result(&app, "Gaple", "Mangga Jambu Bhinneka (Cut Nyak Dhien)", 1, 5).await;

    let (status, html) = page(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Lomba Bapak-bapak"));

    let (status, html) = page(&app, "/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Mangga"));
    assert!(html.contains("Rincian per Tim"));
    assert!(html.contains("Tim Aktif"));
    assert!(!html.contains("demo-banner"));
}

#[tokio::test]
async fn mistyped_bodies_get_the_field_envelope() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/sheets/leaderboard",
        Some(json!({ "competition": "Gaple", "team": "Cendana (Pattimura)", "position": "1", "points": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["fields"]["body"].as_str().unwrap().contains("position"));

    let (status, body) = call(&app, Method::POST, "/api/participants", Some(json!("not an object"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["body"].is_string());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/sheets/append",
        Some(json!({ "range": "Leaderboard!A:G", "values": "r1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["body"].is_string());

    let (_, body) = call(&app, Method::GET, "/api/sheets/leaderboard", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn huge_points_do_not_break_standings() {
    let app = app();
    post_result(&app, "Gaple", "Cendana (Pattimura)", 1, i64::MAX).await;
    post_result(&app, "Tenis Meja", "Cendana (Pattimura)", 1, i64::MAX).await;
    post_result(&app, "Gaple", "Boulevard (Soedirman)", 2, 3).await;

    let (status, body) = call(&app, Method::GET, "/api/standings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["team"], "Cendana (Pattimura)");
    assert_eq!(body["data"][0]["totalPoints"], i64::MAX);
    assert_eq!(body["data"][1]["totalPoints"], 3);

    let (status, _) = page(&app, "/leaderboard").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bazaar_list_and_page_filter() {
    let app = app();
    for (name, business, kind, products) in [
        ("Maya", "Warung Bu Maya", "Makanan & Minuman", "Soto ayam"),
        ("Dedi", "Toko Dedi", "Elektronik", "Powerbank"),
    ] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/bazaar",
            Some(json!({
                "name": name,
                "phone": "08123456789",
                "team": "Cendana (Pattimura)",
                "businessName": business,
                "businessType": kind,
                "products": products,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (_, body) = call(&app, Method::GET, "/api/bazaar?type=Elektronik", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["businessName"], "Toko Dedi");
    assert_eq!(body["stats"]["total"], 2);
    assert_eq!(body["stats"]["pending"], 2);

    let (_, body) = call(&app, Method::GET, "/api/bazaar?q=soto", None).await;
    assert_eq!(body["data"][0]["name"], "Maya");

    let (status, html) = page(&app, "/bazaar?type=Elektronik").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Toko Dedi"));
    assert!(!html.contains("Warung Bu Maya"));
    assert!(html.contains("Menampilkan 1 dari 2 peserta"));
}
