//! Assets and asset requisitions over HTTP

mod common;

use common::TestApp;
use http::StatusCode;
use ops_server::ErrorCode;
use serde_json::json;

#[tokio::test]
async fn asset_request_cycle() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let employee = app.create_employee(&admin, "Oier", "oier@farm.test").await;

    let res = app
        .post(
            "/api/assets",
            &admin,
            json!({ "name": "Dive compressor", "asset_code": "DC-1", "quantity_total": 2 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["quantity_available"], 2);
    let asset = res.body["id"].as_i64().unwrap();

    let res = app
        .post(
            "/api/asset-requests",
            &admin,
            json!({
                "requested_by": employee,
                "purpose": "Net inspection",
                "items": [{ "asset_id": asset, "quantity": 2 }],
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let id = res.body["data"]["id"].as_i64().unwrap();

    let res = app
        .post(&format!("/api/asset-requests/{id}/issue"), &admin, json!({}))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(
        res.code(),
        Some(ErrorCode::AssetRequestInvalidTransition.code() as u64)
    );

    app.post(&format!("/api/asset-requests/{id}/approve"), &admin, json!({}))
        .await;
    let res = app
        .post(&format!("/api/asset-requests/{id}/issue"), &admin, json!({}))
        .await;
    assert_eq!(res.body["data"]["status"], "ISSUED");
    let now = app.get(&format!("/api/assets/{asset}"), &admin).await;
    assert_eq!(now.body["quantity_available"], 0);

    let res = app
        .post(&format!("/api/asset-requests/{id}/return"), &admin, json!({}))
        .await;
    assert_eq!(res.body["data"]["status"], "RETURNED");
    let now = app.get(&format!("/api/assets/{asset}"), &admin).await;
    assert_eq!(now.body["quantity_available"], 2);
}

#[tokio::test]
async fn issued_assets_cannot_be_deleted_or_shrunk() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let employee = app.create_employee(&admin, "Maite", "maite@farm.test").await;

    let res = app
        .post(
            "/api/assets",
            &admin,
            json!({ "name": "Work boat", "asset_code": "WB-1", "quantity_total": 3 }),
        )
        .await;
    let asset = res.body["id"].as_i64().unwrap();

    let res = app
        .post(
            "/api/asset-requests",
            &admin,
            json!({ "requested_by": employee, "items": [{ "asset_id": asset, "quantity": 2 }] }),
        )
        .await;
    let id = res.body["data"]["id"].as_i64().unwrap();
    app.post(&format!("/api/asset-requests/{id}/approve"), &admin, json!({}))
        .await;
    app.post(&format!("/api/asset-requests/{id}/issue"), &admin, json!({}))
        .await;

    let res = app.delete(&format!("/api/assets/{asset}"), &admin).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::AssetInUse.code() as u64));

    // two boats are out, only one is on site
    let res = app
        .put(&format!("/api/assets/{asset}"), &admin, json!({ "quantity_total": 1 }))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::AssetInUse.code() as u64));
    let now = app.get(&format!("/api/assets/{asset}"), &admin).await;
    assert_eq!(now.body["quantity_total"], 3);
    assert_eq!(now.body["quantity_available"], 1);
}
