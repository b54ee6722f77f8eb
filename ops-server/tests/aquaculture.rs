//! Cages, feeding, treatments and the hatchery over HTTP

mod common;

use common::TestApp;
use http::StatusCode;
use ops_server::ErrorCode;
use serde_json::json;

async fn create_cage(app: &TestApp, token: &str, code: &str, capacity: i64) -> i64 {
    let res = app
        .post(
            "/api/cages",
            token,
            json!({ "code": code, "species": "Sea bass", "capacity": capacity }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["status"], "ACTIVE");
    res.body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn feeding_from_stock() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let cage = create_cage(&app, &admin, "B-01", 0).await;
    let pellets = app.create_stock(&admin, "Pellet 2mm", 25.0).await;

    let res = app
        .post(
            "/api/feedings",
            &admin,
            json!({
                "cage_id": cage,
                "feed_type": "Pellet 2mm",
                "quantity_kg": 10.25,
                "stock_in_id": pellets,
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let feeding = res.body["id"].as_i64().unwrap();

    app.post(
        "/api/feedings",
        &admin,
        json!({ "cage_id": cage, "feed_type": "Fresh fish", "quantity_kg": 4.5 }),
    )
    .await;

    let stock = app.get(&format!("/api/stock/{pellets}"), &admin).await;
    assert_eq!(stock.body["quantity"], 14.75);

    let res = app
        .post(
            "/api/feedings",
            &admin,
            json!({
                "cage_id": cage,
                "feed_type": "Pellet 2mm",
                "quantity_kg": 50.0,
                "stock_in_id": pellets,
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::StockInsufficient.code() as u64));

    let summary = app
        .get(&format!("/api/feedings/summary?cage_id={cage}"), &admin)
        .await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["count"], 2);
    assert_eq!(summary.body["total_kg"], 14.75);

    let list = app.get(&format!("/api/feedings?cage_id={cage}"), &admin).await;
    assert_eq!(list.body.as_array().unwrap().len(), 2);

    // deleting the record leaves stock as it is
    let res = app.delete(&format!("/api/feedings/{feeding}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    let stock = app.get(&format!("/api/stock/{pellets}"), &admin).await;
    assert_eq!(stock.body["quantity"], 14.75);
}

#[tokio::test]
async fn medicines_and_treatments() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let cage = create_cage(&app, &admin, "B-02", 0).await;

    let res = app
        .post(
            "/api/medicines",
            &admin,
            json!({ "name": "Florfenicol", "unit": "g", "quantity": 20.0, "expiry_date": "2099-12-31" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let medicine = res.body["id"].as_i64().unwrap();

    let res = app
        .post(
            "/api/medicines",
            &admin,
            json!({ "name": "Old stock", "quantity": 5.0, "expiry_date": "2001-01-01" }),
        )
        .await;
    let expired = res.body["id"].as_i64().unwrap();

    let expiring = app.get("/api/medicines/expiring?days=30", &admin).await;
    let names: Vec<&str> = expiring
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Old stock"]);

    let res = app
        .post(
            "/api/medications",
            &admin,
            json!({ "medicine_id": medicine, "cage_id": cage, "dosage": 4.0, "reason": "Vibriosis" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let med = app.get(&format!("/api/medicines/{medicine}"), &admin).await;
    assert_eq!(med.body["quantity"], 16.0);

    let res = app
        .post(
            "/api/medications",
            &admin,
            json!({ "medicine_id": medicine, "dosage": 1.0 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), Some(ErrorCode::MedicationTargetInvalid.code() as u64));

    let res = app
        .post(
            "/api/medications",
            &admin,
            json!({ "medicine_id": expired, "cage_id": cage, "dosage": 1.0 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), Some(ErrorCode::MedicineExpired.code() as u64));

    let res = app
        .post(
            "/api/medications",
            &admin,
            json!({ "medicine_id": medicine, "cage_id": cage, "dosage": 100.0 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::MedicineInsufficient.code() as u64));

    let list = app
        .get(&format!("/api/medications?cage_id={cage}"), &admin)
        .await;
    assert_eq!(list.body.as_array().unwrap().len(), 1);

    let res = app.delete(&format!("/api/medicines/{medicine}"), &admin).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::MedicineInUse.code() as u64));
}

#[tokio::test]
async fn hatchery_to_cage_transfer() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let cage = create_cage(&app, &admin, "NURSERY-2", 10_000).await;
    let mut rx = app.state.gateway.subscribe();

    let res = app
        .post(
            "/api/parent-fish-pools",
            &admin,
            json!({ "name": "Brood 1", "species": "Sea bass", "male_count": 12, "female_count": 30 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let brood = res.body["id"].as_i64().unwrap();

    let res = app
        .post(
            "/api/grown-egg-ponds",
            &admin,
            json!({ "name": "Egg pond 1", "parent_pool_id": brood, "egg_count": 20000 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["stage"], "INCUBATING");
    let pond = res.body["id"].as_i64().unwrap();

    // still incubating
    let res = app
        .post(
            &format!("/api/grown-egg-ponds/{pond}/transfer"),
            &admin,
            json!({ "cage_id": cage, "count": 100 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::PondInvalidStage.code() as u64));

    let res = app
        .put(
            &format!("/api/grown-egg-ponds/{pond}"),
            &admin,
            json!({ "stage": "HATCHED", "hatched_count": 12000 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    // more than the cage holds
    let res = app
        .post(
            &format!("/api/grown-egg-ponds/{pond}/transfer"),
            &admin,
            json!({ "cage_id": cage, "count": 11000 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::CageOverCapacity.code() as u64));

    let res = app
        .post(
            &format!("/api/grown-egg-ponds/{pond}/transfer"),
            &admin,
            json!({ "cage_id": cage, "count": 9000 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["stage"], "TRANSFERRED");
    assert_eq!(res.body["data"]["transferred_count"], 9000);

    let cage_now = app.get(&format!("/api/cages/{cage}"), &admin).await;
    assert_eq!(cage_now.body["current_stock"], 9000);

    // stocked cage and referenced pool are protected
    let res = app.delete(&format!("/api/cages/{cage}"), &admin).await;
    assert_eq!(res.code(), Some(ErrorCode::CageHasStock.code() as u64));
    let res = app
        .delete(&format!("/api/parent-fish-pools/{brood}"), &admin)
        .await;
    assert_eq!(res.code(), Some(ErrorCode::PoolInUse.code() as u64));

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.event);
    }
    assert!(events.contains(&"fryTransferred".to_string()));
    assert!(events.contains(&"cageUpdated".to_string()));
}

#[tokio::test]
async fn oversized_head_counts_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let res = app
        .post(
            "/api/cages",
            &admin,
            json!({ "code": "HUGE", "capacity": i64::MAX, "current_stock": 10 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), Some(ErrorCode::ValidationFailed.code() as u64));

    let res = app
        .post(
            "/api/grown-egg-ponds",
            &admin,
            json!({ "name": "Pond X", "egg_count": i64::MAX, "hatched_count": i64::MAX, "stage": "HATCHED" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let cage = create_cage(&app, &admin, "N-01", 0).await;
    let res = app
        .post(
            "/api/grown-egg-ponds",
            &admin,
            json!({ "name": "Pond Y", "egg_count": 100, "hatched_count": 90, "stage": "HATCHED" }),
        )
        .await;
    let pond = res.body["id"].as_i64().unwrap();
    let res = app
        .post(
            &format!("/api/grown-egg-ponds/{pond}/transfer"),
            &admin,
            json!({ "cage_id": cage, "count": i64::MAX }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = app.get(&format!("/api/grown-egg-ponds/{pond}"), &admin).await;
    assert_eq!(res.body["stage"], "HATCHED");
}
