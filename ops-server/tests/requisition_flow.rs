//! Stock requisition lifecycle over HTTP

mod common;

use common::TestApp;
use http::StatusCode;
use ops_server::ErrorCode;
use serde_json::{Value, json};

fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<shared::message::GatewayEvent>) -> Vec<String> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.event);
    }
    events
}

fn outbox_count(app: &TestApp) -> usize {
    std::fs::read_dir(app.state.config.outbox_dir())
        .map(|dir| dir.count())
        .unwrap_or(0)
}

/// `Subject:` lines of every queued mail
fn outbox_subjects(app: &TestApp) -> Vec<String> {
    let Ok(dir) = std::fs::read_dir(app.state.config.outbox_dir()) else {
        return Vec::new();
    };
    dir.filter_map(|entry| std::fs::read_to_string(entry.ok()?.path()).ok())
        .filter_map(|mail| {
            mail.lines()
                .find_map(|line| line.strip_prefix("Subject: ").map(str::to_string))
        })
        .collect()
}

fn item_id(request: &Value, index: usize) -> i64 {
    request["items"][index]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn full_requisition_cycle() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let employee = app.create_employee(&admin, "Marta", "marta@farm.test").await;
    let feed = app.create_stock(&admin, "Pellet 6mm", 100.0).await;
    let nets = app.create_stock(&admin, "Net twine", 10.0).await;
    let mut rx = app.state.gateway.subscribe();

    let res = app
        .post(
            "/api/requests",
            &admin,
            json!({
                "site": "North bay",
                "purpose": "Weekly feed",
                "requested_by": employee,
                "items": [
                    { "stock_in_id": feed, "quantity": 40.0 },
                    { "stock_in_id": nets, "quantity": 2.5 },
                ],
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["success"], true);
    let request = res.body["data"].clone();
    let id = request["id"].as_i64().unwrap();
    assert_eq!(request["request_number"], "REQ-000001");
    assert_eq!(request["status"], "PENDING");

    let res = app.post(&format!("/api/requests/{id}/approve"), &admin, json!({})).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["status"], "APPROVED");
    assert_eq!(outbox_count(&app), 1);

    // partial issue of the feed line only
    let res = app
        .post(
            "/api/requests/issue-materials",
            &admin,
            json!({
                "request_id": id,
                "items": [{ "item_id": item_id(&request, 0), "quantity": 15.0 }],
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["status"], "PARTIALLY_ISSUED");

    // the rest in one go
    let res = app.post(&format!("/api/requests/{id}/issue"), &admin, json!({})).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["status"], "ISSUED");

    let stock = app.get(&format!("/api/stock/{feed}"), &admin).await;
    assert_eq!(stock.body["quantity"], 60.0);
    let history = app.get(&format!("/api/stock/{feed}/history"), &admin).await;
    let outs = history
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter(|h| h["movement"] == "OUT")
        .count();
    assert_eq!(outs, 2);

    let res = app
        .post(
            "/api/requests/receive-materials",
            &admin,
            json!({
                "request_id": id,
                "items": [
                    { "item_id": item_id(&request, 0), "quantity": 40.0 },
                    { "item_id": item_id(&request, 1), "quantity": 2.5 },
                ],
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["data"]["status"], "RECEIVED");

    let summary = app.get(&format!("/api/requests/{id}/summary"), &admin).await;
    assert_eq!(summary.body["total_requested"], 42.5);
    assert_eq!(summary.body["total_received"], 42.5);

    let res = app.post(&format!("/api/requests/{id}/close"), &admin, json!({})).await;
    assert_eq!(res.body["data"]["status"], "CLOSED");

    let events = drain_events(&mut rx);
    for expected in [
        "requestCreated",
        "requestApproved",
        "materialsIssued",
        "stockUpdated",
        "materialsReceived",
        "requestClosed",
    ] {
        assert!(events.iter().any(|e| e == expected), "missing {expected}: {events:?}");
    }
}

#[tokio::test]
async fn workflow_guards() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let employee = app.create_employee(&admin, "Iker", "iker@farm.test").await;
    let salt = app.create_stock(&admin, "Salt", 5.0).await;

    let create = |qty: f64| {
        json!({
            "site": "Hatchery",
            "requested_by": employee,
            "items": [{ "stock_in_id": salt, "quantity": qty }],
        })
    };

    let res = app.post("/api/requests", &admin, create(8.0)).await;
    let id = res.body["data"]["id"].as_i64().unwrap();

    // issuing before approval is an invalid transition
    let res = app.post(&format!("/api/requests/{id}/issue"), &admin, json!({})).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(
        res.code(),
        Some(ErrorCode::RequestInvalidTransition.code() as u64)
    );

    // approval succeeds, issuing more than is on hand fails and changes nothing
    app.post(&format!("/api/requests/{id}/approve"), &admin, json!({})).await;
    let res = app.post(&format!("/api/requests/{id}/issue"), &admin, json!({})).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::StockInsufficient.code() as u64));
    let stock = app.get(&format!("/api/stock/{salt}"), &admin).await;
    assert_eq!(stock.body["quantity"], 5.0);

    // reject needs a reason
    let res = app
        .post(&format!("/api/requests/{id}/reject"), &admin, json!({ "reason": " " }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = app
        .post(
            &format!("/api/requests/{id}/reject"),
            &admin,
            json!({ "reason": "Order from supplier instead" }),
        )
        .await;
    assert_eq!(res.body["data"]["status"], "REJECTED");
    // approval and rejection each mail the requester
    assert_eq!(outbox_count(&app), 2);
    let number = res.body["data"]["request_number"].as_str().unwrap().to_string();
    let subjects = outbox_subjects(&app);
    assert!(subjects.contains(&format!("Request {number} approved")));
    assert!(subjects.contains(&format!("Request {number} rejected")));

    let res = app.delete(&format!("/api/requests/{id}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/api/requests/{id}"), &admin).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // empty line list
    let res = app
        .post(
            "/api/requests",
            &admin,
            json!({ "site": "Hatchery", "requested_by": employee, "items": [] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn staff_can_request_but_not_approve() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let staff = app.user_token(&admin, "diver", "STAFF").await;
    let employee = app.create_employee(&admin, "Leire", "leire@farm.test").await;
    let rope = app.create_stock(&admin, "Rope", 30.0).await;

    let res = app
        .post(
            "/api/requests",
            &staff,
            json!({
                "site": "South bay",
                "requested_by": employee,
                "items": [{ "stock_in_id": rope, "quantity": 3.0 }],
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    let id = res.body["data"]["id"].as_i64().unwrap();

    let res = app.post(&format!("/api/requests/{id}/approve"), &staff, json!({})).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn open_requests_pin_stock_and_requester() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let employee = app.create_employee(&admin, "Gorka", "gorka@farm.test").await;
    let rope = app.create_stock(&admin, "Mooring rope", 40.0).await;

    let res = app
        .post(
            "/api/requests",
            &admin,
            json!({
                "site": "Cage block B",
                "requested_by": employee,
                "items": [{ "stock_in_id": rope, "quantity": 12.0 }],
            }),
        )
        .await;
    let id = res.body["data"]["id"].as_i64().unwrap();

    let res = app.delete(&format!("/api/stock/{rope}"), &admin).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::StockInUse.code() as u64));

    let res = app.delete(&format!("/api/employees/{employee}"), &admin).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::EmployeeInUse.code() as u64));

    // once the request is rejected both may go; the request keeps its snapshot
    app.post(
        &format!("/api/requests/{id}/reject"),
        &admin,
        json!({ "reason": "Wrong site" }),
    )
    .await;
    let res = app.delete(&format!("/api/stock/{rope}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.delete(&format!("/api/employees/{employee}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&format!("/api/requests/{id}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"][0]["product_name"], "Mooring rope");
}
