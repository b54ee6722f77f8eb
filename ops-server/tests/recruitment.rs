//! Hiring pipeline over HTTP

mod common;

use common::TestApp;
use http::StatusCode;
use ops_server::ErrorCode;
use serde_json::json;

async fn open_job(app: &TestApp, token: &str, openings: i64) -> i64 {
    let res = app
        .post(
            "/api/jobs",
            token,
            json!({
                "title": "Hatchery technician",
                "department": "Hatchery",
                "openings": openings,
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["status"], "OPEN");
    res.body["id"].as_i64().unwrap()
}

async fn apply(app: &TestApp, token: &str, job_id: i64, name: &str, email: &str) -> i64 {
    let res = app
        .post(
            "/api/applicants",
            token,
            json!({ "job_id": job_id, "full_name": name, "email": email }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["stage"], "APPLIED");
    res.body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn hiring_creates_employee_and_fills_job() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let job = open_job(&app, &admin, 1).await;
    let ane = apply(&app, &admin, job, "Ane Goikoetxea Lasa", "ane@mail.test").await;
    let unai = apply(&app, &admin, job, "Unai", "unai@mail.test").await;

    let res = app
        .patch(
            &format!("/api/applicants/{ane}/stage"),
            &admin,
            json!({ "stage": "INTERVIEW" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert!(res.body.get("employee").is_none());

    let res = app
        .patch(
            &format!("/api/applicants/{ane}/stage"),
            &admin,
            json!({ "stage": "HIRED", "note": "Starts Monday" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["applicant"]["stage"], "HIRED");
    let employee = &res.body["employee"];
    assert_eq!(employee["first_name"], "Ane");
    assert_eq!(employee["last_name"], "Goikoetxea Lasa");
    assert_eq!(employee["email"], "ane@mail.test");
    assert_eq!(employee["department"], "Hatchery");
    assert_eq!(
        res.body["applicant"]["employee_id"],
        employee["id"]
    );

    let job_now = app.get(&format!("/api/jobs/{job}"), &admin).await;
    assert_eq!(job_now.body["status"], "CLOSED");

    // the filled job takes no further applications
    let res = app
        .post(
            "/api/applicants",
            &admin,
            json!({ "job_id": job, "full_name": "Late Comer", "email": "late@mail.test" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::JobClosed.code() as u64));

    // remaining candidates can still be rejected
    let res = app
        .patch(
            &format!("/api/applicants/{unai}/stage"),
            &admin,
            json!({ "stage": "REJECTED" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    // every stage change mailed the applicant
    let mails = std::fs::read_dir(app.state.config.outbox_dir()).unwrap().count();
    assert_eq!(mails, 3);
}

#[tokio::test]
async fn stage_moves_are_forward_only() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let job = open_job(&app, &admin, 3).await;
    let id = apply(&app, &admin, job, "Mikel Arana", "mikel@mail.test").await;

    app.patch(
        &format!("/api/applicants/{id}/stage"),
        &admin,
        json!({ "stage": "OFFERED" }),
    )
    .await;
    let res = app
        .patch(
            &format!("/api/applicants/{id}/stage"),
            &admin,
            json!({ "stage": "SCREENING" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::ApplicantInvalidStage.code() as u64));

    // duplicate application to the same job
    let res = app
        .post(
            "/api/applicants",
            &admin,
            json!({ "job_id": job, "full_name": "Mikel Arana", "email": "mikel@mail.test" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::ApplicantDuplicate.code() as u64));

    // the job stays open with openings left
    let job_now = app.get(&format!("/api/jobs/{job}"), &admin).await;
    assert_eq!(job_now.body["status"], "OPEN");
}

#[tokio::test]
async fn employees_crud_and_filters() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_employee(&admin, "Nerea", "nerea@farm.test").await;
    app.create_employee(&admin, "Jon", "jon@farm.test").await;

    let res = app
        .post(
            "/api/employees",
            &admin,
            json!({ "first_name": "X", "last_name": "Y", "email": "nerea@farm.test" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::EmployeeEmailExists.code() as u64));

    let res = app
        .post(
            "/api/employees",
            &admin,
            json!({ "first_name": "X", "last_name": "Y", "email": "not-an-email" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/employees?search=nerea", &admin).await;
    assert_eq!(res.body.as_array().unwrap().len(), 1);

    let res = app
        .put(&format!("/api/employees/{id}"), &admin, json!({ "position": "Diver" }))
        .await;
    assert_eq!(res.body["position"], "Diver");

    let res = app.delete(&format!("/api/employees/{id}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/api/employees/{id}"), &admin).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn jobs_with_applicants_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let job = open_job(&app, &admin, 1).await;
    let applicant = apply(&app, &admin, job, "Itziar Mendia", "itziar@mail.test").await;

    let res = app.delete(&format!("/api/jobs/{job}"), &admin).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), Some(ErrorCode::JobHasApplicants.code() as u64));

    let res = app.delete(&format!("/api/applicants/{applicant}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.delete(&format!("/api/jobs/{job}"), &admin).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/api/jobs/{job}"), &admin).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
