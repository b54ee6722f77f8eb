//! Applicant API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{applicant, begin, commit, employee, job};
use crate::mail;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_email,
    validate_optional_email, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{
    Applicant, ApplicantCreate, ApplicantQuery, ApplicantStage, ApplicantUpdate, Employee,
    EmployeeCreate, EmployeeStatus, Job, JobStatus, StageChange, StageChangeResult,
};
use shared::util::today;

const RESOURCE: &str = "applicant";

fn applicant_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ApplicantNotFound, format!("Applicant {} not found", id))
}

fn job_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::JobNotFound, format!("Job {} not found", id))
}

/// "Ana María López" → ("Ana", "María López")
fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Stage change outcome, `job_closed` when the last opening was filled
#[derive(Debug)]
struct StageOutcome {
    result: StageChangeResult,
    job: Job,
    job_closed: bool,
}

/// Move an applicant through the pipeline.
///
/// 录用时在同一事务中创建员工; 录用人数达到 `openings` 时关闭职位。
async fn apply_stage(pool: &SqlitePool, id: i64, change: &StageChange) -> AppResult<StageOutcome> {
    let note = change
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let mut tx = begin(pool).await?;
    let current = applicant::find_by_id_in(&mut tx, id)
        .await?
        .ok_or_else(|| applicant_not_found(id))?;
    if !current.stage.can_transition_to(change.stage) {
        return Err(AppError::invalid_transition(
            ErrorCode::ApplicantInvalidStage,
            current.stage.as_str(),
            change.stage.as_str(),
        ));
    }
    let mut job = job::find_by_id_in(&mut tx, current.job_id)
        .await?
        .ok_or_else(|| job_not_found(current.job_id))?;

    let mut hired: Option<Employee> = None;
    let mut job_closed = false;
    if change.stage == ApplicantStage::Hired {
        let (first_name, last_name) = split_full_name(&current.full_name);
        let new_employee = employee::insert(
            &mut tx,
            &EmployeeCreate {
                first_name,
                last_name,
                email: current.email.clone(),
                phone: current.phone.clone(),
                department: job.department.clone(),
                position: Some(job.title.clone()),
                salary: None,
                hire_date: Some(today()),
                status: Some(EmployeeStatus::Active),
                photo_url: None,
            },
        )
        .await?;
        applicant::set_stage(&mut tx, id, change.stage, Some(new_employee.id), note).await?;

        let hires = applicant::count_hired(&mut tx, job.id).await?;
        if job.status == JobStatus::Open && hires >= job.openings {
            job::set_status(&mut tx, job.id, JobStatus::Closed).await?;
            job.status = JobStatus::Closed;
            job_closed = true;
        }
        hired = Some(new_employee);
    } else {
        applicant::set_stage(&mut tx, id, change.stage, None, note).await?;
    }

    let updated = applicant::find_by_id_in(&mut tx, id)
        .await?
        .ok_or_else(|| applicant_not_found(id))?;
    commit(tx).await?;

    tracing::info!(
        applicant_id = id,
        from = current.stage.as_str(),
        to = change.stage.as_str(),
        job_closed,
        "Applicant stage changed"
    );

    Ok(StageOutcome {
        result: StageChangeResult {
            applicant: updated,
            employee: hired,
        },
        job,
        job_closed,
    })
}

/// List applicants, `?job_id=&stage=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ApplicantQuery>,
) -> AppResult<Json<Vec<Applicant>>> {
    let applicants = applicant::find_all(&state.pool, &query).await?;
    Ok(Json(applicants))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Applicant>> {
    let applicant = applicant::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| applicant_not_found(id))?;
    Ok(Json(applicant))
}

/// Apply for an open job
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ApplicantCreate>,
) -> AppResult<Json<Applicant>> {
    validate_required_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_email(&payload.email, "email")?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.resume_url, "resume_url", MAX_URL_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let job = job::find_by_id(&state.pool, payload.job_id)
        .await?
        .ok_or_else(|| job_not_found(payload.job_id))?;
    if job.status != JobStatus::Open {
        return Err(AppError::with_message(
            ErrorCode::JobClosed,
            format!("Job '{}' is closed", job.title),
        ));
    }

    let applicant = applicant::create(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "applicantCreated", applicant.id, Some(&applicant));
    Ok(Json(applicant))
}

/// Edit contact details (stage moves through `PATCH /{id}/stage`)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApplicantUpdate>,
) -> AppResult<Json<Applicant>> {
    if let Some(name) = &payload.full_name {
        validate_required_text(name, "full_name", MAX_NAME_LEN)?;
    }
    validate_optional_email(&payload.email, "email")?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.resume_url, "resume_url", MAX_URL_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let applicant = applicant::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "applicantUpdated", id, Some(&applicant));
    Ok(Json(applicant))
}

/// Change the pipeline stage and notify the applicant
pub async fn change_stage(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StageChange>,
) -> AppResult<Json<StageChangeResult>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    let outcome = apply_stage(&state.pool, id, &payload).await?;
    let applicant = &outcome.result.applicant;
    let note = payload.note.as_deref();

    state.broadcast(RESOURCE, "applicantStageChanged", id, Some(applicant));
    let mail = match (&outcome.result.employee, applicant.stage) {
        (Some(hired), _) => {
            state.broadcast("employee", "employeeCreated", hired.id, Some(hired));
            state.broadcast(RESOURCE, "applicantHired", id, Some(&outcome.result));
            mail::applicant_hired(applicant, &outcome.job, hired, note)
        }
        (None, ApplicantStage::Rejected) => mail::applicant_rejected(applicant, &outcome.job, note),
        (None, _) => mail::applicant_stage_changed(applicant, &outcome.job, note),
    };
    if outcome.job_closed {
        state.broadcast("job", "jobClosed", outcome.job.id, Some(&outcome.job));
    }
    state.notify(mail).await;

    Ok(Json(outcome.result))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = applicant::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "applicantDeleted", id, None);
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::JobCreate;

    async fn setup(openings: i64) -> (SqlitePool, Job, Applicant) {
        let db = DbService::in_memory().await.unwrap();
        let pool = db.pool;
        let job = job::create(
            &pool,
            JobCreate {
                title: "Hatchery Technician".into(),
                department: Some("Hatchery".into()),
                description: None,
                location: None,
                employment_type: None,
                openings: Some(openings),
                closing_date: None,
            },
        )
        .await
        .unwrap();
        let applicant = applicant::create(
            &pool,
            ApplicantCreate {
                job_id: job.id,
                full_name: "Carmen Ruiz Soto".into(),
                email: "carmen@example.com".into(),
                phone: Some("600100200".into()),
                resume_url: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        (pool, job, applicant)
    }

    fn to(stage: ApplicantStage) -> StageChange {
        StageChange { stage, note: None }
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("  Carmen Ruiz Soto "),
            ("Carmen".to_string(), "Ruiz Soto".to_string())
        );
        assert_eq!(split_full_name("Cher"), ("Cher".to_string(), String::new()));
    }

    #[tokio::test]
    async fn test_hire_creates_employee_and_closes_job() {
        let (pool, job, applicant) = setup(1).await;
        apply_stage(&pool, applicant.id, &to(ApplicantStage::Interview))
            .await
            .unwrap();

        let outcome = apply_stage(
            &pool,
            applicant.id,
            &StageChange {
                stage: ApplicantStage::Hired,
                note: Some("Starts Monday".into()),
            },
        )
        .await
        .unwrap();

        let hired = outcome.result.employee.expect("employee created");
        assert_eq!(hired.first_name, "Carmen");
        assert_eq!(hired.last_name, "Ruiz Soto");
        assert_eq!(hired.position.as_deref(), Some("Hatchery Technician"));
        assert_eq!(hired.department.as_deref(), Some("Hatchery"));
        assert_eq!(outcome.result.applicant.stage, ApplicantStage::Hired);
        assert_eq!(outcome.result.applicant.employee_id, Some(hired.id));
        assert_eq!(outcome.result.applicant.notes.as_deref(), Some("Starts Monday"));
        assert!(outcome.job_closed);

        let reloaded = job::find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, JobStatus::Closed);
    }

    #[tokio::test]
    async fn test_backward_and_terminal_moves_are_refused() {
        let (pool, _job, applicant) = setup(2).await;
        apply_stage(&pool, applicant.id, &to(ApplicantStage::Offered))
            .await
            .unwrap();

        let err = apply_stage(&pool, applicant.id, &to(ApplicantStage::Screening))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApplicantInvalidStage);

        apply_stage(&pool, applicant.id, &to(ApplicantStage::Rejected))
            .await
            .unwrap();
        let err = apply_stage(&pool, applicant.id, &to(ApplicantStage::Hired))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApplicantInvalidStage);
    }

    #[tokio::test]
    async fn test_failed_hire_rolls_back() {
        let (pool, job, applicant) = setup(1).await;
        // an employee already owns the applicant's email
        employee::create(
            &pool,
            EmployeeCreate {
                first_name: "Other".into(),
                last_name: "Person".into(),
                email: "carmen@example.com".into(),
                phone: None,
                department: None,
                position: None,
                salary: None,
                hire_date: None,
                status: None,
                photo_url: None,
            },
        )
        .await
        .unwrap();

        let err = apply_stage(&pool, applicant.id, &to(ApplicantStage::Hired))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmployeeEmailExists);

        let unchanged = applicant::find_by_id(&pool, applicant.id).await.unwrap().unwrap();
        assert_eq!(unchanged.stage, ApplicantStage::Applied);
        let job = job::find_by_id(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Open);
    }
}
