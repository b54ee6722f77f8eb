//! Notification templates

use shared::models::{Applicant, ApplicantStage, Employee, Job, Request};

use super::OutgoingMail;

static APPLICANT_STAGE_TEMPLATE: &str = include_str!("./templates/applicant_stage.html");
static APPLICANT_HIRED_TEMPLATE: &str = include_str!("./templates/applicant_hired.html");
static APPLICANT_REJECTED_TEMPLATE: &str = include_str!("./templates/applicant_rejected.html");
static REQUEST_APPROVED_TEMPLATE: &str = include_str!("./templates/request_approved.html");
static REQUEST_REJECTED_TEMPLATE: &str = include_str!("./templates/request_rejected.html");

/// Replace every `{{KEY}}` with its HTML-escaped value
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |html, (key, value)| {
        html.replace(&format!("{{{{{key}}}}}"), &escape_html(value))
    })
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn stage_label(stage: ApplicantStage) -> &'static str {
    match stage {
        ApplicantStage::Applied => "Applied",
        ApplicantStage::Screening => "Screening",
        ApplicantStage::Interview => "Interview",
        ApplicantStage::Offered => "Offer",
        ApplicantStage::Hired => "Hired",
        ApplicantStage::Rejected => "Rejected",
    }
}

pub fn applicant_stage_changed(applicant: &Applicant, job: &Job, note: Option<&str>) -> OutgoingMail {
    let html_body = render(
        APPLICANT_STAGE_TEMPLATE,
        &[
            ("APPLICANT_NAME", applicant.full_name.as_str()),
            ("JOB_TITLE", job.title.as_str()),
            ("STAGE", stage_label(applicant.stage)),
            ("NOTE", note.unwrap_or_default()),
        ],
    );
    OutgoingMail {
        to: applicant.email.clone(),
        subject: format!("Your application for {}: {}", job.title, stage_label(applicant.stage)),
        html_body,
    }
}

pub fn applicant_hired(
    applicant: &Applicant,
    job: &Job,
    employee: &Employee,
    note: Option<&str>,
) -> OutgoingMail {
    let department = employee
        .department
        .as_deref()
        .map(|d| format!(" in {d}"))
        .unwrap_or_default();
    let html_body = render(
        APPLICANT_HIRED_TEMPLATE,
        &[
            ("APPLICANT_NAME", applicant.full_name.as_str()),
            ("JOB_TITLE", job.title.as_str()),
            ("DEPARTMENT", department.as_str()),
            ("NOTE", note.unwrap_or_default()),
        ],
    );
    OutgoingMail {
        to: employee.email.clone(),
        subject: format!("Welcome aboard, {}", employee.first_name),
        html_body,
    }
}

pub fn applicant_rejected(applicant: &Applicant, job: &Job, note: Option<&str>) -> OutgoingMail {
    let html_body = render(
        APPLICANT_REJECTED_TEMPLATE,
        &[
            ("APPLICANT_NAME", applicant.full_name.as_str()),
            ("JOB_TITLE", job.title.as_str()),
            ("NOTE", note.unwrap_or_default()),
        ],
    );
    OutgoingMail {
        to: applicant.email.clone(),
        subject: format!("Your application for {}", job.title),
        html_body,
    }
}

pub fn request_approved(request: &Request, employee: &Employee, approver: &str) -> OutgoingMail {
    let item_count = request.items.len().to_string();
    let employee_name = employee.full_name();
    let html_body = render(
        REQUEST_APPROVED_TEMPLATE,
        &[
            ("EMPLOYEE_NAME", employee_name.as_str()),
            ("REQUEST_NUMBER", request.request_number.as_str()),
            ("SITE", request.site.as_str()),
            ("APPROVER", approver),
            ("ITEM_COUNT", item_count.as_str()),
        ],
    );
    OutgoingMail {
        to: employee.email.clone(),
        subject: format!("Request {} approved", request.request_number),
        html_body,
    }
}

pub fn request_rejected(request: &Request, employee: &Employee) -> OutgoingMail {
    let employee_name = employee.full_name();
    let html_body = render(
        REQUEST_REJECTED_TEMPLATE,
        &[
            ("EMPLOYEE_NAME", employee_name.as_str()),
            ("REQUEST_NUMBER", request.request_number.as_str()),
            ("SITE", request.site.as_str()),
            ("REASON", request.rejection_reason.as_deref().unwrap_or_default()),
        ],
    );
    OutgoingMail {
        to: employee.email.clone(),
        subject: format!("Request {} rejected", request.request_number),
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{EmployeeStatus, EmploymentType, JobStatus, RequestStatus};

    fn applicant(stage: ApplicantStage) -> Applicant {
        Applicant {
            id: 1,
            job_id: 2,
            full_name: "Ana <Lima>".into(),
            email: "ana@example.com".into(),
            phone: None,
            resume_url: None,
            stage,
            notes: None,
            employee_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn job() -> Job {
        Job {
            id: 2,
            title: "Hatchery Technician".into(),
            department: Some("Hatchery".into()),
            description: None,
            location: None,
            employment_type: EmploymentType::FullTime,
            status: JobStatus::Open,
            openings: 1,
            closing_date: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn employee() -> Employee {
        Employee {
            id: 3,
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            email: "ana@example.com".into(),
            phone: None,
            department: Some("Hatchery".into()),
            position: Some("Hatchery Technician".into()),
            salary: None,
            hire_date: None,
            status: EmployeeStatus::Active,
            photo_url: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_render_replaces_and_escapes() {
        let html = render("<p>{{A}} and {{B}} and {{A}}</p>", &[("A", "x<y"), ("B", "z")]);
        assert_eq!(html, "<p>x&lt;y and z and x&lt;y</p>");
    }

    #[test]
    fn test_stage_mail_fills_every_placeholder() {
        let mail = applicant_stage_changed(&applicant(ApplicantStage::Interview), &job(), Some("Tue 10:00"));
        assert_eq!(mail.to, "ana@example.com");
        assert!(mail.subject.contains("Interview"));
        assert!(mail.html_body.contains("Ana &lt;Lima&gt;"));
        assert!(mail.html_body.contains("Tue 10:00"));
        assert!(!mail.html_body.contains("{{"));
    }

    #[test]
    fn test_hired_and_rejected_mails() {
        let hired = applicant_hired(&applicant(ApplicantStage::Hired), &job(), &employee(), None);
        assert!(hired.html_body.contains(" in Hatchery"));
        assert!(!hired.html_body.contains("{{"));

        let rejected = applicant_rejected(&applicant(ApplicantStage::Rejected), &job(), None);
        assert!(!rejected.html_body.contains("{{"));
    }

    #[test]
    fn test_request_mails() {
        let request = Request {
            id: 1,
            request_number: "REQ-000042".into(),
            site: "Cage block A".into(),
            purpose: None,
            requested_by: 3,
            status: RequestStatus::Rejected,
            approved_by: None,
            approved_at: None,
            rejection_reason: Some("Out of budget".into()),
            created_at: 0,
            updated_at: 0,
            items: vec![],
        };
        let approved = request_approved(&request, &employee(), "Store Manager");
        assert_eq!(approved.subject, "Request REQ-000042 approved");
        assert!(approved.html_body.contains("Ana Lima"));
        assert!(!approved.html_body.contains("{{"));

        let rejected = request_rejected(&request, &employee());
        assert!(rejected.html_body.contains("Out of budget"));
    }
}
