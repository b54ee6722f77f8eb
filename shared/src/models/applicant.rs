//! Applicant Model (recruitment pipeline)

use serde::{Deserialize, Serialize};

use super::Employee;

/// Recruitment stage
///
/// APPLIED → SCREENING → INTERVIEW → OFFERED → HIRED, REJECTED from any
/// open stage. HIRED and REJECTED are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ApplicantStage {
    Applied,
    Screening,
    Interview,
    Offered,
    Hired,
    Rejected,
}

impl ApplicantStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "APPLIED",
            Self::Screening => "SCREENING",
            Self::Interview => "INTERVIEW",
            Self::Offered => "OFFERED",
            Self::Hired => "HIRED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    /// Forward skips are allowed, backward moves are not
    pub fn can_transition_to(&self, next: ApplicantStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Rejected => true,
            _ => next > *self,
        }
    }
}

/// Applicant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Applicant {
    pub id: i64,
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub stage: ApplicantStage,
    pub notes: Option<String>,
    /// Set once the applicant is hired
    pub employee_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create applicant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantCreate {
    pub job_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub notes: Option<String>,
}

/// Update applicant payload (stage changes go through [`StageChange`])
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub notes: Option<String>,
}

/// `PATCH /api/applicants/{id}/stage`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChange {
    pub stage: ApplicantStage,
    pub note: Option<String>,
}

/// Stage change result, `employee` is present when the applicant was hired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChangeResult {
    pub applicant: Applicant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Employee>,
}

/// `GET /api/applicants` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantQuery {
    pub job_id: Option<i64>,
    pub stage: Option<ApplicantStage>,
}

#[cfg(test)]
mod tests {
    use super::ApplicantStage::*;

    #[test]
    fn forward_moves_and_skips_are_allowed() {
        assert!(Applied.can_transition_to(Screening));
        assert!(Applied.can_transition_to(Offered));
        assert!(Interview.can_transition_to(Hired));
    }

    #[test]
    fn backward_and_same_stage_moves_are_refused() {
        assert!(!Interview.can_transition_to(Screening));
        assert!(!Offered.can_transition_to(Applied));
        assert!(!Screening.can_transition_to(Screening));
    }

    #[test]
    fn rejection_only_from_open_stages() {
        assert!(Applied.can_transition_to(Rejected));
        assert!(Offered.can_transition_to(Rejected));
        assert!(!Hired.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Hired));
    }

    #[test]
    fn stage_wire_format() {
        assert_eq!(serde_json::to_string(&Interview).unwrap(), "\"INTERVIEW\"");
        assert_eq!(Hired.as_str(), "HIRED");
    }
}
