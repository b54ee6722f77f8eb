//! Job Model (open positions)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum JobStatus {
    Open,
    Closed,
}

/// Job entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub department: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: EmploymentType,
    pub status: JobStatus,
    pub openings: i64,
    pub closing_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create job payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreate {
    pub title: String,
    pub department: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub openings: Option<i64>,
    pub closing_date: Option<String>,
}

/// Update job payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub status: Option<JobStatus>,
    pub openings: Option<i64>,
    pub closing_date: Option<String>,
}
