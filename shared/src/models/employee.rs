//! Employee Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Terminated,
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    /// YYYY-MM-DD
    pub hire_date: Option<String>,
    pub status: EmployeeStatus,
    pub photo_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub photo_url: Option<String>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub photo_url: Option<String>,
}

/// `GET /api/employees` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeQuery {
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    /// Matches name or email
    pub search: Option<String>,
}
