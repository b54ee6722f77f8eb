//! User Model (login accounts)

use serde::{Deserialize, Serialize};

/// Account role, permissions are derived from it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Role {
    Admin,
    Manager,
    Storekeeper,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Storekeeper => "STOREKEEPER",
            Role::Staff => "STAFF",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "STOREKEEPER" => Some(Role::Storekeeper),
            "STAFF" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// User row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing, default)]
    pub hash_pass: String,
    pub role: Role,
    pub employee_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub employee_id: Option<i64>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub employee_id: Option<i64>,
    pub is_active: Option<bool>,
}
