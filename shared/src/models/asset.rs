//! Asset Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AssetCondition {
    New,
    Good,
    Fair,
    Poor,
    Damaged,
}

/// Asset entity (tools, equipment, vehicles ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub asset_code: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub condition: AssetCondition,
    pub quantity_total: i64,
    /// Units not currently out on request
    pub quantity_available: i64,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetCreate {
    pub name: String,
    pub asset_code: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub condition: Option<AssetCondition>,
    pub quantity_total: Option<i64>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub asset_code: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub condition: Option<AssetCondition>,
    pub quantity_total: Option<i64>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
}
