//! Asset Requisition Models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AssetRequestStatus {
    Pending,
    Approved,
    Rejected,
    Issued,
    Returned,
}

impl AssetRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Issued => "ISSUED",
            Self::Returned => "RETURNED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AssetRequest {
    pub id: i64,
    pub requested_by: i64,
    pub purpose: Option<String>,
    pub status: AssetRequestStatus,
    pub approved_by: Option<i64>,
    pub rejection_reason: Option<String>,
    pub issued_at: Option<i64>,
    pub returned_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<AssetRequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AssetRequestItem {
    pub id: i64,
    pub asset_request_id: i64,
    pub asset_id: i64,
    pub asset_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRequestItemInput {
    pub asset_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRequestCreate {
    pub requested_by: i64,
    pub purpose: Option<String>,
    pub items: Vec<AssetRequestItemInput>,
}

/// `GET /api/asset-requests` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRequestQuery {
    pub status: Option<AssetRequestStatus>,
    pub requested_by: Option<i64>,
}
