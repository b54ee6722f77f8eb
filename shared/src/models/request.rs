//! Stock Requisition Models

use serde::{Deserialize, Serialize};

/// Request lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RequestStatus {
    Pending,
    Approved,
    PartiallyIssued,
    Issued,
    Received,
    Closed,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::PartiallyIssued => "PARTIALLY_ISSUED",
            Self::Issued => "ISSUED",
            Self::Received => "RECEIVED",
            Self::Closed => "CLOSED",
            Self::Rejected => "REJECTED",
        }
    }

    /// CLOSED and REJECTED requests no longer hold stock
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Rejected)
    }
}

/// Line item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RequestItemStatus {
    Pending,
    PartiallyIssued,
    Issued,
    Received,
}

impl RequestItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PartiallyIssued => "PARTIALLY_ISSUED",
            Self::Issued => "ISSUED",
            Self::Received => "RECEIVED",
        }
    }
}

/// Requisition header with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Request {
    pub id: i64,
    /// REQ-000001
    pub request_number: String,
    pub site: String,
    pub purpose: Option<String>,
    /// Employee id
    pub requested_by: i64,
    pub status: RequestStatus,
    /// User id of the approver
    pub approved_by: Option<i64>,
    pub approved_at: Option<i64>,
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<RequestItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RequestItem {
    pub id: i64,
    pub request_id: i64,
    pub stock_in_id: i64,
    /// Snapshot taken at request time
    pub product_name: String,
    pub unit: String,
    pub quantity_requested: f64,
    pub quantity_issued: f64,
    pub quantity_received: f64,
    pub status: RequestItemStatus,
}

/// Line of a create/update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestItemInput {
    pub stock_in_id: i64,
    pub quantity: f64,
}

/// Create request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCreate {
    pub site: String,
    pub purpose: Option<String>,
    pub requested_by: i64,
    pub items: Vec<RequestItemInput>,
}

/// Update request payload (PENDING only); `items` replaces all lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestUpdate {
    pub site: Option<String>,
    pub purpose: Option<String>,
    pub items: Option<Vec<RequestItemInput>>,
}

/// `POST /api/requests/{id}/reject`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Quantity against an existing request line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineQuantity {
    pub item_id: i64,
    pub quantity: f64,
}

/// `POST /api/requests/issue-materials`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueMaterials {
    pub request_id: i64,
    pub items: Vec<LineQuantity>,
    pub note: Option<String>,
}

/// `POST /api/requests/receive-materials`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveMaterials {
    pub request_id: i64,
    pub items: Vec<LineQuantity>,
}

/// `GET /api/requests` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub site: Option<String>,
    pub requested_by: Option<i64>,
}

/// Per-line reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub item_id: i64,
    pub stock_in_id: i64,
    pub product_name: String,
    pub unit: String,
    pub requested: f64,
    pub issued: f64,
    pub received: f64,
    pub remaining_to_issue: f64,
    pub remaining_to_receive: f64,
    pub status: RequestItemStatus,
}

/// `GET /api/requests/{id}/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSummary {
    pub request_id: i64,
    pub request_number: String,
    pub status: RequestStatus,
    pub items: Vec<ItemSummary>,
    pub total_requested: f64,
    pub total_issued: f64,
    pub total_received: f64,
}
