//! Feeding Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Feeding {
    pub id: i64,
    pub cage_id: i64,
    pub feed_type: String,
    pub quantity_kg: f64,
    /// Epoch millis
    pub fed_at: i64,
    /// Employee id
    pub fed_by: Option<i64>,
    /// Feed drawn from this stock item
    pub stock_in_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedingCreate {
    pub cage_id: i64,
    pub feed_type: String,
    pub quantity_kg: f64,
    pub fed_at: Option<i64>,
    pub fed_by: Option<i64>,
    pub stock_in_id: Option<i64>,
    pub notes: Option<String>,
}

/// Quantity and stock link are fixed once recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedingUpdate {
    pub feed_type: Option<String>,
    pub fed_at: Option<i64>,
    pub fed_by: Option<i64>,
    pub notes: Option<String>,
}

/// `GET /api/feedings` filters, `from`/`to` are epoch millis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedingQuery {
    pub cage_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// `GET /api/feedings/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FeedingSummary {
    pub cage_id: Option<i64>,
    pub total_kg: f64,
    pub count: i64,
}
