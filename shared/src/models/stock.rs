//! Stock Models (stock-in records and movement history)

use serde::{Deserialize, Serialize};

/// Stock-in entity: quantity on hand for a product at a store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockIn {
    pub id: i64,
    pub product_name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub reorder_level: f64,
    /// Store / location name
    pub store: String,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StockIn {
    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

/// Create stock-in payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInCreate {
    pub product_name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub reorder_level: Option<f64>,
    pub store: String,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// Update stock-in payload, a changed `quantity` is recorded as an adjustment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockInUpdate {
    pub product_name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub reorder_level: Option<f64>,
    pub store: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// `POST /api/stock/{id}/restock`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restock {
    pub quantity: f64,
    pub note: Option<String>,
}

/// `GET /api/stock` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockQuery {
    pub store: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StockMovement {
    In,
    Out,
    Adjustment,
}

/// Append-only movement ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockHistory {
    pub id: i64,
    pub stock_in_id: i64,
    pub movement: StockMovement,
    /// Signed: negative for OUT and downward adjustments
    pub quantity: f64,
    pub balance_after: f64,
    /// e.g. a request number
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

/// `GET /api/stock/history` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub stock_in_id: Option<i64>,
    pub limit: Option<i64>,
}
