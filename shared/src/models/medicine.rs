//! Medicine inventory and treatment records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    /// YYYY-MM-DD
    pub expiry_date: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Medicine {
    /// Expired strictly before `today` (YYYY-MM-DD compares lexically)
    pub fn is_expired(&self, today: &str) -> bool {
        self.expiry_date
            .as_deref()
            .is_some_and(|date| date < today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineCreate {
    pub name: String,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub expiry_date: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub expiry_date: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// `GET /api/medicines/expiring?days=30`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

/// Treatment record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Medication {
    pub id: i64,
    pub medicine_id: i64,
    pub cage_id: Option<i64>,
    pub pool_id: Option<i64>,
    pub dosage: f64,
    pub administered_at: i64,
    /// Employee id
    pub administered_by: Option<i64>,
    pub reason: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationCreate {
    pub medicine_id: i64,
    pub cage_id: Option<i64>,
    pub pool_id: Option<i64>,
    pub dosage: f64,
    pub administered_at: Option<i64>,
    pub administered_by: Option<i64>,
    pub reason: Option<String>,
}

/// `GET /api/medications` filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicationQuery {
    pub cage_id: Option<i64>,
    pub pool_id: Option<i64>,
    pub medicine_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicine(expiry: Option<&str>) -> Medicine {
        Medicine {
            id: 1,
            name: "Oxytetracycline".into(),
            unit: "g".into(),
            quantity: 10.0,
            expiry_date: expiry.map(String::from),
            supplier: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn expiry_is_exclusive_of_today() {
        assert!(medicine(Some("2026-01-01")).is_expired("2026-01-02"));
        assert!(!medicine(Some("2026-01-02")).is_expired("2026-01-02"));
        assert!(!medicine(None).is_expired("2026-01-02"));
    }
}
