//! Cage Model (grow-out net cages)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CageStatus {
    Active,
    Fallow,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cage {
    pub id: i64,
    pub code: String,
    pub location: Option<String>,
    pub species: Option<String>,
    /// 0 = unlimited
    pub capacity: i64,
    pub current_stock: i64,
    pub status: CageStatus,
    pub stocked_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cage {
    /// Free room for `count` more fish; an overflowing total never fits
    pub fn has_room_for(&self, count: i64) -> bool {
        match self.current_stock.checked_add(count) {
            Some(total) => self.capacity == 0 || total <= self.capacity,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CageCreate {
    pub code: String,
    pub location: Option<String>,
    pub species: Option<String>,
    pub capacity: Option<i64>,
    pub current_stock: Option<i64>,
    pub status: Option<CageStatus>,
    pub stocked_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CageUpdate {
    pub code: Option<String>,
    pub location: Option<String>,
    pub species: Option<String>,
    pub capacity: Option<i64>,
    pub current_stock: Option<i64>,
    pub status: Option<CageStatus>,
    pub stocked_at: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cage(capacity: i64, current_stock: i64) -> Cage {
        Cage {
            id: 1,
            code: "C-01".into(),
            location: None,
            species: None,
            capacity,
            current_stock,
            status: CageStatus::Active,
            stocked_at: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn room_checks() {
        assert!(cage(1000, 400).has_room_for(600));
        assert!(!cage(1000, 400).has_room_for(601));
        assert!(cage(0, 400).has_room_for(1_000_000));
    }

    #[test]
    fn overflowing_totals_never_fit() {
        assert!(!cage(i64::MAX, 10).has_room_for(i64::MAX));
        assert!(!cage(0, 10).has_room_for(i64::MAX));
    }
}
