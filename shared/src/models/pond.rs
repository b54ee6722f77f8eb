//! Hatchery Models: parent (brood) fish pools and grown-egg ponds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PoolStatus {
    Active,
    Resting,
    Retired,
}

/// Brood stock pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ParentFishPool {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub male_count: i64,
    pub female_count: i64,
    pub water_temperature: Option<f64>,
    pub status: PoolStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentFishPoolCreate {
    pub name: String,
    pub species: Option<String>,
    pub male_count: Option<i64>,
    pub female_count: Option<i64>,
    pub water_temperature: Option<f64>,
    pub status: Option<PoolStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentFishPoolUpdate {
    pub name: Option<String>,
    pub species: Option<String>,
    pub male_count: Option<i64>,
    pub female_count: Option<i64>,
    pub water_temperature: Option<f64>,
    pub status: Option<PoolStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PondStage {
    Incubating,
    Hatched,
    Transferred,
}

impl PondStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incubating => "INCUBATING",
            Self::Hatched => "HATCHED",
            Self::Transferred => "TRANSFERRED",
        }
    }
}

/// Incubation pond for fertilised eggs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct GrownEggPond {
    pub id: i64,
    pub name: String,
    pub parent_pool_id: Option<i64>,
    pub egg_count: i64,
    pub hatched_count: i64,
    pub spawned_at: Option<String>,
    pub stage: PondStage,
    /// Cage that received the fry
    pub transferred_to: Option<i64>,
    pub transferred_count: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrownEggPondCreate {
    pub name: String,
    pub parent_pool_id: Option<i64>,
    pub egg_count: Option<i64>,
    pub hatched_count: Option<i64>,
    pub spawned_at: Option<String>,
    pub stage: Option<PondStage>,
    pub notes: Option<String>,
}

/// Moving to TRANSFERRED only happens through the transfer action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrownEggPondUpdate {
    pub name: Option<String>,
    pub parent_pool_id: Option<i64>,
    pub egg_count: Option<i64>,
    pub hatched_count: Option<i64>,
    pub spawned_at: Option<String>,
    pub stage: Option<PondStage>,
    pub notes: Option<String>,
}

/// `POST /api/grown-egg-ponds/{id}/transfer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FryTransfer {
    pub cage_id: i64,
    pub count: i64,
}
