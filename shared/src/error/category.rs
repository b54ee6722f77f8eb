//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: HR errors
/// - 4xxx: Requisition errors
/// - 5xxx: Stock errors
/// - 6xxx: Asset / upload errors
/// - 7xxx: Aquaculture errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Hr,
    Requisition,
    Stock,
    Asset,
    Aquaculture,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Hr,
            4000..5000 => Self::Requisition,
            5000..6000 => Self::Stock,
            6000..7000 => Self::Asset,
            7000..8000 => Self::Aquaculture,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Hr => "hr",
            Self::Requisition => "requisition",
            Self::Stock => "stock",
            Self::Asset => "asset",
            Self::Aquaculture => "aquaculture",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
