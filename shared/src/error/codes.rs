//! Unified error codes
//!
//! This module defines all error codes used by the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: HR errors (employees, jobs, applicants, clients, users)
//! - 4xxx: Requisition errors
//! - 5xxx: Stock errors
//! - 6xxx: Asset and upload errors
//! - 7xxx: Aquaculture errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot delete own account
    CannotDeleteSelf = 2006,
    /// Would leave the system without an active admin
    LastAdminRequired = 2007,

    // ==================== 3xxx: HR ====================
    EmployeeNotFound = 3001,
    EmployeeEmailExists = 3002,
    /// Employee is referenced by open requisitions
    EmployeeInUse = 3003,
    JobNotFound = 3101,
    /// Job no longer accepts applicants
    JobClosed = 3102,
    JobHasApplicants = 3103,
    ApplicantNotFound = 3201,
    /// Applicant already applied for this job
    ApplicantDuplicate = 3202,
    /// Stage change not allowed by the recruitment pipeline
    ApplicantInvalidStage = 3203,
    ClientNotFound = 3301,
    UserNotFound = 3401,
    UsernameExists = 3402,

    // ==================== 4xxx: Requisition ====================
    RequestNotFound = 4001,
    RequestItemNotFound = 4002,
    /// Action not allowed in the request's current status
    RequestInvalidTransition = 4003,
    /// Request has no line items
    RequestEmpty = 4004,
    /// Issue quantity exceeds what remains to be issued
    RequestOverIssue = 4005,
    /// Receive quantity exceeds what was issued
    RequestOverReceive = 4006,
    /// Same stock item appears twice in a request
    RequestDuplicateItem = 4007,

    // ==================== 5xxx: Stock ====================
    StockNotFound = 5001,
    /// Not enough quantity on hand
    StockInsufficient = 5002,
    StockSkuExists = 5003,
    /// Stock item is referenced by open requisitions
    StockInUse = 5004,

    // ==================== 6xxx: Assets ====================
    AssetNotFound = 6001,
    AssetCodeExists = 6002,
    /// Not enough units available
    AssetUnavailable = 6003,
    /// Units are out on request
    AssetInUse = 6004,
    AssetRequestNotFound = 6101,
    AssetRequestInvalidTransition = 6102,

    // ==================== 65xx: File Upload ====================
    FileTooLarge = 6501,
    UnsupportedFileFormat = 6502,
    InvalidImageFile = 6503,
    NoFileProvided = 6504,
    EmptyFile = 6505,
    NoFilename = 6506,
    InvalidFileExtension = 6507,
    FileStorageFailed = 6509,

    // ==================== 7xxx: Aquaculture ====================
    CageNotFound = 7001,
    CageCodeExists = 7002,
    CageNotActive = 7003,
    CageOverCapacity = 7004,
    /// Cage still holds fish
    CageHasStock = 7005,
    FeedingNotFound = 7101,
    MedicineNotFound = 7201,
    MedicineInsufficient = 7202,
    MedicineExpired = 7203,
    MedicineInUse = 7204,
    MedicationNotFound = 7301,
    /// Treatment must target exactly one cage or pool
    MedicationTargetInvalid = 7302,
    PoolNotFound = 7401,
    PoolNameExists = 7402,
    /// Parent pool is referenced by grown-egg ponds
    PoolInUse = 7403,
    PondNotFound = 7501,
    PondInvalidStage = 7502,
    /// Not enough hatched fry to transfer
    PondInsufficientFry = 7503,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9005,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default English message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotDeleteSelf => "Cannot delete own account",
            ErrorCode::LastAdminRequired => "At least one active administrator is required",

            // HR
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeEmailExists => "Employee email already exists",
            ErrorCode::EmployeeInUse => "Employee has open requisitions",
            ErrorCode::JobNotFound => "Job not found",
            ErrorCode::JobClosed => "Job is closed",
            ErrorCode::JobHasApplicants => "Job has applicants",
            ErrorCode::ApplicantNotFound => "Applicant not found",
            ErrorCode::ApplicantDuplicate => "Applicant already applied for this job",
            ErrorCode::ApplicantInvalidStage => "Stage change is not allowed",
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",

            // Requisition
            ErrorCode::RequestNotFound => "Request not found",
            ErrorCode::RequestItemNotFound => "Request item not found",
            ErrorCode::RequestInvalidTransition => "Action not allowed in current request status",
            ErrorCode::RequestEmpty => "Request has no items",
            ErrorCode::RequestOverIssue => "Issue quantity exceeds remaining quantity",
            ErrorCode::RequestOverReceive => "Receive quantity exceeds issued quantity",
            ErrorCode::RequestDuplicateItem => "Stock item appears more than once",

            // Stock
            ErrorCode::StockNotFound => "Stock item not found",
            ErrorCode::StockInsufficient => "Insufficient stock",
            ErrorCode::StockSkuExists => "SKU already exists",
            ErrorCode::StockInUse => "Stock item is used by open requests",

            // Assets
            ErrorCode::AssetNotFound => "Asset not found",
            ErrorCode::AssetCodeExists => "Asset code already exists",
            ErrorCode::AssetUnavailable => "Not enough asset units available",
            ErrorCode::AssetInUse => "Asset units are out on request",
            ErrorCode::AssetRequestNotFound => "Asset request not found",
            ErrorCode::AssetRequestInvalidTransition => {
                "Action not allowed in current asset request status"
            }

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::InvalidFileExtension => "Invalid file extension",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Aquaculture
            ErrorCode::CageNotFound => "Cage not found",
            ErrorCode::CageCodeExists => "Cage code already exists",
            ErrorCode::CageNotActive => "Cage is not active",
            ErrorCode::CageOverCapacity => "Cage capacity exceeded",
            ErrorCode::CageHasStock => "Cage still holds fish",
            ErrorCode::FeedingNotFound => "Feeding record not found",
            ErrorCode::MedicineNotFound => "Medicine not found",
            ErrorCode::MedicineInsufficient => "Insufficient medicine quantity",
            ErrorCode::MedicineExpired => "Medicine has expired",
            ErrorCode::MedicineInUse => "Medicine has treatment records",
            ErrorCode::MedicationNotFound => "Medication record not found",
            ErrorCode::MedicationTargetInvalid => "Treatment must target exactly one cage or pool",
            ErrorCode::PoolNotFound => "Parent fish pool not found",
            ErrorCode::PoolNameExists => "Parent fish pool name already exists",
            ErrorCode::PoolInUse => "Parent fish pool has grown-egg ponds",
            ErrorCode::PondNotFound => "Grown-egg pond not found",
            ErrorCode::PondInvalidStage => "Action not allowed in current pond stage",
            ErrorCode::PondInsufficientFry => "Not enough hatched fry",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2006 => Ok(ErrorCode::CannotDeleteSelf),
            2007 => Ok(ErrorCode::LastAdminRequired),

            // HR
            3001 => Ok(ErrorCode::EmployeeNotFound),
            3002 => Ok(ErrorCode::EmployeeEmailExists),
            3003 => Ok(ErrorCode::EmployeeInUse),
            3101 => Ok(ErrorCode::JobNotFound),
            3102 => Ok(ErrorCode::JobClosed),
            3103 => Ok(ErrorCode::JobHasApplicants),
            3201 => Ok(ErrorCode::ApplicantNotFound),
            3202 => Ok(ErrorCode::ApplicantDuplicate),
            3203 => Ok(ErrorCode::ApplicantInvalidStage),
            3301 => Ok(ErrorCode::ClientNotFound),
            3401 => Ok(ErrorCode::UserNotFound),
            3402 => Ok(ErrorCode::UsernameExists),

            // Requisition
            4001 => Ok(ErrorCode::RequestNotFound),
            4002 => Ok(ErrorCode::RequestItemNotFound),
            4003 => Ok(ErrorCode::RequestInvalidTransition),
            4004 => Ok(ErrorCode::RequestEmpty),
            4005 => Ok(ErrorCode::RequestOverIssue),
            4006 => Ok(ErrorCode::RequestOverReceive),
            4007 => Ok(ErrorCode::RequestDuplicateItem),

            // Stock
            5001 => Ok(ErrorCode::StockNotFound),
            5002 => Ok(ErrorCode::StockInsufficient),
            5003 => Ok(ErrorCode::StockSkuExists),
            5004 => Ok(ErrorCode::StockInUse),

            // Assets
            6001 => Ok(ErrorCode::AssetNotFound),
            6002 => Ok(ErrorCode::AssetCodeExists),
            6003 => Ok(ErrorCode::AssetUnavailable),
            6004 => Ok(ErrorCode::AssetInUse),
            6101 => Ok(ErrorCode::AssetRequestNotFound),
            6102 => Ok(ErrorCode::AssetRequestInvalidTransition),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6506 => Ok(ErrorCode::NoFilename),
            6507 => Ok(ErrorCode::InvalidFileExtension),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Aquaculture
            7001 => Ok(ErrorCode::CageNotFound),
            7002 => Ok(ErrorCode::CageCodeExists),
            7003 => Ok(ErrorCode::CageNotActive),
            7004 => Ok(ErrorCode::CageOverCapacity),
            7005 => Ok(ErrorCode::CageHasStock),
            7101 => Ok(ErrorCode::FeedingNotFound),
            7201 => Ok(ErrorCode::MedicineNotFound),
            7202 => Ok(ErrorCode::MedicineInsufficient),
            7203 => Ok(ErrorCode::MedicineExpired),
            7204 => Ok(ErrorCode::MedicineInUse),
            7301 => Ok(ErrorCode::MedicationNotFound),
            7302 => Ok(ErrorCode::MedicationTargetInvalid),
            7401 => Ok(ErrorCode::PoolNotFound),
            7402 => Ok(ErrorCode::PoolNameExists),
            7403 => Ok(ErrorCode::PoolInUse),
            7501 => Ok(ErrorCode::PondNotFound),
            7502 => Ok(ErrorCode::PondInvalidStage),
            7503 => Ok(ErrorCode::PondInsufficientFry),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
