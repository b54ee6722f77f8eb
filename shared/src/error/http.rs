//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::EmployeeNotFound
            | Self::JobNotFound
            | Self::ApplicantNotFound
            | Self::ClientNotFound
            | Self::UserNotFound
            | Self::RequestNotFound
            | Self::RequestItemNotFound
            | Self::StockNotFound
            | Self::AssetNotFound
            | Self::AssetRequestNotFound
            | Self::CageNotFound
            | Self::FeedingNotFound
            | Self::MedicineNotFound
            | Self::MedicationNotFound
            | Self::PoolNotFound
            | Self::PondNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmployeeEmailExists
            | Self::EmployeeInUse
            | Self::JobClosed
            | Self::JobHasApplicants
            | Self::ApplicantDuplicate
            | Self::ApplicantInvalidStage
            | Self::UsernameExists
            | Self::RequestInvalidTransition
            | Self::StockInsufficient
            | Self::StockSkuExists
            | Self::StockInUse
            | Self::AssetCodeExists
            | Self::AssetUnavailable
            | Self::AssetInUse
            | Self::AssetRequestInvalidTransition
            | Self::CageCodeExists
            | Self::CageNotActive
            | Self::CageOverCapacity
            | Self::CageHasStock
            | Self::MedicineInsufficient
            | Self::MedicineInUse
            | Self::PoolNameExists
            | Self::PoolInUse
            | Self::PondInvalidStage
            | Self::PondInsufficientFry => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::CannotDeleteSelf
            | Self::LastAdminRequired => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::RequestNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ErrorCode::PondNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::RequestInvalidTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::StockInsufficient.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::JobClosed.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::UsernameExists.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_and_permission_status() {
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::AccountDisabled.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::CannotDeleteSelf.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::RequestOverIssue.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::MedicineExpired.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::UnsupportedFileFormat.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::FileTooLarge.http_status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
