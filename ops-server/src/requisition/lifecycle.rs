//! 申请单状态机
//!
//! | 操作 | 允许的当前状态 | 目标 |
//! |------|----------------|------|
//! | update | PENDING | PENDING |
//! | approve | PENDING | APPROVED |
//! | reject | PENDING, APPROVED | REJECTED |
//! | issue | APPROVED, PARTIALLY_ISSUED | 推导 |
//! | receive | PARTIALLY_ISSUED, ISSUED | 推导 |
//! | close | RECEIVED | CLOSED |
//! | delete | PENDING, REJECTED | 删除 |

use shared::ErrorCode;
use shared::models::RequestStatus;

use crate::AppError;

/// 对申请单执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Update,
    Approve,
    Reject,
    Issue,
    Receive,
    Close,
    Delete,
}

impl RequestAction {
    pub fn allowed_from(&self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Self::Update => &[Pending],
            Self::Approve => &[Pending],
            Self::Reject => &[Pending, Approved],
            Self::Issue => &[Approved, PartiallyIssued],
            Self::Receive => &[PartiallyIssued, Issued],
            Self::Close => &[Received],
            Self::Delete => &[Pending, Rejected],
        }
    }

    /// 错误信息中使用的目标状态名
    pub fn target_label(&self) -> &'static str {
        match self {
            Self::Update => "PENDING",
            Self::Approve => "APPROVED",
            Self::Reject => "REJECTED",
            Self::Issue => "ISSUED",
            Self::Receive => "RECEIVED",
            Self::Close => "CLOSED",
            Self::Delete => "DELETED",
        }
    }

    pub fn is_allowed(&self, current: RequestStatus) -> bool {
        self.allowed_from().contains(&current)
    }
}

/// 不允许的操作返回 409 `RequestInvalidTransition`，同时给出当前与目标状态
pub fn ensure_transition(current: RequestStatus, action: RequestAction) -> Result<(), AppError> {
    if action.is_allowed(current) {
        Ok(())
    } else {
        Err(AppError::invalid_transition(
            ErrorCode::RequestInvalidTransition,
            current.as_str(),
            action.target_label(),
        ))
    }
}
