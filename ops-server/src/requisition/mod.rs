//! 领料申请
//!
//! - [`lifecycle`] - 状态机, 非法动作返回 409
//! - [`quantity`] - 剩余数量与状态推导 (纯函数)
//! - [`service`] - 事务化的工作流动作

pub mod lifecycle;
pub mod quantity;
pub mod service;

pub use lifecycle::{RequestAction, ensure_transition};
pub use service::IssueOutcome;
