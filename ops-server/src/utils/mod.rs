//! 工具模块
//!
//! - [`logger`] - tracing 初始化
//! - [`validation`] - 输入校验
//! - [`quantity`] - Decimal 数量运算

pub mod logger;
pub mod quantity;
pub mod validation;

pub use shared::error::{AppError, AppResult};
