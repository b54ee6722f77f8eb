//! API 路由模块
//!
//! # 结构
//!
//! 每个资源一个子模块:
//! - `mod.rs` - 路由定义 (`router()`)
//! - `handler.rs` - 请求处理函数
//!
//! # 权限
//!
//! 读取路由需要 `<module>:read`, 写入路由按动作挂 `require_permission`,
//! 用户管理仅 ADMIN。

// 认证与系统
pub mod auth;
pub mod health;
pub mod upload;
pub mod users;

// HR
pub mod applicants;
pub mod clients;
pub mod employees;
pub mod jobs;

// 库存与领料
pub mod requests;
pub mod stock;

// 资产
pub mod asset_requests;
pub mod assets;

// 养殖
pub mod cages;
pub mod feedings;
pub mod grown_egg_ponds;
pub mod medications;
pub mod medicines;
pub mod parent_fish_pools;

use axum::Router;

use crate::core::ServerState;

/// 合并所有业务路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(upload::router())
        // HR
        .merge(employees::router())
        .merge(jobs::router())
        .merge(applicants::router())
        .merge(clients::router())
        // Stock
        .merge(stock::router())
        .merge(requests::router())
        // Assets
        .merge(assets::router())
        .merge(asset_requests::router())
        // Aquaculture
        .merge(cages::router())
        .merge(feedings::router())
        .merge(medicines::router())
        .merge(medications::router())
        .merge(parent_fish_pools::router())
        .merge(grown_egg_ponds::router())
}
