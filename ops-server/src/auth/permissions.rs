//! Permission Definitions
//!
//! 角色固定推导权限，不做逐用户配置。
//!
//! ## 约定
//! - `<module>:read` 查看, `<module>:write` 增改删
//! - 流程动作单独授权 (`requests:approve`, `requests:issue` ...)
//! - `users:manage` 仅 ADMIN (`all`)

use shared::models::Role;

/// 业务模块 (每个模块都有 `:read` 权限)
pub const MODULES: &[&str] = &[
    "employees",
    "jobs",
    "applicants",
    "clients",
    "stock",
    "requests",
    "assets",
    "asset_requests",
    "aquaculture",
];

// 领料申请动作
pub const REQUESTS_CREATE: &str = "requests:create";
pub const REQUESTS_APPROVE: &str = "requests:approve";
pub const REQUESTS_ISSUE: &str = "requests:issue";
pub const REQUESTS_RECEIVE: &str = "requests:receive";
pub const REQUESTS_MANAGE: &str = "requests:manage";

pub const ASSET_REQUESTS_CREATE: &str = "asset_requests:create";

pub const AQUACULTURE_WRITE: &str = "aquaculture:write";
pub const AQUACULTURE_MANAGE: &str = "aquaculture:manage";

pub const USERS_MANAGE: &str = "users:manage";

/// ADMIN 默认权限
pub const ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 经理: 除用户管理外全部
pub const MANAGER_PERMISSIONS: &[&str] = &[
    "employees:*",
    "jobs:*",
    "applicants:*",
    "clients:*",
    "stock:*",
    "requests:*",
    "assets:*",
    "asset_requests:*",
    "aquaculture:*",
];

/// 仓管: 库存/领料/资产全权，其余只读
const STOREKEEPER_EXTRA: &[&str] = &["stock:*", "requests:*", "assets:*", "asset_requests:*"];

/// 员工: 只读 + 提交领料、确认收货、提交资产申请、录入养殖数据
const STAFF_EXTRA: &[&str] = &[
    REQUESTS_CREATE,
    REQUESTS_RECEIVE,
    ASSET_REQUESTS_CREATE,
    AQUACULTURE_WRITE,
];

fn read_all() -> impl Iterator<Item = String> {
    MODULES.iter().map(|m| format!("{m}:read"))
}

/// Get permissions for a role
pub fn permissions_for_role(role: Role) -> Vec<String> {
    let to_vec = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    match role {
        Role::Admin => to_vec(ADMIN_PERMISSIONS),
        Role::Manager => to_vec(MANAGER_PERMISSIONS),
        Role::Storekeeper => read_all().chain(to_vec(STOREKEEPER_EXTRA)).collect(),
        Role::Staff => read_all().chain(to_vec(STAFF_EXTRA)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "u".into(),
            display_name: "U".into(),
            role: role.as_str().into(),
            employee_id: None,
            permissions: permissions_for_role(role),
        }
    }

    #[test]
    fn test_manager_cannot_manage_users() {
        let manager = user(Role::Manager);
        assert!(manager.has_permission("employees:write"));
        assert!(manager.has_permission(REQUESTS_APPROVE));
        assert!(manager.has_permission(AQUACULTURE_MANAGE));
        assert!(!manager.has_permission(USERS_MANAGE));
    }

    #[test]
    fn test_storekeeper_permissions() {
        let keeper = user(Role::Storekeeper);
        assert!(keeper.has_permission("stock:write"));
        assert!(keeper.has_permission(REQUESTS_ISSUE));
        assert!(keeper.has_permission("assets:write"));
        assert!(keeper.has_permission("employees:read"));
        assert!(!keeper.has_permission("employees:write"));
        assert!(!keeper.has_permission(AQUACULTURE_WRITE));
    }

    #[test]
    fn test_staff_permissions() {
        let staff = user(Role::Staff);
        assert!(!staff.has_permission("cages:read"));
        assert!(staff.has_permission("aquaculture:read"));
        assert!(staff.has_permission(REQUESTS_CREATE));
        assert!(staff.has_permission(REQUESTS_RECEIVE));
        assert!(staff.has_permission(ASSET_REQUESTS_CREATE));
        assert!(staff.has_permission(AQUACULTURE_WRITE));
        assert!(!staff.has_permission(REQUESTS_APPROVE));
        assert!(!staff.has_permission(REQUESTS_ISSUE));
        assert!(!staff.has_permission(AQUACULTURE_MANAGE));
        assert!(!staff.has_permission("stock:write"));
    }

    #[test]
    fn test_admin_all() {
        assert_eq!(permissions_for_role(Role::Admin), vec!["all".to_string()]);
        assert!(user(Role::Admin).has_permission(USERS_MANAGE));
    }
}
