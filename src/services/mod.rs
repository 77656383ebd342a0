pub mod plan_limit;
pub mod role_access;

pub use plan_limit::{PlanLimitGate, PlanUsage};
pub use role_access::{AuthorizedPaths, RoleAccessResolver};
