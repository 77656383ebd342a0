//! Plan limit gate.
//!
//! Decides whether a tenant may create another user or property under its
//! subscription plan. Operators (`superadmin`) are never limited; accounts
//! without a resolvable plan can add nothing.

use serde::Serialize;

use crate::models::{Plan, PlanLimit, Resource, User};
use crate::policy::PlanCatalog;

/// Current consumption of one plan-limited resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanUsage {
    pub plan: String,
    pub resource: Resource,
    pub used: u32,
    pub limit: PlanLimit,
    /// `None` when the plan is unlimited for this resource.
    pub remaining: Option<u32>,
}

pub struct PlanLimitGate<'a, C: PlanCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: PlanCatalog + ?Sized> PlanLimitGate<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    fn plan_of(&self, user: &User) -> Option<&'a Plan> {
        let plan_id = user.plan_id.as_ref()?;
        let plan = self.catalog.find_plan(plan_id);
        if plan.is_none() {
            tracing::warn!(user_id = %user.id, plan_id = %plan_id, "Plan not found in catalog");
        }
        plan
    }

    /// Whether `user` may create one more `resource` when `current_count`
    /// already exist.
    ///
    /// The superadmin exemption only matches the canonical role id. Sessions
    /// that may still carry a legacy role name (`"Super Admin"`) must go
    /// through [`RoleAccessResolver::migrate_user`] first, otherwise the
    /// operator is treated as an ordinary tenant user.
    ///
    /// [`RoleAccessResolver::migrate_user`]: crate::services::RoleAccessResolver::migrate_user
    pub fn can_add_more(&self, user: &User, resource: Resource, current_count: u32) -> bool {
        if user.is_superadmin() {
            return true;
        }

        let Some(plan) = self.plan_of(user) else {
            tracing::debug!(user_id = %user.id, %resource, "No plan, denying");
            return false;
        };

        let limit = plan.limit_for(resource);
        let allowed = limit.allows(current_count);
        tracing::debug!(
            user_id = %user.id,
            plan_id = %plan.id,
            %resource,
            current_count,
            %limit,
            allowed,
            "Plan limit evaluated"
        );
        allowed
    }

    /// Usage summary for the user's plan. `None` for operators and for users
    /// without a resolvable plan.
    pub fn usage(&self, user: &User, resource: Resource, current_count: u32) -> Option<PlanUsage> {
        if user.is_superadmin() {
            return None;
        }
        let plan = self.plan_of(user)?;
        let limit = plan.limit_for(resource);
        Some(PlanUsage {
            plan: plan.nombre.clone(),
            resource,
            used: current_count,
            limit,
            remaining: limit.remaining(current_count),
        })
    }
}
