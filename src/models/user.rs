use serde::{Deserialize, Serialize};

use super::{PlanId, Role, UserPermissions};

/// Session user as handed over by the authentication layer.
///
/// `role` is kept as the raw string: legacy sessions may still carry
/// human-readable role names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub plan_id: Option<PlanId>,
    #[serde(default)]
    pub empresa_id: Option<String>,
    #[serde(default)]
    pub permissions: UserPermissions,
}

impl User {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nombre: String::new(),
            email: String::new(),
            role: role.into(),
            plan_id: None,
            empresa_id: None,
            permissions: UserPermissions::none(),
        }
    }

    pub fn with_plan(mut self, plan_id: impl Into<PlanId>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    pub fn with_permissions(mut self, permissions: UserPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Canonical role, if the stored string is already canonical. Surrounding
    /// whitespace is ignored; legacy spellings are not mapped here.
    pub fn canonical_role(&self) -> Option<Role> {
        self.role.trim().parse().ok()
    }

    pub fn is_superadmin(&self) -> bool {
        self.canonical_role() == Some(Role::SuperAdmin)
    }
}
