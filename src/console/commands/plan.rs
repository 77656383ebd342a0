use std::path::PathBuf;

use crate::console::commands::PolicyCommand;
use crate::models::{PlanId, Resource, User};
use crate::policy::AccessPolicy;
use crate::services::{PlanLimitGate, RoleAccessResolver};

/// Session user built from command-line arguments. Legacy role spellings are
/// migrated so `--role "Super Admin"` behaves like the stored session would.
fn session_user(policy: &AccessPolicy, role: &str, plan: Option<&str>) -> User {
    let user = match plan {
        Some(plan) => User::new("cli", role).with_plan(PlanId::from(plan)),
        None => User::new("cli", role),
    };
    RoleAccessResolver::new(policy).migrate_user(&user)
}

/// `inmo-access can-add --role R [--plan P] --resource users --count N`
pub struct CanAddCommand {
    pub policy_file: Option<PathBuf>,
    pub role: String,
    pub plan: Option<String>,
    pub resource: Resource,
    pub count: u32,
}

impl CanAddCommand {
    pub fn new(
        policy_file: Option<PathBuf>,
        role: String,
        plan: Option<String>,
        resource: Resource,
        count: u32,
    ) -> Self {
        Self {
            policy_file,
            role,
            plan,
            resource,
            count,
        }
    }
}

impl PolicyCommand for CanAddCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        let user = session_user(policy, &self.role, self.plan.as_deref());
        let allowed = PlanLimitGate::new(policy).can_add_more(&user, self.resource, self.count);
        Ok(allowed.to_string())
    }
}

/// `inmo-access usage --role R [--plan P] --resource users --count N`
///
/// Prints `null` when the user is not bound by any plan.
pub struct UsageCommand {
    pub policy_file: Option<PathBuf>,
    pub role: String,
    pub plan: Option<String>,
    pub resource: Resource,
    pub count: u32,
}

impl UsageCommand {
    pub fn new(
        policy_file: Option<PathBuf>,
        role: String,
        plan: Option<String>,
        resource: Resource,
        count: u32,
    ) -> Self {
        Self {
            policy_file,
            role,
            plan,
            resource,
            count,
        }
    }
}

impl PolicyCommand for UsageCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        let user = session_user(policy, &self.role, self.plan.as_deref());
        let usage = PlanLimitGate::new(policy).usage(&user, self.resource, self.count);
        Ok(serde_json::to_string_pretty(&usage)?)
    }
}

/// `inmo-access plans`
pub struct PlansCommand {
    pub policy_file: Option<PathBuf>,
}

impl PlansCommand {
    pub fn new(policy_file: Option<PathBuf>) -> Self {
        Self { policy_file }
    }
}

impl PolicyCommand for PlansCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        Ok(serde_json::to_string_pretty(&policy.plans)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn can_add(role: &str, plan: Option<&str>, resource: Resource, count: u32) -> String {
        CanAddCommand::new(None, role.into(), plan.map(Into::into), resource, count)
            .run(&AccessPolicy::builtin())
            .unwrap()
    }

    #[test]
    fn test_can_add_prints_boolean() {
        assert_eq!(can_add("admin", Some("1"), Resource::Users, 2), "true");
        assert_eq!(can_add("admin", Some("1"), Resource::Users, 3), "false");
        assert_eq!(can_add("admin", None, Resource::Properties, 0), "false");
    }

    #[test]
    fn test_can_add_migrates_legacy_superadmin() {
        assert_eq!(can_add("Super Admin", None, Resource::Users, 1_000), "true");
    }

    #[test]
    fn test_usage_outputs_json() {
        let output = UsageCommand::new(None, "gestor".into(), Some("3".into()), Resource::Properties, 12)
            .run(&AccessPolicy::builtin())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["plan"], "Empresarial");
        assert_eq!(value["limit"], "Ilimitado");
        assert!(value["remaining"].is_null());

        let none = UsageCommand::new(None, "superadmin".into(), None, Resource::Users, 1)
            .run(&AccessPolicy::builtin())
            .unwrap();
        assert_eq!(none, "null");
    }

    #[test]
    fn test_plans_lists_catalog() {
        let output = PlansCommand::new(None).run(&AccessPolicy::builtin()).unwrap();
        let plans: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(plans.as_array().map(Vec::len), Some(4));
        assert_eq!(plans[0]["limiteUsuarios"], 3);
    }
}
