use std::path::PathBuf;

use crate::console::commands::{CommandError, PolicyCommand};
use crate::models::{Role, UserPermissions};
use crate::policy::AccessPolicy;
use crate::services::RoleAccessResolver;

fn resolve(resolver: &RoleAccessResolver, raw: &str) -> Result<Role, CommandError> {
    resolver
        .resolve_role(raw)
        .ok_or_else(|| CommandError::UnknownRole(raw.to_string()))
}

/// `inmo-access migrate-role <RAW>`
pub struct MigrateRoleCommand {
    pub policy_file: Option<PathBuf>,
    pub raw: String,
}

impl MigrateRoleCommand {
    pub fn new(policy_file: Option<PathBuf>, raw: String) -> Self {
        Self { policy_file, raw }
    }
}

impl PolicyCommand for MigrateRoleCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        Ok(RoleAccessResolver::new(policy).migrate_role(&self.raw))
    }
}

/// `inmo-access route <ROLE>`
pub struct RouteCommand {
    pub policy_file: Option<PathBuf>,
    pub role: String,
}

impl RouteCommand {
    pub fn new(policy_file: Option<PathBuf>, role: String) -> Self {
        Self { policy_file, role }
    }
}

impl PolicyCommand for RouteCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        let resolver = RoleAccessResolver::new(policy);
        let role = resolve(&resolver, &self.role)?;
        let route = resolver
            .default_route(role)
            .ok_or(CommandError::NoRoute(role))?;
        Ok(route.to_string())
    }
}

/// `inmo-access permissions <ROLE>`
///
/// Unknown roles print the all-false set.
pub struct PermissionsCommand {
    pub policy_file: Option<PathBuf>,
    pub role: String,
}

impl PermissionsCommand {
    pub fn new(policy_file: Option<PathBuf>, role: String) -> Self {
        Self { policy_file, role }
    }
}

impl PolicyCommand for PermissionsCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        let resolver = RoleAccessResolver::new(policy);
        let permissions = resolver
            .resolve_role(&self.role)
            .map(|role| resolver.default_permissions(role))
            .unwrap_or_default();
        Ok(serde_json::to_string_pretty(&permissions)?)
    }
}

/// `inmo-access paths <ROLE> [--permissions JSON]`
pub struct PathsCommand {
    pub policy_file: Option<PathBuf>,
    pub role: String,
    pub permissions: Option<String>,
}

impl PathsCommand {
    pub fn new(policy_file: Option<PathBuf>, role: String, permissions: Option<String>) -> Self {
        Self {
            policy_file,
            role,
            permissions,
        }
    }
}

impl PolicyCommand for PathsCommand {
    fn policy_file(&self) -> Option<&PathBuf> {
        self.policy_file.as_ref()
    }

    fn run(&self, policy: &AccessPolicy) -> Result<String, Box<dyn std::error::Error>> {
        let resolver = RoleAccessResolver::new(policy);
        let role = resolver.resolve_role(&self.role);
        let permissions = match &self.permissions {
            Some(raw) => serde_json::from_str::<UserPermissions>(raw)
                .map_err(CommandError::InvalidPermissions)?,
            None => role
                .map(|role| resolver.default_permissions(role))
                .unwrap_or_default(),
        };
        let paths = resolver.authorized_paths(role, &permissions);
        Ok(serde_json::to_string_pretty(&paths)?)
    }
}
