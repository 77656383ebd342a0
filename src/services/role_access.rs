use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

use crate::models::{Role, User, UserPermissions};
use crate::policy::AccessPolicy;

/// Navigation paths a user may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizedPaths {
    /// Blanket grant.
    All,
    Only(BTreeSet<String>),
}

impl AuthorizedPaths {
    /// Exact membership.
    pub fn contains(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(paths) => paths.contains(path),
        }
    }

    /// Membership of `path` or any of its ancestors, so `/catalogo/42` is
    /// allowed when `/catalogo` is.
    pub fn allows(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return self.contains("/");
        }
        let mut candidate = path;
        loop {
            if self.contains(candidate) {
                return true;
            }
            match candidate.rfind('/') {
                Some(0) | None => return false,
                Some(idx) => candidate = &candidate[..idx],
            }
        }
    }

    pub fn is_superset_of(&self, other: &AuthorizedPaths) -> bool {
        match (self, other) {
            (Self::All, _) => true,
            (Self::Only(_), Self::All) => false,
            (Self::Only(mine), Self::Only(theirs)) => mine.is_superset(theirs),
        }
    }
}

impl Serialize for AuthorizedPaths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("*"),
            Self::Only(paths) => paths.serialize(serializer),
        }
    }
}

/// Role lookups over an [`AccessPolicy`]. Missing entries resolve to
/// deny-by-default values, never to errors.
pub struct RoleAccessResolver<'a> {
    policy: &'a AccessPolicy,
}

impl<'a> RoleAccessResolver<'a> {
    pub fn new(policy: &'a AccessPolicy) -> Self {
        Self { policy }
    }

    /// Maps a historical role spelling to its canonical id. Unknown input is
    /// returned unchanged.
    pub fn migrate_role(&self, raw: &str) -> String {
        match self.lookup_role(raw) {
            Some(role) => role.as_str().to_string(),
            None => {
                tracing::warn!(role = raw, "Unmapped role passed through migration");
                raw.to_string()
            }
        }
    }

    pub fn resolve_role(&self, raw: &str) -> Option<Role> {
        self.lookup_role(raw)
    }

    fn lookup_role(&self, raw: &str) -> Option<Role> {
        let trimmed = raw.trim();
        if let Ok(role) = trimmed.parse::<Role>() {
            return Some(role);
        }
        let lowered = trimmed.to_lowercase();
        self.policy
            .legacy_roles
            .iter()
            .find(|(legacy, _)| legacy.to_lowercase() == lowered)
            .map(|(_, role)| *role)
            .or_else(|| lowered.parse().ok())
    }

    pub fn default_route(&self, role: Role) -> Option<&'a str> {
        self.policy.default_routes.get(&role).map(String::as_str)
    }

    pub fn default_permissions(&self, role: Role) -> UserPermissions {
        self.policy
            .default_permissions
            .get(&role)
            .copied()
            .unwrap_or_default()
    }

    pub fn authorized_paths(
        &self,
        role: Option<Role>,
        permissions: &UserPermissions,
    ) -> AuthorizedPaths {
        if role.is_some_and(|role| self.policy.blanket_roles.contains(&role)) {
            return AuthorizedPaths::All;
        }

        let paths = permissions
            .enabled()
            .flat_map(|flag| self.policy.paths_for(flag).iter())
            .chain(self.policy.common_paths.iter())
            .cloned()
            .collect();
        AuthorizedPaths::Only(paths)
    }

    /// Copy of `user` with its role string migrated to the canonical id.
    pub fn migrate_user(&self, user: &User) -> User {
        User {
            role: self.migrate_role(&user.role),
            ..user.clone()
        }
    }

    /// Paths for a session user, migrating a legacy role string first.
    pub fn user_paths(&self, user: &User) -> AuthorizedPaths {
        self.authorized_paths(self.resolve_role(&user.role), &user.permissions)
    }

    pub fn can_access(&self, role: Option<Role>, permissions: &UserPermissions, path: &str) -> bool {
        let allowed = self.authorized_paths(role, permissions).allows(path);
        if !allowed {
            tracing::debug!(?role, path, "Path not authorized");
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Permission;

    #[test]
    fn test_legacy_roles_migrate_to_canonical() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        assert_eq!(resolver.migrate_role("Super Admin"), "superadmin");
        assert_eq!(resolver.migrate_role("Administrador"), "admin");
        assert_eq!(resolver.migrate_role("  administrador "), "admin");
        assert_eq!(resolver.migrate_role("GESTOR"), "gestor");
        assert_eq!(resolver.migrate_role("Agente Inmobiliario"), "agente");
    }

    #[test]
    fn test_migration_is_idempotent() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        for role in Role::ALL {
            assert_eq!(resolver.migrate_role(role.as_str()), role.as_str());
        }
        for raw in ["Super Admin", "Administrador", "Recepcionista", ""] {
            let once = resolver.migrate_role(raw);
            assert_eq!(resolver.migrate_role(&once), once);
        }
    }

    #[test]
    fn test_unknown_role_passes_through_unchanged() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        assert_eq!(resolver.migrate_role("Recepcionista"), "Recepcionista");
        assert_eq!(resolver.resolve_role("Recepcionista"), None);
    }

    #[test]
    fn test_default_routes() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        assert_eq!(resolver.default_route(Role::SuperAdmin), Some("/superadmin"));
        assert_eq!(resolver.default_route(Role::Gestor), Some("/oportunidades"));

        let mut sparse = AccessPolicy::builtin();
        sparse.default_routes.remove(&Role::Agente);
        let resolver = RoleAccessResolver::new(&sparse);
        assert_eq!(resolver.default_route(Role::Agente), None);
    }

    #[test]
    fn test_default_permissions_are_asymmetric() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let gestor = resolver.default_permissions(Role::Gestor);
        assert_eq!(
            gestor,
            UserPermissions {
                propiedades: false,
                contactos: false,
                operaciones: true,
                documentos_kyc: true,
                reportes: false,
                equipo: false,
            }
        );
        let agente = resolver.default_permissions(Role::Agente);
        assert!(agente.propiedades && agente.contactos && agente.operaciones);
        assert!(!agente.reportes && !agente.equipo && !agente.documentos_kyc);
        assert_eq!(resolver.default_permissions(Role::Admin), UserPermissions::all());

        let mut sparse = AccessPolicy::builtin();
        sparse.default_permissions.clear();
        let resolver = RoleAccessResolver::new(&sparse);
        assert_eq!(resolver.default_permissions(Role::Admin), UserPermissions::none());
    }

    #[test]
    fn test_gestor_paths() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let perms = resolver.default_permissions(Role::Gestor);
        let paths = resolver.authorized_paths(Some(Role::Gestor), &perms);
        assert!(paths.contains("/oportunidades"));
        assert!(paths.contains("/progreso"));
        assert!(paths.contains("/documentos-kyc"));
        assert!(!paths.contains("/catalogo"));
        assert!(!paths.contains("/clientes"));
    }

    #[test]
    fn test_superadmin_has_blanket_grant() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let paths = resolver.authorized_paths(Some(Role::SuperAdmin), &UserPermissions::none());
        assert_eq!(paths, AuthorizedPaths::All);
        assert!(paths.allows("/superadmin/empresas"));

        // The grant follows the role, not the flags.
        let admin = resolver.authorized_paths(Some(Role::Admin), &UserPermissions::all());
        assert!(!admin.contains("/superadmin"));
    }

    #[test]
    fn test_paths_are_monotonic_in_flags() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        // Every subset of the six flags, plus each one-flag extension.
        for mask in 0u8..64 {
            let base = UserPermissions::from_flags(
                Permission::ALL
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, p)| p),
            );
            let before = resolver.authorized_paths(Some(Role::Agente), &base);
            for flag in Permission::ALL {
                let mut extended = base;
                extended.set(flag, true);
                let after = resolver.authorized_paths(Some(Role::Agente), &extended);
                assert!(after.is_superset_of(&before), "{:?} + {:?}", base, flag);
            }
        }
    }

    #[test]
    fn test_no_flags_only_common_paths() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let paths = resolver.authorized_paths(None, &UserPermissions::none());
        assert_eq!(
            paths,
            AuthorizedPaths::Only(BTreeSet::from(["/dashboard".to_string(), "/perfil".to_string()]))
        );
    }

    #[test]
    fn test_can_access_nested_paths() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let perms = UserPermissions::from_flags([Permission::Propiedades]);
        assert!(resolver.can_access(Some(Role::Agente), &perms, "/catalogo/42"));
        assert!(resolver.can_access(Some(Role::Agente), &perms, "/catalogo/"));
        assert!(!resolver.can_access(Some(Role::Agente), &perms, "/catalogos"));
        assert!(!resolver.can_access(Some(Role::Agente), &perms, "/reportes/mensual"));
        assert!(!resolver.can_access(Some(Role::Agente), &perms, "/"));
    }

    #[test]
    fn test_user_paths_migrates_legacy_role() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let user = User::new("u1", "Super Admin");
        assert_eq!(resolver.user_paths(&user), AuthorizedPaths::All);
    }

    #[test]
    fn test_migrate_user_keeps_other_fields() {
        let policy = AccessPolicy::builtin();
        let resolver = RoleAccessResolver::new(&policy);
        let user = User::new("u2", " Gestor de Operaciones ")
            .with_plan("3")
            .with_permissions(UserPermissions::from_flags([Permission::Operaciones]));
        let migrated = resolver.migrate_user(&user);
        assert_eq!(migrated.role, "gestor");
        assert_eq!(migrated.canonical_role(), Some(Role::Gestor));
        assert_eq!(migrated.plan_id, user.plan_id);
        assert_eq!(migrated.permissions, user.permissions);
    }

    #[test]
    fn test_paths_serialize_for_clients() {
        assert_eq!(serde_json::to_string(&AuthorizedPaths::All).unwrap(), r#""*""#);
        let only = AuthorizedPaths::Only(BTreeSet::from(["/b".to_string(), "/a".to_string()]));
        assert_eq!(serde_json::to_string(&only).unwrap(), r#"["/a","/b"]"#);
    }
}
