//! Immutable access tables: plan catalog, legacy role names, landing routes,
//! default capability sets and the permission to path mapping.
//!
//! Built once at startup, either from the built-in defaults or from a YAML
//! policy file, and then shared by reference.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{Permission, Plan, PlanId, PlanLimit, PlanStatus, Role, UserPermissions};

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse policy file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid policy: {0}")]
    Invalid(String),
}

/// Source of subscription plans, looked up by id.
pub trait PlanCatalog {
    fn find_plan(&self, id: &PlanId) -> Option<&Plan>;
}

impl PlanCatalog for [Plan] {
    fn find_plan(&self, id: &PlanId) -> Option<&Plan> {
        self.iter().find(|plan| &plan.id == id)
    }
}

impl PlanCatalog for Vec<Plan> {
    fn find_plan(&self, id: &PlanId) -> Option<&Plan> {
        self.as_slice().find_plan(id)
    }
}

/// Sections left out of a policy file keep their built-in value; unknown
/// sections are rejected so a misspelled key cannot fall back silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessPolicy {
    pub plans: Vec<Plan>,
    /// Historical role spellings, matched case-insensitively.
    pub legacy_roles: BTreeMap<String, Role>,
    pub default_routes: BTreeMap<Role, String>,
    pub default_permissions: BTreeMap<Role, UserPermissions>,
    pub permission_paths: BTreeMap<Permission, Vec<String>>,
    /// Visible to every authenticated user regardless of flags.
    pub common_paths: Vec<String>,
    /// Roles that see every path.
    pub blanket_roles: BTreeSet<Role>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlanCatalog for AccessPolicy {
    fn find_plan(&self, id: &PlanId) -> Option<&Plan> {
        self.plans.find_plan(id)
    }
}

fn plan(id: u64, nombre: &str, precio: f64, usuarios: PlanLimit, propiedades: PlanLimit) -> Plan {
    Plan {
        id: PlanId::from(id),
        nombre: nombre.to_string(),
        precio,
        limite_usuarios: usuarios,
        limite_propiedades: propiedades,
        estado: PlanStatus::Activo,
    }
}

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|p| p.to_string()).collect()
}

impl AccessPolicy {
    pub fn builtin() -> Self {
        use PlanLimit::{Limited, Unlimited};

        let plans = vec![
            plan(1, "Básico", 49.0, Limited(3), Limited(50)),
            plan(2, "Profesional", 99.0, Limited(10), Limited(500)),
            plan(3, "Empresarial", 249.0, Limited(50), Unlimited),
            plan(4, "Corporativo", 499.0, Unlimited, Unlimited),
        ];

        let legacy_roles = [
            ("Super Admin", Role::SuperAdmin),
            ("SuperAdmin", Role::SuperAdmin),
            ("Superadmin", Role::SuperAdmin),
            ("Administrador", Role::Admin),
            ("Admin", Role::Admin),
            ("Agente", Role::Agente),
            ("Agente Inmobiliario", Role::Agente),
            ("Asesor", Role::Agente),
            ("Gestor", Role::Gestor),
            ("Gestor de Operaciones", Role::Gestor),
        ]
        .into_iter()
        .map(|(raw, role)| (raw.to_string(), role))
        .collect();

        let default_routes = [
            (Role::SuperAdmin, "/superadmin"),
            (Role::Admin, "/dashboard"),
            (Role::Agente, "/catalogo"),
            (Role::Gestor, "/oportunidades"),
        ]
        .into_iter()
        .map(|(role, route)| (role, route.to_string()))
        .collect();

        let default_permissions = BTreeMap::from([
            (Role::SuperAdmin, UserPermissions::all()),
            (Role::Admin, UserPermissions::all()),
            (
                Role::Agente,
                UserPermissions::from_flags([
                    Permission::Propiedades,
                    Permission::Contactos,
                    Permission::Operaciones,
                ]),
            ),
            (
                Role::Gestor,
                UserPermissions::from_flags([Permission::Operaciones, Permission::DocumentosKyc]),
            ),
        ]);

        let permission_paths = BTreeMap::from([
            (Permission::Propiedades, paths(&["/catalogo", "/propiedades"])),
            (Permission::Contactos, paths(&["/clientes", "/contactos"])),
            (Permission::Operaciones, paths(&["/oportunidades", "/progreso"])),
            (Permission::DocumentosKyc, paths(&["/documentos-kyc"])),
            (Permission::Reportes, paths(&["/reportes"])),
            (Permission::Equipo, paths(&["/equipo", "/usuarios"])),
        ]);

        Self {
            plans,
            legacy_roles,
            default_routes,
            default_permissions,
            permission_paths,
            common_paths: paths(&["/dashboard", "/perfil"]),
            blanket_roles: BTreeSet::from([Role::SuperAdmin]),
        }
    }

    /// Reads a YAML policy file. Sections left out keep their built-in value.
    #[tracing::instrument(name = "Load access policy")]
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_yaml_str(&raw).map_err(|err| match err {
            PolicyError::Parse { source, .. } => PolicyError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::info!(plans = policy.plans.len(), "Access policy loaded");
        Ok(policy)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_yaml::from_str(raw).map_err(|source| PolicyError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut seen = HashSet::new();
        for plan in &self.plans {
            if !seen.insert(&plan.id) {
                return Err(PolicyError::Invalid(format!("duplicate plan id {}", plan.id)));
            }
        }

        // The permission to path table must be total.
        if let Some(missing) = Permission::ALL
            .iter()
            .find(|p| !self.permission_paths.contains_key(*p))
        {
            return Err(PolicyError::Invalid(format!(
                "permission_paths has no entry for {}",
                missing
            )));
        }

        let all_paths = self
            .permission_paths
            .values()
            .flatten()
            .chain(self.common_paths.iter())
            .chain(self.default_routes.values());
        for path in all_paths {
            if !path.starts_with('/') {
                return Err(PolicyError::Invalid(format!(
                    "path {:?} must start with '/'",
                    path
                )));
            }
        }

        Ok(())
    }

    /// Paths mapped from a single flag; empty when the flag has none.
    pub fn paths_for(&self, permission: Permission) -> &[String] {
        self.permission_paths
            .get(&permission)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
