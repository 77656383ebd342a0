use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability flags, one per functional area of the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    Propiedades,
    Contactos,
    Operaciones,
    DocumentosKyc,
    Reportes,
    Equipo,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::Propiedades,
        Permission::Contactos,
        Permission::Operaciones,
        Permission::DocumentosKyc,
        Permission::Reportes,
        Permission::Equipo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Propiedades => "propiedades",
            Self::Contactos => "contactos",
            Self::Operaciones => "operaciones",
            Self::DocumentosKyc => "documentosKyc",
            Self::Reportes => "reportes",
            Self::Equipo => "equipo",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown permission flag: {}", s))
    }
}

/// The six boolean capability flags carried by a user session.
///
/// Missing keys deserialize as `false`, so a partial payload denies by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPermissions {
    pub propiedades: bool,
    pub contactos: bool,
    pub operaciones: bool,
    pub documentos_kyc: bool,
    pub reportes: bool,
    pub equipo: bool,
}

impl UserPermissions {
    pub fn all() -> Self {
        Self {
            propiedades: true,
            contactos: true,
            operaciones: true,
            documentos_kyc: true,
            reportes: true,
            equipo: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a set with exactly the given flags enabled.
    pub fn from_flags<I: IntoIterator<Item = Permission>>(flags: I) -> Self {
        flags.into_iter().fold(Self::none(), |mut acc, flag| {
            acc.set(flag, true);
            acc
        })
    }

    pub fn get(&self, permission: Permission) -> bool {
        match permission {
            Permission::Propiedades => self.propiedades,
            Permission::Contactos => self.contactos,
            Permission::Operaciones => self.operaciones,
            Permission::DocumentosKyc => self.documentos_kyc,
            Permission::Reportes => self.reportes,
            Permission::Equipo => self.equipo,
        }
    }

    pub fn set(&mut self, permission: Permission, value: bool) {
        let slot = match permission {
            Permission::Propiedades => &mut self.propiedades,
            Permission::Contactos => &mut self.contactos,
            Permission::Operaciones => &mut self.operaciones,
            Permission::DocumentosKyc => &mut self.documentos_kyc,
            Permission::Reportes => &mut self.reportes,
            Permission::Equipo => &mut self.equipo,
        };
        *slot = value;
    }

    /// Flags currently enabled, in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL.into_iter().filter(|p| self.get(*p))
    }
}
