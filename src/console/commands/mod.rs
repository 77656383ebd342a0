mod callable;
pub mod plan;
pub mod role;

pub use callable::*;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("no default route configured for role {0}")]
    NoRoute(crate::models::Role),
    #[error("invalid permissions JSON: {0}")]
    InvalidPermissions(#[from] serde_json::Error),
}
