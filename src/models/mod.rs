mod permissions;
mod plan;
mod role;
pub mod user;

pub use permissions::*;
pub use plan::*;
pub use role::*;
pub use user::*;
