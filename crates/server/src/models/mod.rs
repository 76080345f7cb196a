//! Domain models owned by the bootstrap layer.

pub mod admin_user;

pub use admin_user::{AdminSeed, AdminSeedVars, AdminUser};
