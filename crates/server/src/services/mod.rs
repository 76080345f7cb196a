//! External dependencies initialized at startup.
//!
//! # Services
//!
//! - `cache` - Redis cache/session client
//! - `bootstrap` - Admin account bootstrap
//!
//! Both expose a connector trait so the lifecycle manager can be driven by
//! stand-ins in tests.

pub mod bootstrap;
pub mod cache;

pub use bootstrap::{
    AdminBootstrap, BootstrapError, DatabaseAdminBootstrap, initialize_admin, parse_seed,
};
pub use cache::{CacheClient, CacheConnector, CacheError, RedisConnector};
