//! Longing for heaven core - shared types library.
//!
//! Types used by both the HTTP server and the CLI:
//! - `server` - HTTP service, lifecycle manager, embedded migrations
//! - `cli` - Migration runner and admin bootstrap
//!
//! The core crate performs no I/O. Database encoding for the newtypes is
//! available behind the `postgres` feature.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
