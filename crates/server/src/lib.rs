//! Longing for heaven backend.
//!
//! The HTTP surface, startup/shutdown lifecycle and schema migrations live
//! in this library so the binary, the CLI and the integration tests share
//! one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
