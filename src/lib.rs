//! Statx server library.
//!
//! Record store, field validators, import mapping and pass/fail statistics
//! for device test results, shared by the HTTP server and the CLI tools.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod validation;
