//! Request-scoped storefront core.
//!
//! Resolves the current category tree, derives canonical and localized URLs
//! and records per-request runtime statistics for every service operation.
//! Everything here lives for exactly one request: services, memo tables and
//! statistics are built fresh by [`application::request::RequestServices`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod runtime;
