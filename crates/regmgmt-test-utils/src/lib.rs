//! Shared test utilities for the regmgmt workspace.
//!
//! This crate provides fixtures used across crate test suites. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`registry`]: well-known SIDs and seeded in-memory registries
//! - [`config`]: manifest builders and on-disk config files

pub mod config;
pub mod registry;
