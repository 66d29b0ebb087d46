//! Command implementations for regmgmt-cli

pub mod evaluate;

pub use evaluate::run_evaluate;
