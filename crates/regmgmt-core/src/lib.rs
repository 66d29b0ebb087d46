//! Compliance engine for declarative Windows registry settings
//!
//! This crate evaluates a list of desired registry settings against live
//! registry state and, in remediation mode, corrects any drift. It provides:
//!
//! - **Registry abstraction**: [`RegistryBackend`] with a live Windows
//!   implementation and an in-memory one for tests and offline snapshots
//! - **Value Reader / Writer / Comparator**: type-aware canonicalization,
//!   coercion and equality of registry values
//! - **Evaluator**: the per-setting state machine for `Set`, `Delete` and
//!   `DeleteKey` with write-then-verify remediation
//! - **Runner**: resolves user and machine roots and aggregates results into
//!   a [`RunReport`] with a final status and exit code
//!
//! # Architecture
//!
//! ```text
//!                 regmgmt-cli
//!                      |
//!                   Runner ---- IdentityContext
//!                      |
//!                  Evaluator
//!                 /    |    \
//!            Reader Comparator Writer
//!                 \         /
//!               RegistryBackend
//!              /               \
//!     WindowsRegistry     MemoryRegistry
//! ```
//!
//! # Example
//!
//! ```
//! use regmgmt_core::{IdentityContext, Manifest, MemoryRegistry, RunMode, Runner};
//!
//! let manifest = Manifest::parse(r#"
//! [[machine]]
//! name = "Contoso"
//! base_path = 'SOFTWARE\Contoso'
//!
//! [[machine.settings]]
//! name = "AwesomeLevel"
//! type = "DWord"
//! value = 100
//! "#).unwrap();
//!
//! let registry = MemoryRegistry::new();
//! let identities = IdentityContext::default();
//! let report = Runner::new(&registry, RunMode::Remediate, &identities).run(&manifest);
//!
//! assert_eq!(report.exit_code(), 0);
//! assert!(report.results[0].message.starts_with("[REMEDIATED] AwesomeLevel"));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod registry;
pub mod run;
pub mod value;

pub use config::{Action, ConfigurationGroup, Manifest, Scope, Setting};
pub use engine::{
    EvaluationResult, Evaluator, Failure, FailureKind, ReadOutcome, RemediationOutcome,
    StatusToken,
};
pub use error::{Error, Result};
pub use identity::{IdentityContext, IdentityProvider, LoadedHiveIdentities, StaticIdentities};
pub use registry::{Hive, MemoryRegistry, RegistryBackend, RegistryData, RegistryPath, Snapshot};
#[cfg(windows)]
pub use registry::WindowsRegistry;
pub use run::{RunMode, RunReport, RunStatus, Runner, Summary};
pub use value::{CanonicalData, CanonicalValue, DeclaredValue, ValueKind};
