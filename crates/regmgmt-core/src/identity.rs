//! User identity resolution for user-scope settings
//!
//! User-scope groups are applied under `HKU\<sid>` for every resolvable user.
//! Identities are resolved once per run into an [`IdentityContext`] and passed
//! explicitly to the runner. An empty context means user scope is skipped;
//! there is deliberately no fallback to the current user's hive.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::registry::{Hive, RegistryBackend, RegistryPath};

/// Local and traditional domain accounts
static DOMAIN_SID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S-1-5-21-\d+-\d+-\d+-\d+$").unwrap());

/// Cloud (Entra ID) accounts
static CLOUD_SID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S-1-12-1-\d+-\d+-\d+-\d+$").unwrap());

/// Whether `sid` looks like a real user account.
///
/// Well-known service SIDs (`S-1-5-18` and friends) and the `_Classes`
/// companion hives do not match.
pub fn is_user_sid(sid: &str) -> bool {
    DOMAIN_SID.is_match(sid) || CLOUD_SID.is_match(sid)
}

/// Source of user security identifiers
pub trait IdentityProvider {
    /// Ordered user SIDs. Implementations should not fail; an identity that
    /// cannot be enumerated is simply not returned.
    fn user_identities(&self) -> Vec<String>;
}

/// Users whose hives are currently loaded under `HKU`
pub struct LoadedHiveIdentities<'a> {
    backend: &'a dyn RegistryBackend,
}

impl<'a> LoadedHiveIdentities<'a> {
    pub fn new(backend: &'a dyn RegistryBackend) -> Self {
        Self { backend }
    }
}

impl IdentityProvider for LoadedHiveIdentities<'_> {
    fn user_identities(&self) -> Vec<String> {
        let users = RegistryPath::hive_root(Hive::Users);
        match self.backend.subkey_names(&users) {
            Ok(names) => names.into_iter().filter(|name| is_user_sid(name)).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate loaded user hives");
                Vec::new()
            }
        }
    }
}

/// An explicit list of identities, e.g. from the command line
pub struct StaticIdentities {
    sids: Vec<String>,
}

impl StaticIdentities {
    pub fn new(sids: Vec<String>) -> Self {
        Self { sids }
    }
}

impl IdentityProvider for StaticIdentities {
    fn user_identities(&self) -> Vec<String> {
        self.sids
            .iter()
            .filter(|sid| {
                let ok = is_user_sid(sid);
                if !ok {
                    warn!(sid = %sid, "Ignoring identity that is not a user SID");
                }
                ok
            })
            .cloned()
            .collect()
    }
}

/// Identities resolved once for the whole run
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    identities: Vec<String>,
}

impl IdentityContext {
    /// Query the provider once, dropping duplicates but keeping order.
    pub fn resolve(provider: &dyn IdentityProvider) -> Self {
        let mut identities: Vec<String> = Vec::new();
        for sid in provider.user_identities() {
            if !identities.iter().any(|s| s.eq_ignore_ascii_case(&sid)) {
                identities.push(sid);
            }
        }
        debug!(count = identities.len(), "Resolved user identities");
        Self { identities }
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Concrete roots for a user-scope base path, one per identity.
    pub fn user_roots(&self, base_path: &str) -> Vec<RegistryPath> {
        self.identities
            .iter()
            .map(|sid| RegistryPath::new(Hive::Users, sid).join(base_path))
            .collect()
    }
}
