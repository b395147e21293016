//! Probe dispatch table and check resolution.
//!
//! Probes are bound explicitly: every probe id the registry may reference
//! is registered in a [`ProbeTable`] at start-up. Resolution then walks
//! registry → table → capabilities and reports which of the three steps
//! failed, so a misconfigured registry, a missing implementation and a
//! deliberately manual check stay distinguishable.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::registry::Registry;

use super::report::{ProbeReport, NOT_SUPPORTED};

/// A check implementation.
///
/// The repository identifier is opaque to the engine (`owner/name` for the
/// built-in GitHub probes). Probes report problems through the returned
/// [`ProbeReport`]; a panic is caught by the engine and recorded as an error.
pub trait Probe: Send + Sync {
    fn run(&self, repo: &str) -> ProbeReport;
}

impl<F> Probe for F
where
    F: Fn(&str) -> ProbeReport + Send + Sync,
{
    fn run(&self, repo: &str) -> ProbeReport {
        self(repo)
    }
}

/// Something a probe needs from the environment before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// An API token; the endpoint rejects anonymous requests.
    AuthenticatedApi,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::AuthenticatedApi => write!(f, "an authenticated API token"),
        }
    }
}

/// Why a probe id could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingFailure {
    /// Nothing is registered under the probe id.
    NotRegistered,
    /// The probe exists but needs a capability this run lacks.
    MissingCapability(Capability),
}

/// Failure to turn a check name into a runnable probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The check is not declared in the registry.
    #[error("Unknown check")]
    UnknownCheck { check: String },

    /// The registry marks the check as manual.
    #[error("Not Supported")]
    UnsupportedCheck { check: String },

    /// The registry names a probe that cannot be used.
    #[error("{}", binding_message(.probe_id, .reason))]
    ProbeBindingError {
        check: String,
        probe_id: String,
        reason: BindingFailure,
    },
}

fn binding_message(probe_id: &str, reason: &BindingFailure) -> String {
    match reason {
        BindingFailure::NotRegistered => {
            format!("Probe binding error: no probe named '{}'", probe_id)
        }
        BindingFailure::MissingCapability(cap) => {
            format!("Probe binding error: '{}' requires {}", probe_id, cap)
        }
    }
}

impl ResolutionError {
    /// The report recorded for every repository when resolution fails.
    pub fn to_report(&self) -> ProbeReport {
        match self {
            ResolutionError::UnsupportedCheck { .. } => ProbeReport::raw(NOT_SUPPORTED),
            other => ProbeReport::error(other.to_string()),
        }
    }
}

struct Binding {
    probe: Arc<dyn Probe>,
    requires: Vec<Capability>,
}

/// Probe implementations keyed by probe id.
#[derive(Default)]
pub struct ProbeTable {
    bindings: HashMap<String, Binding>,
}

impl ProbeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe with no special requirements.
    pub fn register<P: Probe + 'static>(&mut self, probe_id: &str, probe: P) -> &mut Self {
        self.register_requiring(probe_id, &[], probe)
    }

    /// Register a probe that needs the given capabilities.
    ///
    /// Registering an id twice replaces the earlier probe.
    pub fn register_requiring<P: Probe + 'static>(
        &mut self,
        probe_id: &str,
        requires: &[Capability],
        probe: P,
    ) -> &mut Self {
        self.bindings.insert(
            probe_id.to_string(),
            Binding {
                probe: Arc::new(probe),
                requires: requires.to_vec(),
            },
        );
        self
    }

    /// Whether a probe id is registered.
    pub fn contains(&self, probe_id: &str) -> bool {
        self.bindings.contains_key(probe_id)
    }

    /// Registered probe ids, sorted.
    pub fn probe_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.bindings.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered probes.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Resolves check names against a registry and a probe table.
pub struct Resolver<'a> {
    registry: &'a Registry,
    table: &'a ProbeTable,
    capabilities: HashSet<Capability>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for a run that has the given capabilities.
    pub fn new(
        registry: &'a Registry,
        table: &'a ProbeTable,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            registry,
            table,
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// The registry checks are resolved against.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Resolve a check name to its probe.
    pub fn resolve(&self, check_name: &str) -> Result<Arc<dyn Probe>, ResolutionError> {
        let check =
            self.registry
                .check(check_name)
                .ok_or_else(|| ResolutionError::UnknownCheck {
                    check: check_name.to_string(),
                })?;

        if !check.supported {
            return Err(ResolutionError::UnsupportedCheck {
                check: check.name.clone(),
            });
        }

        let binding_error = |reason| ResolutionError::ProbeBindingError {
            check: check.name.clone(),
            probe_id: check.probe_id.clone(),
            reason,
        };

        let binding = self
            .table
            .bindings
            .get(&check.probe_id)
            .ok_or_else(|| binding_error(BindingFailure::NotRegistered))?;

        if let Some(missing) = binding
            .requires
            .iter()
            .find(|cap| !self.capabilities.contains(cap))
        {
            return Err(binding_error(BindingFailure::MissingCapability(*missing)));
        }

        tracing::debug!(check = %check.name, probe = %check.probe_id, "Resolved probe");
        Ok(Arc::clone(&binding.probe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::ProbeStatus;
    use crate::registry::parse_registry_str;

    fn registry() -> Registry {
        parse_registry_str(
            r#"
L1:
  - name: a
    probe: proba
  - name: b
    probe: probb
    supported: false
  - name: c
    probe: unbound
  - name: d
    probe: private
"#,
        )
        .unwrap()
    }

    fn table() -> ProbeTable {
        let mut table = ProbeTable::new();
        table
            .register("proba", |_repo: &str| ProbeReport::success("Detected"))
            .register("probb", |_repo: &str| -> ProbeReport {
                panic!("unsupported checks must not reach their probe")
            })
            .register_requiring("private", &[Capability::AuthenticatedApi], |_: &str| {
                ProbeReport::success("Enabled")
            });
        table
    }

    #[test]
    fn resolves_supported_check() {
        let registry = registry();
        let table = table();
        let resolver = Resolver::new(&registry, &table, []);

        let probe = resolver.resolve("a").unwrap();
        assert_eq!(probe.run("x").detail, "Detected");
    }

    #[test]
    fn unknown_check() {
        let registry = registry();
        let table = table();
        let resolver = Resolver::new(&registry, &table, []);

        let err = resolver.resolve("zzz").err().unwrap();
        assert_eq!(
            err,
            ResolutionError::UnknownCheck {
                check: "zzz".into()
            }
        );
        assert_eq!(err.to_report().status, ProbeStatus::Error);
    }

    #[test]
    fn unsupported_check_short_circuits() {
        let registry = registry();
        let table = table();
        let resolver = Resolver::new(&registry, &table, []);

        let err = resolver.resolve("b").err().unwrap();
        assert!(matches!(err, ResolutionError::UnsupportedCheck { .. }));
        assert_eq!(err.to_report().detail, NOT_SUPPORTED);
    }

    #[test]
    fn unsupported_check_ignores_missing_probe() {
        let registry = registry();
        let table = ProbeTable::new();
        let resolver = Resolver::new(&registry, &table, []);

        assert!(matches!(
            resolver.resolve("b"),
            Err(ResolutionError::UnsupportedCheck { .. })
        ));
    }

    #[test]
    fn unregistered_probe_is_binding_error() {
        let registry = registry();
        let table = table();
        let resolver = Resolver::new(&registry, &table, []);

        let err = resolver.resolve("c").err().unwrap();
        match &err {
            ResolutionError::ProbeBindingError {
                probe_id, reason, ..
            } => {
                assert_eq!(probe_id, "unbound");
                assert_eq!(*reason, BindingFailure::NotRegistered);
            }
            other => panic!("expected ProbeBindingError, got {:?}", other),
        }
        assert!(err.to_string().contains("unbound"));
        assert!(!err.to_report().is_success());
    }

    #[test]
    fn missing_capability_is_binding_error() {
        let registry = registry();
        let table = table();
        let resolver = Resolver::new(&registry, &table, []);

        let err = resolver.resolve("d").err().unwrap();
        assert!(matches!(
            err,
            ResolutionError::ProbeBindingError {
                reason: BindingFailure::MissingCapability(Capability::AuthenticatedApi),
                ..
            }
        ));
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn capability_satisfied_binds() {
        let registry = registry();
        let table = table();
        let resolver = Resolver::new(&registry, &table, [Capability::AuthenticatedApi]);

        assert!(resolver.resolve("d").is_ok());
    }

    #[test]
    fn table_lists_sorted_ids() {
        let table = table();
        assert_eq!(table.probe_ids(), ["private", "proba", "probb"]);
        assert_eq!(table.len(), 3);
        assert!(table.contains("proba"));
    }
}
