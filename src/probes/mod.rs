//! Probes and their resolution.
//!
//! A probe inspects one repository and returns a [`ProbeReport`]. Probes are
//! bound to the ids the registry names through an explicit [`ProbeTable`];
//! [`Resolver`] turns a check name into a runnable probe or a
//! [`ResolutionError`] that ends up in the results as text.
//!
//! # Example
//!
//! ```
//! use dsomm::probes::{ProbeReport, ProbeTable, Resolver};
//! use dsomm::registry::parse_registry_str;
//!
//! let registry = parse_registry_str("L1:\n  - name: a\n    probe: proba\n").unwrap();
//! let mut table = ProbeTable::new();
//! table.register("proba", |_repo: &str| ProbeReport::success("Detected"));
//!
//! let resolver = Resolver::new(&registry, &table, []);
//! let probe = resolver.resolve("a").unwrap();
//! assert!(probe.run("acme/api").is_success());
//! ```

pub mod activity;
pub mod builtin;
pub mod indicators;
pub mod report;
pub mod settings;
pub mod table;

pub use builtin::{builtin_table, capabilities, UNABLE_TO_CHECK};
pub use report::{is_negative, ProbeReport, ProbeStatus, NEGATIVE_RESULTS, NOT_SUPPORTED};
pub use table::{BindingFailure, Capability, Probe, ProbeTable, ResolutionError, Resolver};
