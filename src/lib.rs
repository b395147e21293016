//! dsomm - Score repositories against the DevSecOps Maturity Model.
//!
//! A registry of maturity levels names the checks; probes evaluate each
//! selected check against each repository; the results are scored per level
//! and rendered as a grid, CSV or JSON.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered settings
//! - [`error`] - Error types and result aliases
//! - [`github`] - Blocking GitHub REST client
//! - [`probes`] - Probe contract, dispatch table and built-in probes
//! - [`registry`] - Levels and checks of the maturity model
//! - [`render`] - Table, CSV and JSON output
//! - [`repos`] - Repository inputs
//! - [`runner`] - Concurrent probe execution
//! - [`score`] - Per-level aggregation
//! - [`selector`] - Selection expressions
//! - [`ui`] - Prompts, progress and terminal output
//!
//! # Example
//!
//! ```
//! use dsomm::probes::{ProbeReport, ProbeTable, Resolver};
//! use dsomm::registry::parse_registry_str;
//! use dsomm::render::{render_to_string, OutputFormat};
//! use dsomm::runner::{CancellationToken, Engine, RunOptions};
//! use dsomm::score::aggregate;
//! use dsomm::selector::select;
//!
//! let registry = parse_registry_str(
//!     "L1:\n  - name: a\n    probe: proba\nL2:\n  - name: b\n    probe: probb\n    supported: false\n",
//! )
//! .unwrap();
//!
//! let mut table = ProbeTable::new();
//! table.register("proba", |_: &str| ProbeReport::raw("Detected"));
//!
//! let resolver = Resolver::new(&registry, &table, []);
//! let selection = select("ALL", &registry).unwrap();
//! let engine = Engine::new(&resolver, RunOptions::default(), CancellationToken::new());
//! let results = engine.run(&["x".to_string()], &selection).unwrap();
//!
//! let board = aggregate(&results, &registry, &selection);
//! assert_eq!(board.summary_lines(), ["L1: 1/1 checks successful"]);
//! assert!(render_to_string(&board, OutputFormat::Csv).ends_with("TOTAL score,1/1\n"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod probes;
pub mod registry;
pub mod render;
pub mod repos;
pub mod runner;
pub mod score;
pub mod selector;
pub mod ui;

pub use error::{DsommError, Result};
