//! Probe execution across repositories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{DsommError, Result};
use crate::probes::{Probe, ProbeReport, Resolver, UNABLE_TO_CHECK};
use crate::selector::SelectionSet;

use super::cancel::CancellationToken;
use super::guard::{run_guarded, ERROR_EXCEPTION};

/// Default number of concurrent probe invocations.
pub const DEFAULT_WORKERS: usize = 4;

/// Default limit for a single probe invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How often a waiting worker looks at the cancellation token.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Engine settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Size of the worker pool.
    ///
    /// This bounds the probes being waited on, not the threads alive: a probe
    /// that times out is abandoned on its own thread and keeps running while
    /// its worker moves on, so hung probes can push live API calls past this
    /// number until they return.
    pub workers: usize,
    /// Limit for one probe invocation.
    pub timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Progress events emitted while probes run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// The run is about to start.
    Started { total: usize },
    /// A (repository, check) pair has its result.
    PairFinished {
        repo: &'a str,
        check: &'a str,
        report: &'a ProbeReport,
        completed: usize,
        total: usize,
    },
}

/// One (repository, check) result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult<'a> {
    pub repo: &'a str,
    pub check: &'a str,
    pub report: &'a ProbeReport,
}

/// Every result of a completed run.
///
/// Slots are laid out repository-major: the report of `repos[r]` and
/// `checks[c]` lives at `r * checks.len() + c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResults {
    repos: Vec<String>,
    checks: Vec<String>,
    reports: Vec<ProbeReport>,
}

impl RunResults {
    /// Assemble results from a report grid; `None` when the sizes disagree.
    pub fn from_grid(
        repos: Vec<String>,
        checks: Vec<String>,
        reports: Vec<ProbeReport>,
    ) -> Option<Self> {
        (reports.len() == repos.len() * checks.len()).then_some(Self {
            repos,
            checks,
            reports,
        })
    }

    pub fn repos(&self) -> &[String] {
        &self.repos
    }

    pub fn checks(&self) -> &[String] {
        &self.checks
    }

    /// Report for a (repository, check) pair.
    pub fn get(&self, repo: &str, check: &str) -> Option<&ProbeReport> {
        let r = self.repos.iter().position(|x| x == repo)?;
        let c = self.checks.iter().position(|x| x == check)?;
        self.reports.get(r * self.checks.len() + c)
    }

    /// Every result, repository-major.
    pub fn iter(&self) -> impl Iterator<Item = ProbeResult<'_>> {
        self.reports.iter().enumerate().map(|(slot, report)| {
            let width = self.checks.len();
            ProbeResult {
                repo: &self.repos[slot / width],
                check: &self.checks[slot % width],
                report,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

struct Job {
    slot: usize,
    repo: String,
    check: String,
    probe: Arc<dyn Probe>,
}

/// Runs the selected checks against every repository.
///
/// Pairs are executed on a fixed pool of worker threads. Each probe
/// invocation runs on its own thread so a probe that hangs can be abandoned
/// once its timeout expires; a panicking probe is recorded as
/// "Error exception". Results are collected in their slots and returned only
/// when every pair has one.
pub struct Engine<'a> {
    resolver: &'a Resolver<'a>,
    options: RunOptions,
    cancel: CancellationToken,
}

impl<'a> Engine<'a> {
    pub fn new(resolver: &'a Resolver<'a>, options: RunOptions, cancel: CancellationToken) -> Self {
        Self {
            resolver,
            options,
            cancel,
        }
    }

    /// Run every selected check against every repository.
    pub fn run(&self, repos: &[String], selection: &SelectionSet) -> Result<RunResults> {
        self.run_with_progress(repos, selection, |_| {})
    }

    /// Run with a progress callback.
    ///
    /// The callback is invoked on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`DsommError::Cancelled`] when the cancellation token fires;
    /// results gathered so far are discarded.
    pub fn run_with_progress(
        &self,
        repos: &[String],
        selection: &SelectionSet,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunResults> {
        let checks: Vec<String> = selection.names().to_vec();
        let total = repos.len() * checks.len();
        let mut slots: Vec<Option<ProbeReport>> = vec![None; total];
        let mut jobs = Vec::new();

        for (c, check) in checks.iter().enumerate() {
            match self.resolver.resolve(check) {
                Ok(probe) => {
                    for (r, repo) in repos.iter().enumerate() {
                        jobs.push(Job {
                            slot: r * checks.len() + c,
                            repo: repo.clone(),
                            check: check.clone(),
                            probe: Arc::clone(&probe),
                        });
                    }
                }
                Err(err) => {
                    tracing::debug!(check = %check, error = %err, "Check not resolved");
                    let report = err.to_report();
                    for r in 0..repos.len() {
                        slots[r * checks.len() + c] = Some(report.clone());
                    }
                }
            }
        }

        tracing::info!(
            repos = repos.len(),
            checks = checks.len(),
            workers = self.options.workers,
            "Starting run"
        );
        on_progress(RunProgress::Started { total });

        let mut completed = 0;
        for (slot, report) in slots.iter().enumerate() {
            if let Some(report) = report {
                completed += 1;
                on_progress(RunProgress::PairFinished {
                    repo: &repos[slot / checks.len()],
                    check: &checks[slot % checks.len()],
                    report,
                    completed,
                    total,
                });
            }
        }

        if self.cancel.is_cancelled() {
            return Err(DsommError::Cancelled);
        }

        let workers = self.options.workers.max(1).min(jobs.len());
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, ProbeReport)>();

        thread::scope(|scope| -> Result<()> {
            for id in 0..workers {
                let tx = tx.clone();
                let jobs = &jobs;
                let next = &next;
                thread::Builder::new()
                    .name(format!("dsomm-worker-{}", id))
                    .spawn_scoped(scope, move || {
                        self.work(jobs, next, &tx);
                    })?;
            }
            drop(tx);

            for (index, report) in rx {
                let job = &jobs[index];
                completed += 1;
                on_progress(RunProgress::PairFinished {
                    repo: &job.repo,
                    check: &job.check,
                    report: &report,
                    completed,
                    total,
                });
                slots[job.slot] = Some(report);
            }
            Ok(())
        })?;

        if self.cancel.is_cancelled() {
            tracing::warn!(completed, total, "Run cancelled");
            return Err(DsommError::Cancelled);
        }

        let reports = slots
            .into_iter()
            .map(|r| r.unwrap_or_else(|| ProbeReport::error(ERROR_EXCEPTION)))
            .collect();

        tracing::info!(results = total, "Run finished");
        Ok(RunResults {
            repos: repos.to_vec(),
            checks,
            reports,
        })
    }

    fn work(&self, jobs: &[Job], next: &AtomicUsize, tx: &mpsc::Sender<(usize, ProbeReport)>) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            let index = next.fetch_add(1, Ordering::SeqCst);
            let Some(job) = jobs.get(index) else {
                return;
            };

            let Some(report) = self.invoke(job) else {
                return;
            };
            if tx.send((index, report)).is_err() {
                return;
            }
        }
    }

    /// Run one probe with the configured timeout. `None` means the run was
    /// cancelled while waiting.
    fn invoke(&self, job: &Job) -> Option<ProbeReport> {
        let (tx, rx) = mpsc::channel();
        let probe = Arc::clone(&job.probe);
        let repo = job.repo.clone();

        let spawned = thread::Builder::new()
            .name(format!("dsomm-probe-{}", job.check))
            .spawn(move || {
                let _ = tx.send(run_guarded(probe.as_ref(), &repo));
            });
        if let Err(err) = spawned {
            tracing::error!(check = %job.check, error = %err, "Failed to start probe thread");
            return Some(ProbeReport::error(ERROR_EXCEPTION));
        }

        // A timeout too large to represent means no deadline at all.
        let deadline = Instant::now().checked_add(self.options.timeout);
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => CANCEL_POLL,
            };
            if remaining.is_zero() {
                tracing::warn!(
                    repo = %job.repo,
                    check = %job.check,
                    timeout = ?self.options.timeout,
                    "Probe timed out"
                );
                return Some(ProbeReport::error(UNABLE_TO_CHECK));
            }
            match rx.recv_timeout(remaining.min(CANCEL_POLL)) {
                Ok(report) => {
                    if !report.is_success() {
                        tracing::debug!(repo = %job.repo, check = %job.check, detail = %report.detail, "Check failed");
                    }
                    return Some(report);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Some(ProbeReport::error(ERROR_EXCEPTION));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{ProbeStatus, ProbeTable, NOT_SUPPORTED};
    use crate::registry::{parse_registry_str, Registry};
    use crate::selector::select;

    fn registry() -> Registry {
        parse_registry_str(
            r#"
L1:
  - name: a
    probe: proba
L2:
  - name: b
    probe: probb
    supported: false
"#,
        )
        .unwrap()
    }

    fn repos(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn options(workers: usize, timeout: Duration) -> RunOptions {
        RunOptions { workers, timeout }
    }

    #[test]
    fn unsupported_checks_never_reach_probes() {
        let registry = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut table = ProbeTable::new();
        table.register("proba", |_: &str| ProbeReport::raw("Detected"));
        table.register("probb", move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            ProbeReport::raw("Detected")
        });

        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(&resolver, RunOptions::default(), CancellationToken::new());
        let selection = select("ALL", &registry).unwrap();
        let results = engine.run(&repos(&["x"]), &selection).unwrap();

        assert_eq!(results.get("x", "a").unwrap().detail, "Detected");
        assert_eq!(results.get("x", "b").unwrap().detail, NOT_SUPPORTED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn binding_errors_are_recorded_per_repo() {
        let registry = registry();
        let table = ProbeTable::new();
        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(&resolver, RunOptions::default(), CancellationToken::new());
        let selection = select("L1", &registry).unwrap();

        let results = engine.run(&repos(&["x", "y"]), &selection).unwrap();
        for repo in ["x", "y"] {
            let report = results.get(repo, "a").unwrap();
            assert_eq!(report.status, ProbeStatus::Error);
            assert!(report.detail.contains("proba"));
        }
    }

    #[test]
    fn panicking_probe_is_isolated() {
        let registry = parse_registry_str(
            "L1:\n  - name: boom\n    probe: boom\n  - name: ok\n    probe: ok\n",
        )
        .unwrap();
        let mut table = ProbeTable::new();
        table.register("boom", |_: &str| -> ProbeReport { panic!("kaboom") });
        table.register("ok", |_: &str| ProbeReport::success("Enabled"));

        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(&resolver, RunOptions::default(), CancellationToken::new());
        let results = engine
            .run(&repos(&["x"]), &select("ALL", &registry).unwrap())
            .unwrap();

        assert_eq!(results.get("x", "boom").unwrap().detail, ERROR_EXCEPTION);
        assert!(results.get("x", "ok").unwrap().is_success());
    }

    fn delayed_registry() -> Registry {
        parse_registry_str(
            "L1:\n  - name: one\n    probe: slow\n  - name: two\n    probe: slow_echo\n",
        )
        .unwrap()
    }

    fn delayed_table(delay: Duration) -> ProbeTable {
        let mut table = ProbeTable::new();
        table.register("slow", move |repo: &str| {
            thread::sleep(delay);
            ProbeReport::raw(format!("Detected ({})", repo))
        });
        table.register("slow_echo", move |repo: &str| {
            thread::sleep(delay);
            if repo.ends_with('2') {
                ProbeReport::raw("Not detected")
            } else {
                ProbeReport::raw("Enabled")
            }
        });
        table
    }

    #[test]
    fn pool_runs_pairs_concurrently() {
        let registry = delayed_registry();
        let table = delayed_table(Duration::from_millis(150));
        let resolver = Resolver::new(&registry, &table, []);
        let selection = select("ALL", &registry).unwrap();
        let repos = repos(&["r1", "r2", "r3", "r4"]);

        let engine = Engine::new(
            &resolver,
            options(4, Duration::from_secs(10)),
            CancellationToken::new(),
        );
        let start = Instant::now();
        let results = engine.run(&repos, &selection).unwrap();
        let elapsed = start.elapsed();

        // 8 pairs at 150ms on 4 workers is two rounds; sequential would be 1.2s.
        assert!(elapsed < Duration::from_millis(900), "took {:?}", elapsed);
        assert_eq!(results.len(), 8);
    }

    #[test]
    fn concurrent_and_sequential_runs_agree() {
        let registry = delayed_registry();
        let table = delayed_table(Duration::from_millis(5));
        let resolver = Resolver::new(&registry, &table, []);
        let selection = select("ALL", &registry).unwrap();
        let repos = repos(&["r1", "r2", "r3"]);

        let run = |workers| {
            Engine::new(
                &resolver,
                options(workers, Duration::from_secs(10)),
                CancellationToken::new(),
            )
            .run(&repos, &selection)
            .unwrap()
        };

        assert_eq!(run(1), run(4));
    }

    #[test]
    fn hung_probe_times_out_without_blocking_others() {
        let registry = parse_registry_str(
            "L1:\n  - name: hang\n    probe: hang\n  - name: quick\n    probe: quick\n",
        )
        .unwrap();
        let mut table = ProbeTable::new();
        table.register("hang", |_: &str| {
            thread::sleep(Duration::from_secs(30));
            ProbeReport::raw("Detected")
        });
        table.register("quick", |_: &str| ProbeReport::success("Enabled"));

        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(
            &resolver,
            options(2, Duration::from_millis(200)),
            CancellationToken::new(),
        );

        let start = Instant::now();
        let results = engine
            .run(&repos(&["x"]), &select("ALL", &registry).unwrap())
            .unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        let hung = results.get("x", "hang").unwrap();
        assert_eq!(hung.status, ProbeStatus::Error);
        assert_eq!(hung.detail, UNABLE_TO_CHECK);
        assert!(!hung.is_success());
        assert!(results.get("x", "quick").unwrap().is_success());
    }

    #[test]
    fn abandoned_probe_frees_its_worker() {
        let registry = parse_registry_str("L1:\n  - name: slow\n    probe: slow\n").unwrap();
        let mut table = ProbeTable::new();
        table.register("slow", |repo: &str| {
            if repo == "x" {
                thread::sleep(Duration::from_secs(30));
            }
            ProbeReport::success("Enabled")
        });

        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(
            &resolver,
            options(1, Duration::from_millis(200)),
            CancellationToken::new(),
        );

        let start = Instant::now();
        let results = engine
            .run(&repos(&["x", "y"]), &select("ALL", &registry).unwrap())
            .unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(results.get("x", "slow").unwrap().status, ProbeStatus::Error);
        assert!(results.get("y", "slow").unwrap().is_success());
    }

    #[test]
    fn unrepresentable_timeout_waits_without_deadline() {
        let registry = registry();
        let mut table = ProbeTable::new();
        table.register("proba", |_: &str| ProbeReport::success("Enabled"));
        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(
            &resolver,
            options(1, Duration::from_secs(u64::MAX)),
            CancellationToken::new(),
        );

        let results = engine
            .run(&repos(&["x"]), &select("ALL", &registry).unwrap())
            .unwrap();

        let report = results.get("x", "a").unwrap();
        assert!(report.is_success());
        assert_eq!(report.detail, "Enabled");
    }

    #[test]
    fn cancelled_before_start() {
        let registry = registry();
        let mut table = ProbeTable::new();
        table.register("proba", |_: &str| ProbeReport::raw("Detected"));
        let resolver = Resolver::new(&registry, &table, []);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let engine = Engine::new(&resolver, RunOptions::default(), cancel);

        let result = engine.run(&repos(&["x"]), &select("ALL", &registry).unwrap());
        assert!(matches!(result, Err(DsommError::Cancelled)));
    }

    #[test]
    fn cancellation_mid_run_discards_results() {
        let registry = registry();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut table = ProbeTable::new();
        table.register("proba", move |_: &str| {
            trigger.cancel();
            thread::sleep(Duration::from_secs(5));
            ProbeReport::raw("Detected")
        });
        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(&resolver, RunOptions::default(), cancel);

        let start = Instant::now();
        let result = engine.run(&repos(&["x", "y"]), &select("L1", &registry).unwrap());

        assert!(matches!(result, Err(DsommError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn progress_reports_every_pair() {
        let registry = registry();
        let mut table = ProbeTable::new();
        table.register("proba", |_: &str| ProbeReport::raw("Detected"));
        let resolver = Resolver::new(&registry, &table, []);
        let engine = Engine::new(&resolver, RunOptions::default(), CancellationToken::new());

        let mut finished = Vec::new();
        let mut announced = 0;
        engine
            .run_with_progress(
                &repos(&["x", "y"]),
                &select("ALL", &registry).unwrap(),
                |event| match event {
                    RunProgress::Started { total } => announced = total,
                    RunProgress::PairFinished {
                        repo,
                        check,
                        completed,
                        ..
                    } => finished.push((repo.to_string(), check.to_string(), completed)),
                },
            )
            .unwrap();

        assert_eq!(announced, 4);
        assert_eq!(finished.len(), 4);
        assert_eq!(finished.last().map(|f| f.2), Some(4));
    }

    #[test]
    fn results_iterate_repository_major() {
        let results = RunResults::from_grid(
            repos(&["x", "y"]),
            repos(&["a", "b"]),
            vec![
                ProbeReport::raw("1"),
                ProbeReport::raw("2"),
                ProbeReport::raw("3"),
                ProbeReport::raw("4"),
            ],
        )
        .unwrap();

        let pairs: Vec<_> = results
            .iter()
            .map(|r| (r.repo, r.check, r.report.detail.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [("x", "a", "1"), ("x", "b", "2"), ("y", "a", "3"), ("y", "b", "4")]
        );
        assert!(RunResults::from_grid(repos(&["x"]), repos(&["a"]), vec![]).is_none());
    }
}
