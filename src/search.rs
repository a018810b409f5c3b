//! Background search task
//!
//! At most one search runs at a time. The worker owns the child process and
//! reports back over a channel; the UI polls it once per frame.

use crate::error::{FindViewError, Result};
use crate::logging;
use crate::metadata::MetadataSource;
use crate::query::{build_query, SearchCriteria};
use crate::results::{parse_output, ParsedOutput};
use crate::runner::{CancelToken, CommandRunner, ExecMode};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How a search ended
#[derive(Debug)]
pub enum SearchOutcome {
    Completed {
        parsed: ParsedOutput,
        elapsed: Duration,
        /// Non-fatal `find` complaints, e.g. unreadable directories
        warnings: Vec<String>,
    },
    Failed(FindViewError),
    Cancelled,
}

/// Messages from the worker thread
#[derive(Debug)]
pub enum SearchEvent {
    Finished(SearchOutcome),
}

/// Settings shared by every search
#[derive(Clone)]
pub struct SearchContext {
    pub program: String,
    pub max_rows: usize,
    pub runner: Arc<dyn CommandRunner>,
    pub metadata: Arc<dyn MetadataSource + Send>,
}

struct ActiveSearch {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

/// Single-flight search runner
pub struct SearchController {
    context: SearchContext,
    active: Option<ActiveSearch>,
    tx: Sender<SearchEvent>,
    rx: Receiver<SearchEvent>,
}

impl SearchController {
    pub fn new(context: SearchContext) -> Self {
        let (tx, rx) = unbounded();
        Self {
            context,
            active: None,
            tx,
            rx,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Validate and launch a search. Fails fast on validation errors and
    /// while another search is still running.
    pub fn start(&mut self, criteria: &SearchCriteria) -> Result<()> {
        if self.is_busy() {
            return Err(FindViewError::Busy);
        }
        let args = build_query(criteria)?;
        let mode = if criteria.as_root {
            ExecMode::Elevated
        } else {
            ExecMode::Normal
        };
        logging::info("SEARCH", &format!("Starting search {}", criteria.describe()));

        let cancel = CancelToken::new();
        let token = cancel.clone();
        let context = self.context.clone();
        let tx = self.tx.clone();

        let handle = thread::spawn(move || {
            // A panic must still report back, or the controller stays busy
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                run_search(&context, &args, mode, &token)
            }))
            .unwrap_or_else(|payload| {
                finish(SearchOutcome::Failed(FindViewError::Worker(panic_message(
                    payload.as_ref(),
                ))))
            });
            let _ = tx.send(SearchEvent::Finished(outcome));
        });

        self.active = Some(ActiveSearch { cancel, handle });
        Ok(())
    }

    /// Ask the running search to stop; its outcome still arrives via `poll`
    pub fn cancel(&self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }

    /// Drain finished outcomes without blocking
    pub fn poll(&mut self) -> Option<SearchOutcome> {
        let SearchEvent::Finished(outcome) = self.rx.try_recv().ok()?;
        self.finish();
        Some(outcome)
    }

    /// Block until the running search reports back
    pub fn wait(&mut self) -> Option<SearchOutcome> {
        self.active.as_ref()?;
        let SearchEvent::Finished(outcome) = self.rx.recv().ok()?;
        self.finish();
        Some(outcome)
    }

    fn finish(&mut self) {
        if let Some(active) = self.active.take() {
            let _ = active.handle.join();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            let _ = active.handle.join();
        }
    }
}

/// Runs on the worker thread
pub fn run_search(
    context: &SearchContext,
    args: &[String],
    mode: ExecMode,
    cancel: &CancelToken,
) -> SearchOutcome {
    let started = Instant::now();
    let output = match context.runner.run(&context.program, args, mode, cancel) {
        Ok(output) => output,
        Err(FindViewError::Cancelled) => return finish(SearchOutcome::Cancelled),
        Err(e) => return finish(SearchOutcome::Failed(e)),
    };

    // find exits non-zero for unreadable subtrees but still prints matches
    if !output.success() && output.stdout.trim().is_empty() {
        return finish(SearchOutcome::Failed(FindViewError::command_failed(
            output.exit_code,
            &output.stderr,
        )));
    }

    if cancel.is_cancelled() {
        return finish(SearchOutcome::Cancelled);
    }

    let parsed = parse_output(&output.stdout, context.max_rows, context.metadata.as_ref());
    let warnings = output
        .stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();

    finish(SearchOutcome::Completed {
        parsed,
        elapsed: started.elapsed(),
        warnings,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn finish(outcome: SearchOutcome) -> SearchOutcome {
    logging::log_search_outcome(&outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FoundEntry;
    use crate::runner::CommandOutput;
    use parking_lot::Mutex;
    use std::path::Path;

    struct BareSource;

    impl MetadataSource for BareSource {
        fn lookup(&self, path: &Path) -> FoundEntry {
            FoundEntry::bare(path)
        }
    }

    /// Replays a canned result and records what it was asked to run
    struct FakeRunner {
        result: Mutex<Option<Result<CommandOutput>>>,
        calls: Mutex<Vec<(String, Vec<String>, ExecMode)>>,
        block_until_cancelled: bool,
    }

    impl FakeRunner {
        fn new(result: Result<CommandOutput>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
                calls: Mutex::new(Vec::new()),
                block_until_cancelled: false,
            })
        }

        fn blocking() -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
                block_until_cancelled: true,
            })
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &str,
            args: &[String],
            mode: ExecMode,
            cancel: &CancelToken,
        ) -> Result<CommandOutput> {
            self.calls
                .lock()
                .push((program.to_string(), args.to_vec(), mode));
            if self.block_until_cancelled {
                while !cancel.is_cancelled() {
                    thread::sleep(Duration::from_millis(5));
                }
                return Err(FindViewError::Cancelled);
            }
            self.result
                .lock()
                .take()
                .unwrap_or_else(|| Ok(CommandOutput::default()))
        }
    }

    fn controller(runner: Arc<FakeRunner>) -> SearchController {
        SearchController::new(SearchContext {
            program: "find".to_string(),
            max_rows: 2000,
            runner,
            metadata: Arc::new(BareSource),
        })
    }

    fn ok(stdout: &str, stderr: &str, code: i32) -> Result<CommandOutput> {
        Ok(CommandOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: Some(code),
        })
    }

    #[test]
    fn completed_search_parses_rows() {
        let runner = FakeRunner::new(ok("/a/x\n/a/y\n", "", 0));
        let mut search = controller(runner.clone());
        search.start(&SearchCriteria::new("/a")).unwrap();
        match search.wait() {
            Some(SearchOutcome::Completed { parsed, warnings, .. }) => {
                assert_eq!(parsed.total, 2);
                assert_eq!(parsed.entries[1].name, "y");
                assert!(warnings.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!search.is_busy());
        let calls = runner.calls.lock();
        assert_eq!(calls[0].0, "find");
        assert_eq!(calls[0].1, vec!["/a"]);
        assert_eq!(calls[0].2, ExecMode::Normal);
    }

    #[test]
    fn as_root_runs_elevated() {
        let runner = FakeRunner::new(ok("", "", 0));
        let mut search = controller(runner.clone());
        let mut criteria = SearchCriteria::new("/root");
        criteria.as_root = true;
        search.start(&criteria).unwrap();
        search.wait();
        assert_eq!(runner.calls.lock()[0].2, ExecMode::Elevated);
    }

    #[test]
    fn validation_error_spawns_nothing() {
        let runner = FakeRunner::new(ok("", "", 0));
        let mut search = controller(runner.clone());
        let err = search.start(&SearchCriteria::default()).unwrap_err();
        assert!(matches!(err, FindViewError::MissingDirectory));
        assert!(!search.is_busy());
        assert!(runner.calls.lock().is_empty());
    }

    #[test]
    fn failure_is_distinct_from_empty_result() {
        let runner = FakeRunner::new(ok("", "find: unknown predicate `-invert'\n", 1));
        let mut search = controller(runner);
        search.start(&SearchCriteria::new("/a")).unwrap();
        match search.wait() {
            Some(SearchOutcome::Failed(FindViewError::CommandFailed { code, stderr })) => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("-invert"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let runner = FakeRunner::new(ok("", "", 0));
        let mut search = controller(runner);
        search.start(&SearchCriteria::new("/a")).unwrap();
        assert!(matches!(
            search.wait(),
            Some(SearchOutcome::Completed { parsed, .. }) if parsed.total == 0
        ));
    }

    #[test]
    fn partial_results_keep_warnings() {
        let runner = FakeRunner::new(ok(
            "/a/ok\n",
            "find: '/a/secret': Permission denied\n",
            1,
        ));
        let mut search = controller(runner);
        search.start(&SearchCriteria::new("/a")).unwrap();
        match search.wait() {
            Some(SearchOutcome::Completed { parsed, warnings, .. }) => {
                assert_eq!(parsed.total, 1);
                assert_eq!(warnings.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn runner_errors_are_propagated() {
        let runner = FakeRunner::new(Err(FindViewError::ElevationDenied));
        let mut search = controller(runner);
        search.start(&SearchCriteria::new("/a")).unwrap();
        assert!(matches!(
            search.wait(),
            Some(SearchOutcome::Failed(FindViewError::ElevationDenied))
        ));
    }

    #[test]
    fn second_search_is_rejected_while_busy_then_cancel() {
        let runner = FakeRunner::blocking();
        let mut search = controller(runner);
        search.start(&SearchCriteria::new("/a")).unwrap();
        assert!(search.is_busy());
        assert!(matches!(
            search.start(&SearchCriteria::new("/b")),
            Err(FindViewError::Busy)
        ));

        search.cancel();
        assert!(matches!(search.wait(), Some(SearchOutcome::Cancelled)));
        assert!(!search.is_busy());
        search.start(&SearchCriteria::new("/c")).unwrap();
    }

    #[test]
    fn drop_cancels_running_search() {
        let runner = FakeRunner::blocking();
        let mut search = controller(runner.clone());
        search.start(&SearchCriteria::new("/a")).unwrap();
        while runner.calls.lock().is_empty() {
            thread::sleep(Duration::from_millis(5));
        }
        // Would hang forever if drop did not cancel
        drop(search);
        assert_eq!(runner.calls.lock().len(), 1);
    }

    struct ExplodingSource;

    impl MetadataSource for ExplodingSource {
        fn lookup(&self, path: &Path) -> FoundEntry {
            panic!("cannot stat {}", path.display());
        }
    }

    #[test]
    fn worker_panic_reports_failure_and_frees_controller() {
        let runner = FakeRunner::new(ok("/a/x\n", "", 0));
        let mut search = SearchController::new(SearchContext {
            program: "find".to_string(),
            max_rows: 2000,
            runner,
            metadata: Arc::new(ExplodingSource),
        });
        search.start(&SearchCriteria::new("/a")).unwrap();
        match search.wait() {
            Some(SearchOutcome::Failed(FindViewError::Worker(message))) => {
                assert!(message.contains("cannot stat /a/x"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!search.is_busy());
        assert!(search.start(&SearchCriteria::new("/b")).is_ok());
    }

    #[test]
    fn poll_is_non_blocking() {
        let runner = FakeRunner::blocking();
        let mut search = controller(runner);
        assert!(search.poll().is_none());
        search.start(&SearchCriteria::new("/a")).unwrap();
        assert!(search.poll().is_none());
        assert!(search.is_busy());
        search.cancel();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcome = None;
        while outcome.is_none() && Instant::now() < deadline {
            outcome = search.poll();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(outcome, Some(SearchOutcome::Cancelled)));
    }
}
