//! Suite lifecycle orchestration.
//!
//! [`LifecycleOrchestrator`] is the single integration point between the
//! test runner's hook dispatch and the automation stack. The runner calls
//! `on_suite_start` / `on_before_test` / `on_after_test` / `on_after_class` /
//! `on_suite_end` at its own boundaries; test bodies call the comparison API
//! in between. The orchestrator owns the suite's [`RunContext`] and applies
//! the recovery policy from [`crate::recovery`] before every test.
//!
//! All operations block the calling test thread; they may start and stop
//! external processes and are not safe to call concurrently for the same
//! suite. A parallel runner must give each suite its own orchestrator and
//! device.

use crate::capabilities::build_capabilities;
use crate::config::{Platform, Settings};
use crate::driver::{
    AppController, DeviceController, DriverError, NavigationTracker, ServerController,
};
use crate::harness::types::{HarnessError, HarnessResult};
use crate::recovery::{self, RecoveryAction, TestOutcome};
use crate::report::{SuiteReport, TestRecord};
use crate::verify::{CompareError, ComparisonRequest, VerdictStore, VisualComparator};

/// Suite-scoped mutable state shared across all tests in one suite run.
///
/// Exactly one `RunContext` exists per suite execution; the orchestrator is
/// its sole owner, so parallel suites stay isolated.
pub struct RunContext {
    /// Outcome of the most recently finished test
    pub last_outcome: Option<TestOutcome>,

    /// Whether the next failure should trigger session recovery. Defaults to
    /// true; a suppression lasts for one decision cycle only.
    pub should_restart_on_failure: bool,

    /// Set at suite start, cleared after the first `on_before_test`
    pub first_test_pending: bool,

    /// Identifier of the test currently running
    pub test_name: String,

    /// Maximum app memory usage observed across the suite (MB)
    pub max_memory_observed_mb: u64,

    /// Accumulated per-test records
    pub records: Vec<TestRecord>,

    /// Optional navigation-state tracker, detached at class teardown
    pub navigation: Option<Box<dyn NavigationTracker>>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            last_outcome: None,
            should_restart_on_failure: true,
            first_test_pending: true,
            test_name: String::new(),
            max_memory_observed_mb: 0,
            records: Vec::new(),
            navigation: None,
        }
    }
}

/// Sequences suite-level and test-level hooks for one UI test suite.
pub struct LifecycleOrchestrator {
    settings: Settings,
    server: Box<dyn ServerController>,
    device: Box<dyn DeviceController>,
    app: Box<dyn AppController>,
    comparator: Box<dyn VisualComparator>,
    context: RunContext,
    store: VerdictStore,
}

impl LifecycleOrchestrator {
    /// Create an orchestrator bound to the given collaborators.
    pub fn new(
        settings: Settings,
        server: Box<dyn ServerController>,
        device: Box<dyn DeviceController>,
        app: Box<dyn AppController>,
        comparator: Box<dyn VisualComparator>,
    ) -> Self {
        Self {
            settings,
            server,
            device,
            app,
            comparator,
            context: RunContext::new(),
            store: VerdictStore::new(),
        }
    }

    /// Attach a navigation-state tracker for the current class of tests.
    pub fn attach_navigation_tracker(&mut self, tracker: Box<dyn NavigationTracker>) {
        self.context.navigation = Some(tracker);
    }

    /// The suite's shared run context.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// The settings this suite runs under.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Suite/test boundary hooks
    // ------------------------------------------------------------------

    /// Bring up server, device and session before any test runs.
    ///
    /// The server gets exactly one retry: if the initial start errors or
    /// reports the server not running, a full restart is attempted once. Any
    /// failure past that point is fatal and aborts the suite.
    pub fn on_suite_start(&mut self) -> HarnessResult<()> {
        let capabilities = build_capabilities(&self.settings)?;
        tracing::debug!(
            capability_count = capabilities.len(),
            platform = %self.settings.platform,
            "capabilities built"
        );

        let running = match self.server.start() {
            Ok(running) => running,
            Err(err) => {
                tracing::error!(error = %err, "initial server start failed");
                false
            }
        };
        if !running {
            tracing::info!("server not running after start, attempting one restart");
            self.server.restart().map_err(|err| {
                HarnessError::Provisioning(format!(
                    "server did not come up after start and one restart: {}",
                    err
                ))
            })?;
        }

        self.device
            .boot_device()
            .map_err(|err| HarnessError::Provisioning(format!("device boot failed: {}", err)))?;
        self.device.create_session().map_err(|err| {
            HarnessError::Provisioning(format!("session creation failed: {}", err))
        })?;

        self.context.first_test_pending = true;
        tracing::info!(device = %self.settings.device_name, "suite provisioned");
        Ok(())
    }

    /// Prepare the session for the next test.
    ///
    /// Applies the recovery action chosen by [`recovery::decide`], then
    /// resets the per-test comparison state. The restart-on-failure flag is
    /// re-armed here: a suppression only ever spans one decision cycle.
    pub fn on_before_test(&mut self, test_name: &str) -> HarnessResult<()> {
        self.context.test_name = test_name.to_string();

        let action = recovery::decide(
            self.context.last_outcome,
            self.context.first_test_pending,
            self.settings.restart_app_between_tests,
            self.context.should_restart_on_failure,
        );
        tracing::debug!(test = test_name, ?action, "recovery decision");
        self.apply_recovery(action)?;

        self.context.first_test_pending = false;
        self.context.should_restart_on_failure = true;

        // Every test starts with an empty verdict store and a fresh counter.
        self.store.clear();
        Ok(())
    }

    /// Record a finished test.
    ///
    /// Runs the platform health check, which may flip the record to a
    /// failure, then persists the final outcome on the run context. Never
    /// raises; problems found here are either part of the returned record or
    /// diagnostic-only.
    pub fn on_after_test(&mut self, outcome: TestOutcome) -> TestRecord {
        let mut record = TestRecord::new(self.context.test_name.clone(), outcome);
        self.check_memory(&mut record);

        self.context.last_outcome = Some(record.outcome);
        match record.outcome {
            TestOutcome::Failure => tracing::error!(
                test = %record.name,
                diagnostics = ?record.diagnostics,
                "test failed"
            ),
            _ => tracing::info!(test = %record.name, outcome = %record.outcome, "test finished"),
        }

        self.context.records.push(record.clone());
        record
    }

    /// Return the app to its home state at class teardown.
    ///
    /// Detaches the navigation tracker if one is attached; safe to call any
    /// number of times.
    pub fn on_after_class(&mut self) {
        if let Some(mut tracker) = self.context.navigation.take() {
            if let Err(err) = tracker.navigate_home() {
                tracing::error!(error = %err, "navigate home failed during class teardown");
            }
        }
    }

    /// Flush suite metrics and tear everything down.
    ///
    /// Teardown is best-effort: session, device and server are each stopped
    /// in that order even when an earlier step fails; the first error is
    /// surfaced after all steps ran.
    pub fn on_suite_end(&mut self) -> HarnessResult<SuiteReport> {
        let report = self.suite_report();
        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            max_memory_mb = report.max_memory_observed_mb,
            "suite finished"
        );

        let mut first_error: Option<DriverError> = None;
        let steps = [
            ("end session", self.device.end_session()),
            ("stop device", self.device.stop_device()),
            ("stop server", self.server.stop()),
        ];
        for (step, result) in steps {
            if let Err(err) = result {
                tracing::error!(step, error = %err, "teardown step failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(HarnessError::Driver(err)),
            None => Ok(report),
        }
    }

    /// Aggregate report over the tests recorded so far.
    pub fn suite_report(&self) -> SuiteReport {
        SuiteReport::from_records(
            self.context.records.clone(),
            self.context.max_memory_observed_mb,
        )
    }

    // ------------------------------------------------------------------
    // Comparison API
    // ------------------------------------------------------------------

    /// Compare the current screen against its baseline and record the
    /// verdict.
    pub fn compare_screen(&mut self, request: ComparisonRequest) -> HarnessResult<bool> {
        self.run_comparison(request)
    }

    /// Compare one element's rendered region against its baseline and record
    /// the verdict. The request must carry an element region.
    pub fn compare_element(&mut self, request: ComparisonRequest) -> HarnessResult<bool> {
        if request.element.is_none() {
            return Err(HarnessError::Comparison(CompareError::MissingRegion));
        }
        self.run_comparison(request)
    }

    /// Compare the current screen and immediately assert every recorded
    /// verdict.
    pub fn assert_screen(&mut self, request: ComparisonRequest) -> HarnessResult<()> {
        self.compare_screen(request)?;
        self.assert_all_comparisons()
    }

    /// Fail if any comparison recorded in the current test did not match.
    ///
    /// Exhaustive: the error names every mismatching comparison. An empty
    /// store is a vacuous success.
    pub fn assert_all_comparisons(&self) -> HarnessResult<()> {
        let failing = self.store.failing_names();
        if failing.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::ComparisonMismatch(failing))
        }
    }

    /// Drop all recorded verdicts and restart derived naming, for tests that
    /// want a fresh comparison group mid-test.
    pub fn clear_comparisons(&mut self) {
        self.store.clear();
    }

    fn run_comparison(&mut self, request: ComparisonRequest) -> HarnessResult<bool> {
        let name = self
            .store
            .resolve_name(request.name.as_deref(), &self.context.test_name);
        let verdict = self.comparator.compare(&name, &request)?;
        tracing::debug!(comparison = %name, verdict, "comparison recorded");
        self.store.record(name, verdict);
        Ok(verdict)
    }

    // ------------------------------------------------------------------
    // Recovery & health check
    // ------------------------------------------------------------------

    fn apply_recovery(&mut self, action: RecoveryAction) -> HarnessResult<()> {
        match action {
            RecoveryAction::None => Ok(()),
            RecoveryAction::RestartApp => {
                tracing::info!("restarting app before test");
                self.app.restart().map_err(HarnessError::from)
            }
            RecoveryAction::RestartSession => self.restore_session(),
            RecoveryAction::RestartServerAndDevice => {
                self.server.restart()?;
                self.device.boot_device()?;
                self.device.create_session()?;
                Ok(())
            }
        }
    }

    /// Restore a working session after a failed test.
    ///
    /// The app restart is the cheap primary attempt; if it errors the
    /// session or server is presumed dead and a full session restart is the
    /// one escalation. Afterwards the navigation tracker is pointed back at
    /// the last opened page so navigation-dependent assertions stay valid.
    fn restore_session(&mut self) -> HarnessResult<()> {
        if let Err(app_err) = self.app.restart() {
            tracing::error!(error = %app_err, "app restart failed, escalating to session restart");
            self.device
                .restart_session()
                .map_err(|session_err| HarnessError::Recovery {
                    app_restart: app_err,
                    session_restart: Some(session_err),
                })?;
        }

        match self.context.navigation.as_mut() {
            Some(tracker) => tracker.reset_to_last_page()?,
            None => {
                tracing::error!("no navigation tracker attached during failure recovery");
            }
        }
        Ok(())
    }

    /// Per-test resource guard.
    ///
    /// Android samples the app's memory usage after every test; an
    /// unavailable sample is logged, never fatal. With a configured limit,
    /// a sample above it flips the record to a failure. Other platforms have
    /// no memory introspection and this is a no-op.
    fn check_memory(&mut self, record: &mut TestRecord) {
        if self.settings.platform != Platform::Android {
            tracing::debug!(
                platform = %self.settings.platform,
                "memory check not implemented for this platform"
            );
            return;
        }

        match self.device.memory_usage(&self.settings.app_id) {
            Ok(Some(used)) => {
                tracing::info!(used_mb = used, "app memory usage");
                record.memory_used_mb = Some(used);

                if used > self.context.max_memory_observed_mb {
                    self.context.max_memory_observed_mb = used;
                    tracing::debug!(max_mb = used, "new maximum memory usage");
                }

                let limit = self.settings.memory_max_usage_limit;
                if limit > 0 && used > limit {
                    let err = HarnessError::ResourceLimit {
                        used_mb: used,
                        limit_mb: limit,
                    };
                    tracing::error!(test = %record.name, "{}", err);
                    record.outcome = TestOutcome::Failure;
                    record.diagnostics.push(err.to_string());
                }
            }
            Ok(None) => tracing::error!("failed to get memory usage stats"),
            Err(err) => tracing::error!(error = %err, "failed to get memory usage stats"),
        }
    }
}
