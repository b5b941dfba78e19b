//! Session recovery policy.
//!
//! Decides, before each test method runs, what has to be restarted so the
//! test starts against a usable session: nothing, the app under test, the
//! whole automation session, or (during suite provisioning) the server and
//! device together.

use serde::{Deserialize, Serialize};

/// Outcome of a single test method, as reported by the surrounding runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOutcome {
    Success,
    Failure,
    Skipped,
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestOutcome::Success => write!(f, "success"),
            TestOutcome::Failure => write!(f, "failure"),
            TestOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// What to restart before the next test runs.
///
/// `RestartSession` is carried out as an app restart first, escalating to a
/// full session restart only if the app restart errors out (the session or
/// server is presumed dead at that point).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Leave the session and app as they are.
    None,

    /// Restart only the app under test.
    RestartApp,

    /// Restore a working session: app restart first, session restart as the
    /// fallback.
    RestartSession,

    /// Full re-provisioning of server and device. Never produced by
    /// [`decide`]; used by the suite-start retry path.
    RestartServerAndDevice,
}

/// Pick the recovery action to apply before the next test.
///
/// Pure function of the previous test's outcome and the current suite phase:
/// - the first test of a suite never triggers recovery (suite start already
///   provisioned a fresh session);
/// - after a passing test, the app is restarted when the settings ask for a
///   clean app between tests;
/// - after a failing test, the session is restored unless restart-on-failure
///   was suppressed for this cycle.
pub fn decide(
    last_outcome: Option<TestOutcome>,
    is_first_test: bool,
    restart_app_on_success: bool,
    should_restart_on_failure: bool,
) -> RecoveryAction {
    if is_first_test {
        return RecoveryAction::None;
    }

    match last_outcome {
        Some(TestOutcome::Success) if restart_app_on_success => RecoveryAction::RestartApp,
        Some(TestOutcome::Failure) if should_restart_on_failure => RecoveryAction::RestartSession,
        _ => RecoveryAction::None,
    }
}
