//! Integration tests for the suite lifecycle and recovery flow

use std::collections::VecDeque;

use app_vision::mock::{
    CallLog, ScriptedApp, ScriptedComparator, ScriptedDevice, ScriptedNavigationTracker,
    ScriptedServer, new_call_log,
};
use app_vision::{
    ComparisonRequest, HarnessError, LifecycleOrchestrator, Settings, TestOutcome,
};

fn suite(
    settings: Settings,
    server: ScriptedServer,
    device: ScriptedDevice,
    app: ScriptedApp,
    comparator: ScriptedComparator,
) -> LifecycleOrchestrator {
    LifecycleOrchestrator::new(
        settings,
        Box::new(server),
        Box::new(device),
        Box::new(app),
        Box::new(comparator),
    )
}

fn default_suite(log: &CallLog) -> LifecycleOrchestrator {
    suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    )
}

fn calls(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

fn count(log: &CallLog, name: &str) -> usize {
    log.borrow().iter().filter(|c| c.as_str() == name).count()
}

#[test]
fn test_suite_start_provisions_in_order() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();

    assert_eq!(
        calls(&log),
        vec!["server.start", "device.boot", "device.create_session"]
    );
}

#[test]
fn test_suite_start_retries_server_once() {
    let log = new_call_log();
    let mut server = ScriptedServer::new(log.clone());
    server.fail_first_start = true;
    let mut orchestrator = suite(
        Settings::defaults(),
        server,
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();

    assert_eq!(
        calls(&log),
        vec![
            "server.start",
            "server.restart",
            "device.boot",
            "device.create_session"
        ]
    );
}

#[test]
fn test_suite_start_aborts_when_retry_fails() {
    let log = new_call_log();
    let mut server = ScriptedServer::new(log.clone());
    server.fail_first_start = true;
    server.fail_restart = true;
    let mut orchestrator = suite(
        Settings::defaults(),
        server,
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    let err = orchestrator.on_suite_start().unwrap_err();
    assert!(matches!(err, HarnessError::Provisioning(_)));
    // Provisioning stops at the server; the device is never touched.
    assert_eq!(count(&log, "device.boot"), 0);
}

#[test]
fn test_first_test_runs_without_recovery() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();

    assert_eq!(count(&log, "app.restart"), 0);
    assert_eq!(count(&log, "device.restart_session"), 0);
}

#[test]
fn test_pass_fail_escalation_scenario() {
    // Suite with tests A (pass), B (fail), C, per the recovery policy:
    // before A nothing, before B an app restart (A passed), before C an app
    // restart that fails and escalates to a session restart.
    let log = new_call_log();
    let mut app = ScriptedApp::new(log.clone());
    // First restart (before B) succeeds, second (before C) fails.
    app.fail_restarts = VecDeque::from([false, true]);
    let mut orchestrator = suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        ScriptedDevice::new(log.clone()),
        app,
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();

    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.on_after_test(TestOutcome::Success);

    orchestrator.on_before_test("test_b").unwrap();
    assert_eq!(count(&log, "app.restart"), 1);
    assert_eq!(count(&log, "device.restart_session"), 0);
    orchestrator.on_after_test(TestOutcome::Failure);

    orchestrator.on_before_test("test_c").unwrap();
    assert_eq!(count(&log, "app.restart"), 2);
    assert_eq!(count(&log, "device.restart_session"), 1);

    // Suppression is one-shot: whatever follows C may recover again.
    assert!(orchestrator.context().should_restart_on_failure);
}

#[test]
fn test_failed_recovery_reports_escalation_path() {
    let log = new_call_log();
    let mut app = ScriptedApp::new(log.clone());
    app.fail_restarts = VecDeque::from([true]);
    let mut device = ScriptedDevice::new(log.clone());
    device.fail_restart_session = true;
    let mut orchestrator = suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        device,
        app,
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.on_after_test(TestOutcome::Failure);

    let err = orchestrator.on_before_test("test_b").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("app restart failed"));
    assert!(msg.contains("session restart also failed"));
}

#[test]
fn test_recovery_resets_navigation_to_last_page() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.attach_navigation_tracker(Box::new(ScriptedNavigationTracker::new(log.clone())));
    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.on_after_test(TestOutcome::Failure);
    orchestrator.on_before_test("test_b").unwrap();

    assert_eq!(count(&log, "navigation.reset_to_last_page"), 1);
    // Failure recovery goes to the last opened page, never home.
    assert_eq!(count(&log, "navigation.navigate_home"), 0);
}

#[test]
fn test_recovery_without_tracker_proceeds() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.on_after_test(TestOutcome::Failure);

    // No tracker attached: logged as a diagnostic, the test still runs.
    orchestrator.on_before_test("test_b").unwrap();
}

#[test]
fn test_skipped_test_triggers_no_recovery() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.on_after_test(TestOutcome::Skipped);
    orchestrator.on_before_test("test_b").unwrap();

    assert_eq!(count(&log, "app.restart"), 0);
    assert_eq!(count(&log, "device.restart_session"), 0);
}

#[test]
fn test_derived_comparison_names_within_one_test() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("home_page").unwrap();

    orchestrator.compare_screen(ComparisonRequest::screen()).unwrap();
    orchestrator.compare_screen(ComparisonRequest::screen()).unwrap();
    orchestrator.compare_screen(ComparisonRequest::screen()).unwrap();

    let seen: Vec<String> = calls(&log)
        .into_iter()
        .filter(|c| c.starts_with("compare:"))
        .collect();
    assert_eq!(
        seen,
        vec!["compare:home_page", "compare:home_page_2", "compare:home_page_3"]
    );
}

#[test]
fn test_assert_all_comparisons_lists_every_mismatch() {
    let log = new_call_log();
    let mut comparator = ScriptedComparator::new(log.clone());
    comparator.verdicts = VecDeque::from([false, true, false]);
    let mut orchestrator = suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        comparator,
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("list_view").unwrap();

    assert!(!orchestrator.compare_screen(ComparisonRequest::screen()).unwrap());
    assert!(orchestrator.compare_screen(ComparisonRequest::screen()).unwrap());
    assert!(!orchestrator.compare_screen(ComparisonRequest::screen()).unwrap());

    let err = orchestrator.assert_all_comparisons().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("list_view"));
    assert!(msg.contains("list_view_3"));
    assert!(!msg.contains("list_view_2"));
}

#[test]
fn test_assert_on_empty_store_is_vacuous_success() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.assert_all_comparisons().unwrap();
}

#[test]
fn test_clear_comparisons_starts_a_fresh_group() {
    let log = new_call_log();
    let mut comparator = ScriptedComparator::new(log.clone());
    comparator.verdicts = VecDeque::from([false, true]);
    let mut orchestrator = suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        comparator,
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("form_page").unwrap();

    orchestrator.compare_screen(ComparisonRequest::screen()).unwrap();
    orchestrator.clear_comparisons();

    // The dropped mismatch no longer fails the test, and derived naming
    // restarts from the bare test identifier.
    orchestrator.compare_screen(ComparisonRequest::screen()).unwrap();
    orchestrator.assert_all_comparisons().unwrap();

    let seen: Vec<String> = calls(&log)
        .into_iter()
        .filter(|c| c.starts_with("compare:"))
        .collect();
    assert_eq!(seen, vec!["compare:form_page", "compare:form_page"]);
}

#[test]
fn test_memory_over_limit_fails_test_and_updates_metric() {
    let log = new_call_log();
    let mut settings = Settings::defaults();
    settings.memory_max_usage_limit = 150;
    let mut device = ScriptedDevice::new(log.clone());
    device.memory_samples = VecDeque::from([Some(200)]);
    let mut orchestrator = suite(
        settings,
        ScriptedServer::new(log.clone()),
        device,
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("heavy_test").unwrap();
    let record = orchestrator.on_after_test(TestOutcome::Success);

    assert_eq!(record.outcome, TestOutcome::Failure);
    assert_eq!(record.memory_used_mb, Some(200));
    let diagnostics = record.diagnostics.join(" ");
    assert!(diagnostics.contains("200"));
    assert!(diagnostics.contains("150"));

    let report = orchestrator.suite_report();
    assert_eq!(report.max_memory_observed_mb, 200);
    assert_eq!(report.failed, 1);
}

#[test]
fn test_memory_under_limit_keeps_outcome() {
    let log = new_call_log();
    let mut settings = Settings::defaults();
    settings.memory_max_usage_limit = 150;
    let mut device = ScriptedDevice::new(log.clone());
    device.memory_samples = VecDeque::from([Some(120)]);
    let mut orchestrator = suite(
        settings,
        ScriptedServer::new(log.clone()),
        device,
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("light_test").unwrap();
    let record = orchestrator.on_after_test(TestOutcome::Success);

    assert_eq!(record.outcome, TestOutcome::Success);
    assert_eq!(record.memory_used_mb, Some(120));
}

#[test]
fn test_unavailable_memory_sample_never_fails_test() {
    let log = new_call_log();
    let mut settings = Settings::defaults();
    settings.memory_max_usage_limit = 150;
    let mut orchestrator = suite(
        settings,
        ScriptedServer::new(log.clone()),
        // Empty sample queue: every sample reports unavailable.
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    let record = orchestrator.on_after_test(TestOutcome::Success);

    assert_eq!(record.outcome, TestOutcome::Success);
    assert_eq!(record.memory_used_mb, None);
}

#[test]
fn test_memory_check_is_noop_on_ios() {
    let log = new_call_log();
    let mut settings = Settings::defaults();
    settings.platform = app_vision::Platform::Ios;
    settings.platform_version = 11.0;
    settings.memory_max_usage_limit = 150;
    let mut orchestrator = suite(
        settings,
        ScriptedServer::new(log.clone()),
        ScriptedDevice::new(log.clone()),
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    let record = orchestrator.on_after_test(TestOutcome::Success);

    assert_eq!(record.outcome, TestOutcome::Success);
    assert_eq!(count(&log, "device.memory_usage"), 0);
}

#[test]
fn test_suite_end_tears_down_in_order() {
    let log = new_call_log();
    let mut orchestrator = default_suite(&log);

    orchestrator.on_suite_start().unwrap();
    orchestrator.on_before_test("test_a").unwrap();
    orchestrator.on_after_test(TestOutcome::Success);
    let report = orchestrator.on_suite_end().unwrap();

    assert_eq!(report.passed, 1);
    let teardown: Vec<String> = calls(&log)
        .into_iter()
        .filter(|c| {
            matches!(
                c.as_str(),
                "device.end_session" | "device.stop" | "server.stop"
            )
        })
        .collect();
    assert_eq!(teardown, vec!["device.end_session", "device.stop", "server.stop"]);
}

#[test]
fn test_suite_end_teardown_is_best_effort() {
    let log = new_call_log();
    let mut device = ScriptedDevice::new(log.clone());
    device.fail_end_session = true;
    let mut orchestrator = suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        device,
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    let err = orchestrator.on_suite_end().unwrap_err();

    // The first failure is surfaced, but every later step still ran.
    assert!(err.to_string().contains("session teardown"));
    assert_eq!(count(&log, "device.stop"), 1);
    assert_eq!(count(&log, "server.stop"), 1);

    // The aggregate report stays reachable after a failed teardown.
    let report = orchestrator.suite_report();
    assert_eq!(report.records.len(), 0);
}

#[test]
fn test_suite_report_aggregates_outcomes() {
    let log = new_call_log();
    let mut device = ScriptedDevice::new(log.clone());
    device.memory_samples = VecDeque::from([Some(90), Some(140), Some(110)]);
    let mut orchestrator = suite(
        Settings::defaults(),
        ScriptedServer::new(log.clone()),
        device,
        ScriptedApp::new(log.clone()),
        ScriptedComparator::new(log.clone()),
    );

    orchestrator.on_suite_start().unwrap();
    for (name, outcome) in [
        ("test_a", TestOutcome::Success),
        ("test_b", TestOutcome::Failure),
        ("test_c", TestOutcome::Success),
    ] {
        orchestrator.on_before_test(name).unwrap();
        orchestrator.on_after_test(outcome);
    }
    let report = orchestrator.on_suite_end().unwrap();

    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.max_memory_observed_mb, 140);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[1].name, "test_b");
}
