//! App Vision - Mobile UI test lifecycle orchestration with visual baseline
//! verification.
//!
//! This crate provides:
//! - Suite/test boundary hooks for a surrounding test runner
//! - Session recovery between tests (app restart, session restart, full
//!   re-provisioning) driven by the previous test's outcome
//! - A per-test visual comparison API with aggregated end-of-test assertion
//! - Per-test memory health checks and suite-level performance reporting
//! - Scripted collaborator mocks for testing without real devices
//!
//! # Example
//!
//! ```rust,no_run
//! use app_vision::{
//!     ComparisonRequest, LifecycleOrchestrator, Settings, TestOutcome,
//!     mock::{ScriptedApp, ScriptedComparator, ScriptedDevice, ScriptedServer, new_call_log},
//! };
//!
//! let log = new_call_log();
//! let mut suite = LifecycleOrchestrator::new(
//!     Settings::from_env(),
//!     Box::new(ScriptedServer::new(log.clone())),
//!     Box::new(ScriptedDevice::new(log.clone())),
//!     Box::new(ScriptedApp::new(log.clone())),
//!     Box::new(ScriptedComparator::new(log.clone())),
//! );
//!
//! suite.on_suite_start().unwrap();
//! suite.on_before_test("home_page").unwrap();
//! suite.compare_screen(ComparisonRequest::screen()).unwrap();
//! suite.assert_all_comparisons().unwrap();
//! suite.on_after_test(TestOutcome::Success);
//! suite.on_suite_end().unwrap();
//! ```

pub mod capabilities;
pub mod config;
pub mod driver;
pub mod harness;
pub mod mock;
pub mod recovery;
pub mod report;
pub mod verify;

// Re-export configuration types
pub use config::{AndroidSettings, IosSettings, Platform, Settings};

// Re-export capability construction
pub use capabilities::{CapabilityError, CapabilityResult, build_capabilities};

// Re-export collaborator contracts
pub use driver::{
    AppController, DeviceController, DriverError, DriverResult, NavigationTracker,
    ServerController,
};

// Re-export recovery policy types
pub use recovery::{RecoveryAction, TestOutcome, decide};

// Re-export verification types
pub use verify::{
    CompareError, CompareResult, ComparisonRequest, ElementRegion, VerdictStore, VisualComparator,
};

// Re-export reporting types
pub use report::{SuiteReport, TestRecord};

// Re-export the orchestrator
pub use harness::{HarnessError, HarnessResult, LifecycleOrchestrator, RunContext};
