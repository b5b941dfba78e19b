//! Visual baseline verification.
//!
//! Tests describe one comparison with a [`ComparisonRequest`] (screen or
//! element scope, tolerances, capture timing), hand it to the orchestrator,
//! and get a boolean verdict back. Verdicts accumulate in a per-test
//! [`VerdictStore`] so a test can run several comparisons and assert them
//! all at once at the end.
//!
//! The pixel-level work lives behind the [`VisualComparator`] trait; this
//! module only names comparisons and aggregates their results.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{DEFAULT_WAIT_BEFORE_CAPTURE_MS, MAX_PIXEL_TOLERANCE, MIN_PERCENT_TOLERANCE};

/// Result type for comparator operations
pub type CompareResult<T> = Result<T, CompareError>;

/// Errors raised by a [`VisualComparator`]
#[derive(Debug)]
pub enum CompareError {
    /// Screenshot capture failed
    Capture(String),

    /// No baseline image exists for the given name
    MissingBaseline(String),

    /// An element comparison was issued without a region
    MissingRegion,

    /// The capture/poll loop exceeded its timeout
    Timeout(Duration),
}

impl std::fmt::Display for CompareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareError::Capture(msg) => write!(f, "Capture error: {}", msg),
            CompareError::MissingBaseline(name) => write!(f, "No baseline image for {}", name),
            CompareError::MissingRegion => {
                write!(f, "Element comparison issued without an element region")
            }
            CompareError::Timeout(d) => write!(f, "Comparison timed out after {:?}", d),
        }
    }
}

impl std::error::Error for CompareError {}

/// Rendered region of a single UI element on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ElementRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// One visual comparison against a saved baseline.
///
/// Construct with [`ComparisonRequest::screen`] or
/// [`ComparisonRequest::element`] and override individual fields with the
/// builder methods; every tunable has an explicit default so callers only
/// state what differs:
/// - wait before capture: 1000 ms
/// - pixel tolerance: unbounded (pixel-count check disabled)
/// - percent tolerance: 0.0 for screens, 0.001 for elements
///
/// Immutable once handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    /// Explicit comparison name; derived from the test identifier when
    /// omitted
    pub name: Option<String>,
    /// Element region to compare; whole screen when `None`
    pub element: Option<ElementRegion>,
    /// Staleness/poll timeout for the capture loop (seconds)
    pub timeout: u64,
    /// Sleep before the capture is taken (milliseconds)
    pub wait_before_capture_ms: u64,
    /// Max number of differing pixels tolerated
    pub pixel_tolerance: u32,
    /// Max fraction of differing pixels tolerated
    pub percent_tolerance: f64,
}

impl ComparisonRequest {
    /// Compare the whole screen.
    pub fn screen() -> Self {
        Self {
            name: None,
            element: None,
            timeout: 1,
            wait_before_capture_ms: DEFAULT_WAIT_BEFORE_CAPTURE_MS,
            pixel_tolerance: MAX_PIXEL_TOLERANCE,
            percent_tolerance: 0.0,
        }
    }

    /// Compare one element's rendered region.
    pub fn element(region: ElementRegion) -> Self {
        Self {
            name: None,
            element: Some(region),
            timeout: 1,
            wait_before_capture_ms: DEFAULT_WAIT_BEFORE_CAPTURE_MS,
            pixel_tolerance: MAX_PIXEL_TOLERANCE,
            percent_tolerance: MIN_PERCENT_TOLERANCE,
        }
    }

    /// Set an explicit comparison name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the capture/poll timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the sleep before capture in milliseconds.
    pub fn wait_before_capture(mut self, millis: u64) -> Self {
        self.wait_before_capture_ms = millis;
        self
    }

    /// Set the pixel-count tolerance.
    pub fn pixel_tolerance(mut self, pixels: u32) -> Self {
        self.pixel_tolerance = pixels;
        self
    }

    /// Set the percentage tolerance.
    pub fn percent_tolerance(mut self, fraction: f64) -> Self {
        self.percent_tolerance = fraction;
        self
    }
}

/// Compares a capture against a saved baseline image.
pub trait VisualComparator {
    /// Run one comparison under the resolved `name` and report whether the
    /// capture matches the baseline within the request's tolerances.
    fn compare(&mut self, name: &str, request: &ComparisonRequest) -> CompareResult<bool>;
}

/// Per-test map from comparison name to verdict.
///
/// Names derived from the test identifier are disambiguated with an
/// incrementing counter (`T`, `T_2`, `T_3`, ...). The counter advances on
/// every recorded comparison, named or not, so derived names stay unique
/// even when explicit names are mixed in. Explicit-name collisions are
/// last-write-wins.
#[derive(Debug, Default)]
pub struct VerdictStore {
    results: HashMap<String, bool>,
    counter: u32,
}

impl VerdictStore {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            counter: 1,
        }
    }

    /// Resolve the name one comparison will be recorded under.
    pub fn resolve_name(&self, explicit: Option<&str>, test_name: &str) -> String {
        match explicit {
            Some(name) => name.to_string(),
            None if self.counter <= 1 => test_name.to_string(),
            None => format!("{}_{}", test_name, self.counter),
        }
    }

    /// Record a verdict and advance the naming counter.
    pub fn record(&mut self, name: String, verdict: bool) {
        self.results.insert(name, verdict);
        self.counter += 1;
    }

    /// Whether any comparisons have been recorded.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Names of every comparison whose verdict is false, sorted for stable
    /// failure messages.
    pub fn failing_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .results
            .iter()
            .filter(|(_, verdict)| !**verdict)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Empty the store and reset the naming counter.
    pub fn clear(&mut self) {
        self.results.clear();
        self.counter = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_derived_names_are_disambiguated() {
        let mut store = VerdictStore::new();

        let first = store.resolve_name(None, "home_page");
        store.record(first.clone(), true);
        let second = store.resolve_name(None, "home_page");
        store.record(second.clone(), true);
        let third = store.resolve_name(None, "home_page");
        store.record(third.clone(), true);

        assert_eq!(first, "home_page");
        assert_eq!(second, "home_page_2");
        assert_eq!(third, "home_page_3");
    }

    #[test]
    fn test_explicit_name_advances_counter() {
        let mut store = VerdictStore::new();

        let named = store.resolve_name(Some("login_button"), "login_test");
        store.record(named, true);
        let derived = store.resolve_name(None, "login_test");

        assert_eq!(derived, "login_test_2");
    }

    #[test]
    fn test_explicit_name_collision_is_last_write_wins() {
        let mut store = VerdictStore::new();

        store.record("banner".to_string(), false);
        store.record("banner".to_string(), true);

        assert!(store.failing_names().is_empty());
    }

    #[test]
    fn test_failing_names_collects_all_mismatches_sorted() {
        let mut store = VerdictStore::new();

        store.record("zebra".to_string(), false);
        store.record("apple".to_string(), false);
        store.record("mango".to_string(), true);

        assert_eq!(store.failing_names(), vec!["apple", "zebra"]);
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut store = VerdictStore::new();

        store.record(store.resolve_name(None, "t"), true);
        store.record(store.resolve_name(None, "t"), true);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.resolve_name(None, "t"), "t");
    }

    #[test]
    fn test_screen_request_defaults() {
        let request = ComparisonRequest::screen();
        assert_eq!(request.wait_before_capture_ms, DEFAULT_WAIT_BEFORE_CAPTURE_MS);
        assert_eq!(request.pixel_tolerance, MAX_PIXEL_TOLERANCE);
        assert_eq!(request.percent_tolerance, 0.0);
        assert!(request.element.is_none());
    }

    #[test]
    fn test_element_request_defaults() {
        let request = ComparisonRequest::element(ElementRegion::new(0, 0, 100, 40));
        assert_eq!(request.percent_tolerance, MIN_PERCENT_TOLERANCE);
        assert!(request.element.is_some());
    }

    #[test]
    fn test_request_builder_overrides() {
        let request = ComparisonRequest::screen()
            .name("settings_page")
            .timeout(5)
            .wait_before_capture(250)
            .pixel_tolerance(30)
            .percent_tolerance(0.01);

        assert_eq!(request.name.as_deref(), Some("settings_page"));
        assert_eq!(request.timeout, 5);
        assert_eq!(request.wait_before_capture_ms, 250);
        assert_eq!(request.pixel_tolerance, 30);
        assert_eq!(request.percent_tolerance, 0.01);
    }
}
