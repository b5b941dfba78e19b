//! Scripted collaborators for exercising the orchestrator without real
//! devices.
//!
//! Each mock records its calls into a shared [`CallLog`] so tests can assert
//! on ordering across collaborators, and exposes a small script surface
//! (queued verdicts, queued memory samples, failure flags) to drive the
//! orchestrator down specific recovery paths.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::driver::{
    AppController, DeviceController, DriverError, DriverResult, NavigationTracker,
    ServerController,
};
use crate::verify::{CompareResult, ComparisonRequest, VisualComparator};

/// Shared, ordered record of every call made against the scripted
/// collaborators.
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Create an empty call log to share across mocks.
pub fn new_call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Scripted automation server.
pub struct ScriptedServer {
    log: CallLog,
    /// Report the server as not running on the first `start` call
    pub fail_first_start: bool,
    /// Error out of `restart`
    pub fail_restart: bool,
    /// Error out of `stop`
    pub fail_stop: bool,
}

impl ScriptedServer {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_first_start: false,
            fail_restart: false,
            fail_stop: false,
        }
    }
}

impl ServerController for ScriptedServer {
    fn start(&mut self) -> DriverResult<bool> {
        self.log.borrow_mut().push("server.start".to_string());
        if self.fail_first_start {
            self.fail_first_start = false;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    fn restart(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("server.restart".to_string());
        if self.fail_restart {
            Err(DriverError::Server("scripted restart failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn stop(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("server.stop".to_string());
        if self.fail_stop {
            Err(DriverError::Server("scripted stop failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Scripted device/session controller.
pub struct ScriptedDevice {
    log: CallLog,
    /// Memory samples returned in order; exhausted queue reports
    /// "unavailable"
    pub memory_samples: VecDeque<Option<u64>>,
    /// Error out of `restart_session`
    pub fail_restart_session: bool,
    /// Error out of `end_session`
    pub fail_end_session: bool,
    /// Error out of `stop_device`
    pub fail_stop_device: bool,
}

impl ScriptedDevice {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            memory_samples: VecDeque::new(),
            fail_restart_session: false,
            fail_end_session: false,
            fail_stop_device: false,
        }
    }
}

impl DeviceController for ScriptedDevice {
    fn boot_device(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("device.boot".to_string());
        Ok(())
    }

    fn create_session(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("device.create_session".to_string());
        Ok(())
    }

    fn restart_session(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("device.restart_session".to_string());
        if self.fail_restart_session {
            Err(DriverError::Session(
                "scripted session restart failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn memory_usage(&mut self, _app_id: &str) -> DriverResult<Option<u64>> {
        self.log.borrow_mut().push("device.memory_usage".to_string());
        Ok(self.memory_samples.pop_front().flatten())
    }

    fn end_session(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("device.end_session".to_string());
        if self.fail_end_session {
            Err(DriverError::Session(
                "scripted session teardown failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn stop_device(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("device.stop".to_string());
        if self.fail_stop_device {
            Err(DriverError::Device("scripted device stop failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Scripted app under test.
pub struct ScriptedApp {
    log: CallLog,
    /// Per-call failure script; exhausted queue means restarts succeed
    pub fail_restarts: VecDeque<bool>,
}

impl ScriptedApp {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_restarts: VecDeque::new(),
        }
    }
}

impl AppController for ScriptedApp {
    fn restart(&mut self) -> DriverResult<()> {
        self.log.borrow_mut().push("app.restart".to_string());
        if self.fail_restarts.pop_front().unwrap_or(false) {
            Err(DriverError::App(
                "scripted app restart failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Scripted visual comparator.
///
/// Logs each comparison as `compare:<name>` so tests can check derived
/// naming. Queued verdicts are returned in order; an exhausted queue
/// matches.
pub struct ScriptedComparator {
    log: CallLog,
    /// Verdicts returned in order
    pub verdicts: VecDeque<bool>,
}

impl ScriptedComparator {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            verdicts: VecDeque::new(),
        }
    }
}

impl VisualComparator for ScriptedComparator {
    fn compare(&mut self, name: &str, _request: &ComparisonRequest) -> CompareResult<bool> {
        self.log.borrow_mut().push(format!("compare:{}", name));
        Ok(self.verdicts.pop_front().unwrap_or(true))
    }
}

/// Scripted navigation-state tracker.
pub struct ScriptedNavigationTracker {
    log: CallLog,
    /// Error out of `reset_to_last_page`
    pub fail_reset: bool,
}

impl ScriptedNavigationTracker {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_reset: false,
        }
    }
}

impl NavigationTracker for ScriptedNavigationTracker {
    fn reset_to_last_page(&mut self) -> DriverResult<()> {
        self.log
            .borrow_mut()
            .push("navigation.reset_to_last_page".to_string());
        if self.fail_reset {
            Err(DriverError::App("scripted navigation failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn navigate_home(&mut self) -> DriverResult<()> {
        self.log
            .borrow_mut()
            .push("navigation.navigate_home".to_string());
        Ok(())
    }
}
