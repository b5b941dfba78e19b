//! Collaborator contracts for the automation stack.
//!
//! The orchestrator never talks to a device directly; it sequences calls
//! through these traits:
//! - [`ServerController`] for the automation server process
//! - [`DeviceController`] for the device/emulator and the driver session
//! - [`AppController`] for the app under test
//! - [`NavigationTracker`] for restoring known navigation state
//!
//! Every call blocks until the underlying process/driver call returns or
//! times out. None of these are safe to call concurrently for the same
//! session.

use std::time::Duration;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Error types for driver operations
#[derive(Debug)]
pub enum DriverError {
    /// Automation server process error
    Server(String),

    /// Device/emulator error
    Device(String),

    /// Driver session error
    Session(String),

    /// App under test error
    App(String),

    /// A driver call exceeded its timeout
    Timeout {
        /// Operation that timed out (e.g. "server start", "device boot")
        operation: String,
        /// Timeout that was exceeded
        timeout: Duration,
    },
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::Server(msg) => write!(f, "Server error: {}", msg),
            DriverError::Device(msg) => write!(f, "Device error: {}", msg),
            DriverError::Session(msg) => write!(f, "Session error: {}", msg),
            DriverError::App(msg) => write!(f, "App error: {}", msg),
            DriverError::Timeout { operation, timeout } => {
                write!(f, "Timed out after {:?} during {}", timeout, operation)
            }
        }
    }
}

impl std::error::Error for DriverError {}

/// Controls the automation server process.
pub trait ServerController {
    /// Start the server. `Ok(false)` means the process came up but the
    /// server is not responding; the caller decides whether to retry.
    fn start(&mut self) -> DriverResult<bool>;

    /// Kill and restart the server.
    fn restart(&mut self) -> DriverResult<()>;

    /// Stop the server.
    fn stop(&mut self) -> DriverResult<()>;
}

/// Controls the device/emulator and the automation session bound to it.
pub trait DeviceController {
    /// Boot the emulator/simulator or verify the physical device is attached.
    fn boot_device(&mut self) -> DriverResult<()>;

    /// Create the automation session (deploys the app under test).
    fn create_session(&mut self) -> DriverResult<()>;

    /// Tear down and re-create the automation session against the running
    /// device.
    fn restart_session(&mut self) -> DriverResult<()>;

    /// Sample the app's current memory usage in MB. `Ok(None)` means the
    /// platform reported the stats as unavailable.
    fn memory_usage(&mut self, app_id: &str) -> DriverResult<Option<u64>>;

    /// End the automation session without stopping the device.
    fn end_session(&mut self) -> DriverResult<()>;

    /// Stop the emulator/simulator.
    fn stop_device(&mut self) -> DriverResult<()>;
}

/// Controls the app under test.
pub trait AppController {
    /// Restart the app. Errors when the session or server backing it is
    /// dead.
    fn restart(&mut self) -> DriverResult<()>;
}

/// Tracks the app's navigation state so it can be restored after recovery.
pub trait NavigationTracker {
    /// Return to the last page that was open before the session was lost.
    fn reset_to_last_page(&mut self) -> DriverResult<()>;

    /// Navigate back to the app's home page.
    fn navigate_home(&mut self) -> DriverResult<()>;
}
