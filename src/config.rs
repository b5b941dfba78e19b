//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for App Vision, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for local emulator runs
//! - Plain-field construction for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_VISION_PLATFORM` | Target platform (`android` or `ios`) | `android` |
//! | `APP_VISION_PLATFORM_VERSION` | Platform version | `10.0` |
//! | `APP_VISION_AUTOMATION_NAME` | Automation driver name | `Appium` |
//! | `APP_VISION_DEVICE_NAME` | Device/emulator name | `Emulator-Api28-Default` |
//! | `APP_VISION_DEVICE_ID` | Device identifier (udid) | `emulator-5554` |
//! | `APP_VISION_REAL_DEVICE` | Run against a physical device | `false` |
//! | `APP_VISION_APP_ID` | Application (package/bundle) id | `org.nativescript.testapp` |
//! | `APP_VISION_APP_PATH` | Path to the app bundle under test | `testapp/testapp.apk` |
//! | `APP_VISION_RESTART_APP` | Restart the app after each passing test | `true` |
//! | `APP_VISION_MEMORY_LIMIT` | Max allowed app memory in MB (0 disables) | `0` |
//! | `APP_VISION_BOOT_TIMEOUT` | Device boot timeout in seconds | `300` |
//! | `APP_VISION_DEFAULT_TIMEOUT` | Default driver call timeout in seconds | `30` |
//! | `APP_VISION_DEBUG` | Debug mode (stretched command timeouts) | `false` |
//!
//! # Example
//!
//! ```bash
//! # Run the suite against a physical iOS device
//! export APP_VISION_PLATFORM="ios"
//! export APP_VISION_REAL_DEVICE="true"
//! export APP_VISION_DEVICE_ID="0000-1111-2222"
//! export APP_VISION_MEMORY_LIMIT="150"
//! ```

use std::env;

// ============================================================================
// Default Values
// ============================================================================

/// Default target platform
pub const DEFAULT_PLATFORM: Platform = Platform::Android;

/// Default platform version
pub const DEFAULT_PLATFORM_VERSION: f64 = 10.0;

/// Default automation driver name
pub const DEFAULT_AUTOMATION_NAME: &str = "Appium";

/// Default device/emulator name
pub const DEFAULT_DEVICE_NAME: &str = "Emulator-Api28-Default";

/// Default device identifier
pub const DEFAULT_DEVICE_ID: &str = "emulator-5554";

/// Default application id under test
pub const DEFAULT_APP_ID: &str = "org.nativescript.testapp";

/// Default app bundle path
pub const DEFAULT_APP_PATH: &str = "testapp/testapp.apk";

/// Default device boot timeout (seconds)
pub const DEFAULT_BOOT_TIMEOUT: u64 = 300;

/// Default driver call timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default wait before a screenshot capture (milliseconds)
pub const DEFAULT_WAIT_BEFORE_CAPTURE_MS: u64 = 1000;

/// Pixel tolerance meaning "unbounded" (pixel-count check disabled)
pub const MAX_PIXEL_TOLERANCE: u32 = u32::MAX;

/// Default percent tolerance for element comparisons
pub const MIN_PERCENT_TOLERANCE: f64 = 0.001;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the target platform
pub const ENV_PLATFORM: &str = "APP_VISION_PLATFORM";

/// Environment variable for the platform version
pub const ENV_PLATFORM_VERSION: &str = "APP_VISION_PLATFORM_VERSION";

/// Environment variable for the automation driver name
pub const ENV_AUTOMATION_NAME: &str = "APP_VISION_AUTOMATION_NAME";

/// Environment variable for the device name
pub const ENV_DEVICE_NAME: &str = "APP_VISION_DEVICE_NAME";

/// Environment variable for the device identifier
pub const ENV_DEVICE_ID: &str = "APP_VISION_DEVICE_ID";

/// Environment variable for the real-device flag
pub const ENV_REAL_DEVICE: &str = "APP_VISION_REAL_DEVICE";

/// Environment variable for the app id
pub const ENV_APP_ID: &str = "APP_VISION_APP_ID";

/// Environment variable for the app bundle path
pub const ENV_APP_PATH: &str = "APP_VISION_APP_PATH";

/// Environment variable for restart-app-between-tests
pub const ENV_RESTART_APP: &str = "APP_VISION_RESTART_APP";

/// Environment variable for the memory usage limit (MB)
pub const ENV_MEMORY_LIMIT: &str = "APP_VISION_MEMORY_LIMIT";

/// Environment variable for the device boot timeout
pub const ENV_BOOT_TIMEOUT: &str = "APP_VISION_BOOT_TIMEOUT";

/// Environment variable for the default driver timeout
pub const ENV_DEFAULT_TIMEOUT: &str = "APP_VISION_DEFAULT_TIMEOUT";

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "APP_VISION_DEBUG";

// ============================================================================
// Settings
// ============================================================================

/// Target mobile platform.
///
/// Memory introspection is only available on Android; on iOS the per-test
/// health check is a documented no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Parse a platform name (case-insensitive). Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "android" => Some(Platform::Android),
            "ios" => Some(Platform::Ios),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Android => write!(f, "Android"),
            Platform::Ios => write!(f, "iOS"),
        }
    }
}

/// Suite-wide settings for one test run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Target platform
    pub platform: Platform,
    /// Platform version (used for capability selection)
    pub platform_version: f64,
    /// Automation driver name
    pub automation_name: String,
    /// Device/emulator name
    pub device_name: String,
    /// Device identifier (udid)
    pub device_id: String,
    /// Whether the target is a physical device
    pub real_device: bool,
    /// Requested screen orientation, if any
    pub orientation: Option<String>,
    /// Application (package/bundle) id under test
    pub app_id: String,
    /// Path to the app bundle under test
    pub app_path: String,
    /// Debug mode: command timeouts are stretched to survive breakpoints
    pub debug: bool,
    /// Restart the app after each passing test
    pub restart_app_between_tests: bool,
    /// Max allowed app memory usage in MB; 0 disables the check
    pub memory_max_usage_limit: u64,
    /// Device boot timeout (seconds)
    pub device_boot_timeout: u64,
    /// Default driver call timeout (seconds)
    pub default_timeout: u64,
    /// Android-specific settings
    pub android: AndroidSettings,
    /// iOS-specific settings
    pub ios: IosSettings,
}

/// Android-specific settings.
#[derive(Debug, Clone)]
pub struct AndroidSettings {
    /// Activity launched when the app starts
    pub default_activity: String,
    /// Activity the driver waits for after launch
    pub app_wait_activity: String,
    /// Package the driver waits for after launch
    pub app_wait_package: String,
}

/// iOS-specific settings.
#[derive(Debug, Clone)]
pub struct IosSettings {
    /// Automatically accept system alerts
    pub accept_alerts: bool,
}

impl Settings {
    /// Create settings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::defaults();
        Self {
            platform: env::var(ENV_PLATFORM)
                .ok()
                .and_then(|s| Platform::parse(&s))
                .unwrap_or(DEFAULT_PLATFORM),
            platform_version: env::var(ENV_PLATFORM_VERSION)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PLATFORM_VERSION),
            automation_name: env::var(ENV_AUTOMATION_NAME)
                .unwrap_or_else(|_| DEFAULT_AUTOMATION_NAME.to_string()),
            device_name: env::var(ENV_DEVICE_NAME)
                .unwrap_or_else(|_| DEFAULT_DEVICE_NAME.to_string()),
            device_id: env::var(ENV_DEVICE_ID)
                .unwrap_or_else(|_| DEFAULT_DEVICE_ID.to_string()),
            real_device: env::var(ENV_REAL_DEVICE)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            app_id: env::var(ENV_APP_ID).unwrap_or_else(|_| DEFAULT_APP_ID.to_string()),
            app_path: env::var(ENV_APP_PATH).unwrap_or_else(|_| DEFAULT_APP_PATH.to_string()),
            debug: env::var(ENV_DEBUG)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            restart_app_between_tests: env::var(ENV_RESTART_APP)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            memory_max_usage_limit: env::var(ENV_MEMORY_LIMIT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            device_boot_timeout: env::var(ENV_BOOT_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BOOT_TIMEOUT),
            default_timeout: env::var(ENV_DEFAULT_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT),
            ..defaults
        }
    }

    /// Create settings with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            platform: DEFAULT_PLATFORM,
            platform_version: DEFAULT_PLATFORM_VERSION,
            automation_name: DEFAULT_AUTOMATION_NAME.to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            real_device: false,
            orientation: None,
            app_id: DEFAULT_APP_ID.to_string(),
            app_path: DEFAULT_APP_PATH.to_string(),
            debug: false,
            restart_app_between_tests: true,
            memory_max_usage_limit: 0,
            device_boot_timeout: DEFAULT_BOOT_TIMEOUT,
            default_timeout: DEFAULT_TIMEOUT,
            android: AndroidSettings::defaults(),
            ios: IosSettings::defaults(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl AndroidSettings {
    /// Create Android settings with defaults
    pub fn defaults() -> Self {
        Self {
            default_activity: "com.tns.NativeScriptActivity".to_string(),
            app_wait_activity: "com.tns.NativeScriptActivity".to_string(),
            app_wait_package: DEFAULT_APP_ID.to_string(),
        }
    }
}

impl IosSettings {
    /// Create iOS settings with defaults
    pub fn defaults() -> Self {
        Self {
            accept_alerts: false,
        }
    }
}
