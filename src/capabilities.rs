//! Desired-capability construction for the automation driver.
//!
//! Builds the key/value capability map handed to the driver once at session
//! creation. Purely declarative: everything is derived from [`Settings`],
//! and the only failure mode is missing configuration.

use serde_json::{Map, Value, json};

use crate::config::{Platform, Settings};

/// Result type for capability construction
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors raised while building the capability map
#[derive(Debug)]
pub enum CapabilityError {
    /// A required settings field is empty
    MissingField(&'static str),
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityError::MissingField(field) => {
                write!(f, "Required setting `{}` is empty", field)
            }
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Build the capability map for the configured platform.
pub fn build_capabilities(settings: &Settings) -> CapabilityResult<Map<String, Value>> {
    let mut caps = common_capabilities(settings)?;

    match settings.platform {
        Platform::Android => {
            caps.insert("appPackage".to_string(), json!(settings.app_id));
            caps.insert(
                "appActivity".to_string(),
                json!(settings.android.default_activity),
            );
            caps.insert(
                "appWaitActivity".to_string(),
                json!(settings.android.app_wait_activity),
            );
            caps.insert(
                "appWaitPackage".to_string(),
                json!(settings.android.app_wait_package),
            );
            caps.insert("noSign".to_string(), json!(true));
        }
        Platform::Ios => {
            caps.insert(
                "autoAcceptAlerts".to_string(),
                json!(settings.ios.accept_alerts),
            );
            // Launch timeout is expressed in milliseconds.
            caps.insert(
                "launchTimeout".to_string(),
                json!(settings.device_boot_timeout * 1000),
            );
            caps.insert(
                "screenshotWaitTimeout".to_string(),
                json!(settings.default_timeout),
            );
            caps.insert("showIOSLog".to_string(), json!(true));

            // XCTest automation (iOS 10+) needs the udid even for simulators.
            if settings.platform_version >= 10.0 {
                caps.insert("udid".to_string(), json!(settings.device_id));
            }

            if settings.real_device {
                caps.insert("fullReset".to_string(), json!(true));
            }
        }
    }

    Ok(caps)
}

/// Capabilities shared by both platforms.
fn common_capabilities(settings: &Settings) -> CapabilityResult<Map<String, Value>> {
    if settings.app_id.is_empty() {
        return Err(CapabilityError::MissingField("app_id"));
    }
    if settings.app_path.is_empty() {
        return Err(CapabilityError::MissingField("app_path"));
    }
    if settings.device_name.is_empty() {
        return Err(CapabilityError::MissingField("device_name"));
    }

    let mut caps = Map::new();
    caps.insert(
        "automationName".to_string(),
        json!(settings.automation_name),
    );
    caps.insert(
        "platformName".to_string(),
        json!(settings.platform.to_string()),
    );
    caps.insert(
        "platformVersion".to_string(),
        json!(settings.platform_version),
    );
    caps.insert("deviceName".to_string(), json!(settings.device_name));

    // Stretch the command timeout under debug so the session survives
    // breakpoints.
    let mut new_command_timeout = settings.device_boot_timeout;
    if settings.debug {
        new_command_timeout *= 3;
    }
    caps.insert("newCommandTimeout".to_string(), json!(new_command_timeout));

    // Keep app state between sessions; recovery handles explicit restarts.
    caps.insert("noReset".to_string(), json!(true));
    caps.insert("fullReset".to_string(), json!(false));

    if let Some(orientation) = &settings.orientation {
        caps.insert("orientation".to_string(), json!(orientation));
    }

    if settings.real_device {
        caps.insert("udid".to_string(), json!(settings.device_id));
    }

    caps.insert("app".to_string(), json!(settings.app_path));

    Ok(caps)
}
