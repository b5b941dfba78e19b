use crate::capabilities::CapabilityError;
use crate::driver::DriverError;
use crate::verify::CompareError;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Error types for harness operations
#[derive(Debug)]
pub enum HarnessError {
    /// Server/device/session could not be created even after one retry.
    /// Fatal: aborts the suite.
    Provisioning(String),

    /// Between-test recovery failed: the app restart errored and, when
    /// attempted, the session restart did too. Aborts the affected test.
    Recovery {
        app_restart: DriverError,
        session_restart: Option<DriverError>,
    },

    /// App memory usage exceeded the configured limit. Fails the current
    /// test only.
    ResourceLimit { used_mb: u64, limit_mb: u64 },

    /// One or more recorded visual comparisons did not match.
    ComparisonMismatch(Vec<String>),

    /// The comparator itself failed (capture, baseline, timeout)
    Comparison(CompareError),

    /// A driver call failed outside recovery
    Driver(DriverError),

    /// Capability construction failed
    Capability(CapabilityError),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::Provisioning(msg) => write!(f, "Provisioning failed: {}", msg),
            HarnessError::Recovery {
                app_restart,
                session_restart,
            } => {
                write!(f, "Recovery failed: app restart failed ({})", app_restart)?;
                if let Some(err) = session_restart {
                    write!(f, ", session restart also failed ({})", err)?;
                }
                Ok(())
            }
            HarnessError::ResourceLimit { used_mb, limit_mb } => write!(
                f,
                "Used memory of {} MB is more than expected {} MB",
                used_mb, limit_mb
            ),
            HarnessError::ComparisonMismatch(names) => write!(
                f,
                "The test failed - {} does not match the actual image",
                names.join(", ")
            ),
            HarnessError::Comparison(err) => write!(f, "Comparison error: {}", err),
            HarnessError::Driver(err) => write!(f, "Driver error: {}", err),
            HarnessError::Capability(err) => write!(f, "Capability error: {}", err),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Comparison(err) => Some(err),
            HarnessError::Driver(err) => Some(err),
            HarnessError::Capability(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DriverError> for HarnessError {
    fn from(err: DriverError) -> Self {
        HarnessError::Driver(err)
    }
}

impl From<CompareError> for HarnessError {
    fn from(err: CompareError) -> Self {
        HarnessError::Comparison(err)
    }
}

impl From<CapabilityError> for HarnessError {
    fn from(err: CapabilityError) -> Self {
        HarnessError::Capability(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_limit_message_names_both_values() {
        let err = HarnessError::ResourceLimit {
            used_mb: 200,
            limit_mb: 150,
        };
        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("150"));
    }

    #[test]
    fn test_recovery_message_reports_escalation_path() {
        let err = HarnessError::Recovery {
            app_restart: DriverError::App("process gone".to_string()),
            session_restart: Some(DriverError::Session("driver unreachable".to_string())),
        };
        let msg = err.to_string();
        assert!(msg.contains("app restart failed"));
        assert!(msg.contains("session restart also failed"));
    }

    #[test]
    fn test_mismatch_message_lists_every_name() {
        let err = HarnessError::ComparisonMismatch(vec![
            "home_page".to_string(),
            "home_page_2".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("home_page"));
        assert!(msg.contains("home_page_2"));
    }
}
