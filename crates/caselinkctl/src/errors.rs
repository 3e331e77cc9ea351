//! Error codes and exit status for caselinkctl

use caselink_common::CaseLinkError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when a form value or flag does not parse
pub const EXIT_INVALID_INPUT: i32 = 64;

/// Exit code when the scan service returns invalid JSON
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when the scan service refuses because a scan is running
pub const EXIT_SCAN_BUSY: i32 = 69;

/// Exit code when the scan service is unavailable/unreachable
pub const EXIT_BACKEND_UNAVAILABLE: i32 = 70;

/// Exit code for local file problems
pub const EXIT_IO_ERROR: i32 = 74;

/// Exit code for a broken client config file
pub const EXIT_CONFIG_ERROR: i32 = 78;

/// Map a command failure to its exit code
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let Some(err) = err.downcast_ref::<CaseLinkError>() else {
        if err.downcast_ref::<std::io::Error>().is_some() {
            return EXIT_IO_ERROR;
        }
        return EXIT_GENERAL_ERROR;
    };

    match err {
        CaseLinkError::Transport { .. } => EXIT_BACKEND_UNAVAILABLE,
        CaseLinkError::Busy(_) => EXIT_SCAN_BUSY,
        CaseLinkError::Decode(_) | CaseLinkError::Json(_) => EXIT_INVALID_RESPONSE,
        CaseLinkError::InvalidField { .. } => EXIT_INVALID_INPUT,
        CaseLinkError::Config(_) => EXIT_CONFIG_ERROR,
        CaseLinkError::Io(_) => EXIT_IO_ERROR,
        CaseLinkError::Status { .. } | CaseLinkError::NotFound(_) => EXIT_GENERAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn busy_service_maps_to_its_own_code() {
        let err = anyhow::Error::new(CaseLinkError::Busy("Scan already running".into()));
        assert_eq!(exit_code(&err), EXIT_SCAN_BUSY);
    }

    #[test]
    fn context_does_not_hide_the_root_cause() {
        let result: Result<(), CaseLinkError> = Err(CaseLinkError::Transport {
            url: "http://127.0.0.1:8000/scan/status".into(),
            message: "connection refused".into(),
        });
        let err = result.context("Failed to fetch status").unwrap_err();
        assert_eq!(exit_code(&err), EXIT_BACKEND_UNAVAILABLE);
    }

    #[test]
    fn unknown_errors_are_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&err), EXIT_GENERAL_ERROR);
        assert_ne!(EXIT_SUCCESS, EXIT_GENERAL_ERROR);
    }
}
