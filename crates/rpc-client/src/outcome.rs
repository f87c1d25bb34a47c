//! Success/failure verdict for a single call.

use serde::{Deserialize, Serialize};

/// Outcome of one remote call, derived solely from the HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Success,
    Failure,
}

impl CallOutcome {
    /// Classify a status code. `[400, 600)` is a failure, every other code a success.
    pub fn from_status(status: u16) -> Self {
        if (400..600).contains(&status) {
            CallOutcome::Failure
        } else {
            CallOutcome::Success
        }
    }

    pub fn is_success(self) -> bool {
        self == CallOutcome::Success
    }

    pub fn is_failure(self) -> bool {
        self == CallOutcome::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_and_server_errors_fail() {
        for status in [400, 401, 404, 429, 499, 500, 502, 503, 599] {
            assert_eq!(CallOutcome::from_status(status), CallOutcome::Failure, "{status}");
        }
    }

    #[test]
    fn test_other_codes_succeed() {
        for status in [100, 200, 201, 204, 301, 304, 399, 600, 601, 999] {
            assert_eq!(CallOutcome::from_status(status), CallOutcome::Success, "{status}");
        }
    }

    #[test]
    fn test_boundaries() {
        assert!(CallOutcome::from_status(399).is_success());
        assert!(CallOutcome::from_status(400).is_failure());
        assert!(CallOutcome::from_status(599).is_failure());
        assert!(CallOutcome::from_status(600).is_success());
    }
}
