//! Domain error kinds for the decoy service.
//!
//! None of these ever reach the host as a failure: command paths convert them
//! into a response message, and configuration coercion swallows
//! `MalformedConfigValue` after logging it.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeListError {
    /// The host dispatch table could not be located or has an unsupported shape.
    HostApiUnsupported { reason: String },
    /// The caller lacks the permission named here.
    PermissionDenied { permission: String },
    NotFound { what: String },
    /// A configuration field had the wrong type and was replaced by its default.
    MalformedConfigValue { key: String, expected: &'static str },
    /// The configuration source could not be read.
    ConfigUnavailable { reason: String },
    /// The dispatch table refused to bind a label.
    InstallRejected { label: String, reason: String },
}

impl fmt::Display for FakeListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FakeListError::HostApiUnsupported { reason } => {
                write!(f, "host dispatch table unavailable: {reason}")
            }
            FakeListError::PermissionDenied { permission } => {
                write!(f, "missing permission {permission}")
            }
            FakeListError::NotFound { what } => write!(f, "{what} not found"),
            FakeListError::MalformedConfigValue { key, expected } => {
                write!(f, "config value '{key}' is not a valid {expected}")
            }
            FakeListError::ConfigUnavailable { reason } => {
                write!(f, "unable to read configuration: {reason}")
            }
            FakeListError::InstallRejected { label, reason } => {
                write!(f, "dispatch table rejected /{label}: {reason}")
            }
        }
    }
}

impl std::error::Error for FakeListError {}

impl From<anyhow::Error> for FakeListError {
    fn from(err: anyhow::Error) -> Self {
        FakeListError::ConfigUnavailable {
            reason: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_item() {
        let err = FakeListError::InstallRejected {
            label: "plugins".to_string(),
            reason: "locked".to_string(),
        };
        assert_eq!(err.to_string(), "dispatch table rejected /plugins: locked");

        let err = FakeListError::MalformedConfigValue {
            key: "random_order".to_string(),
            expected: "boolean",
        };
        assert!(err.to_string().contains("random_order"));
    }

    #[test]
    fn anyhow_errors_become_config_unavailable() {
        let err: FakeListError = anyhow::anyhow!("disk gone").context("reading config").into();
        match err {
            FakeListError::ConfigUnavailable { reason } => {
                assert!(reason.contains("reading config"));
                assert!(reason.contains("disk gone"));
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }
}
