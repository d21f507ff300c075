// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{JsonDisplay, Operation};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Please report this as bug to upstream
    Bug,
    /// Desired state is malformed or semantically invalid. Nothing changed.
    ValidationError,
    /// Failed to create or commit the checkpoint. Nothing changed.
    CheckpointError,
    /// Checkpoint lease expired and backend already reverted the changes
    CheckpointExpired,
    /// Backend failed to execute an operation. Changes were rolled back.
    ApplyError,
    /// Post applied state does not match with desired state. Changes were
    /// rolled back.
    VerificationError,
    /// Failed to restore the pre-apply state. Network state is unknown.
    RollbackError,
    /// Another apply is in progress
    Busy,
    /// Timeout
    Timeout,
    /// Apply cancelled by caller. Changes were rolled back.
    Cancelled,
}

impl ErrorKind {
    /// Whether network state might be left in unknown condition.
    pub fn is_fatal(&self) -> bool {
        *self == Self::RollbackError
    }
}

/// Single field found different between desired state and post-apply state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct VerificationMismatch {
    /// Path to the property, e.g. `interfaces[eth1].ipv4.address`
    pub path: String,
    pub desired: serde_json::Value,
    pub current: serde_json::Value,
}

impl VerificationMismatch {
    pub fn new(
        path: String,
        desired: serde_json::Value,
        current: serde_json::Value,
    ) -> Self {
        Self {
            path,
            desired,
            current,
        }
    }
}

// Try not implement From for NetrecError here unless you are sure this
// error should always convert to certain type of ErrorKind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct NetrecError {
    pub kind: ErrorKind,
    pub msg: String,
    /// The operation which backend failed to execute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Box<Operation>>,
    /// Properties failed verification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<VerificationMismatch>,
}

impl std::fmt::Display for NetrecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl NetrecError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self {
            kind,
            msg,
            operation: None,
            mismatches: Vec::new(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_deref()
    }

    pub fn mismatches(&self) -> &[VerificationMismatch] {
        self.mismatches.as_slice()
    }

    pub(crate) fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(Box::new(operation));
        self
    }

    pub(crate) fn with_mismatches(
        mut self,
        mismatches: Vec<VerificationMismatch>,
    ) -> Self {
        self.mismatches = mismatches;
        self
    }
}

impl std::error::Error for NetrecError {}

impl From<serde_json::Error> for NetrecError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Bug, format!("serde_json::Error: {e}"))
    }
}

impl From<std::io::Error> for NetrecError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Bug, format!("std::io::Error: {e}"))
    }
}

impl From<std::net::AddrParseError> for NetrecError {
    fn from(e: std::net::AddrParseError) -> Self {
        Self::new(
            ErrorKind::ValidationError,
            format!("Invalid IP address: {e}"),
        )
    }
}

impl From<serde_yaml::Error> for NetrecError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::new(
            ErrorKind::ValidationError,
            format!("Invalid YAML string: {e}"),
        )
    }
}
