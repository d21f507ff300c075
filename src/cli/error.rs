// SPDX-License-Identifier: Apache-2.0

use netrec::NetrecError;

#[derive(Clone, Debug)]
pub(crate) struct CliError {
    msg: String,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for CliError {}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        Self {
            msg: format!("serde_yaml::Error: {e}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self {
            msg: format!("std::io::Error: {e}"),
        }
    }
}

impl From<NetrecError> for CliError {
    fn from(e: NetrecError) -> Self {
        let mut msg = format!("NetrecError: {e}");
        if let Some(op) = e.operation() {
            msg.push_str(&format!("\n  failed operation: {op}"));
        }
        for mismatch in e.mismatches() {
            msg.push_str(&format!(
                "\n  {}: desired {}, current {}",
                mismatch.path, mismatch.desired, mismatch.current
            ));
        }
        if e.kind().is_fatal() {
            msg.push_str("\n  network state might be left inconsistent");
        }
        Self { msg }
    }
}

impl From<&str> for CliError {
    fn from(msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
        }
    }
}

impl From<String> for CliError {
    fn from(msg: String) -> Self {
        Self { msg }
    }
}
