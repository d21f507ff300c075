// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, NetrecError};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Deserialize,
    Serialize,
)]
#[repr(usize)]
#[serde(rename_all = "lowercase")]
pub enum NetrecLogLevel {
    Off = 0,
    Error = 1,
    #[default]
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl NetrecLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Raise the level by `count` steps, saturating at [Self::Trace].
    pub fn increase(self, count: u8) -> Self {
        let level = (self as usize).saturating_add(count as usize);
        match level {
            0 => Self::Off,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl From<log::LevelFilter> for NetrecLogLevel {
    fn from(d: log::LevelFilter) -> Self {
        match d {
            log::LevelFilter::Off => Self::Off,
            log::LevelFilter::Error => Self::Error,
            log::LevelFilter::Warn => Self::Warn,
            log::LevelFilter::Info => Self::Info,
            log::LevelFilter::Debug => Self::Debug,
            log::LevelFilter::Trace => Self::Trace,
        }
    }
}

impl From<NetrecLogLevel> for log::LevelFilter {
    fn from(v: NetrecLogLevel) -> Self {
        match v {
            NetrecLogLevel::Off => Self::Off,
            NetrecLogLevel::Error => Self::Error,
            NetrecLogLevel::Warn => Self::Warn,
            NetrecLogLevel::Info => Self::Info,
            NetrecLogLevel::Debug => Self::Debug,
            NetrecLogLevel::Trace => Self::Trace,
        }
    }
}

impl std::fmt::Display for NetrecLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NetrecLogLevel {
    type Err = NetrecError;

    fn from_str(s: &str) -> Result<Self, NetrecError> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!("Invalid logging level {s}"),
            )),
        }
    }
}
