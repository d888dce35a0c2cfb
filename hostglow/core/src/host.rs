//! Host Records
//!
//! The monitoring-side view of a host: its health state as reported by the
//! status source, and the record the differ builds for each poll cycle.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Health state reported for a host
///
/// The ordering follows severity codes, so `state > HostState::Ok` means
/// "some problem", including `Unknown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostState {
    /// Host is healthy (code 0)
    #[default]
    Ok,
    /// Host is degraded (code 1)
    Warn,
    /// Host is down or critical (code 2)
    Crit,
    /// State could not be determined (code 3, and any unrecognized code)
    Unknown,
}

impl HostState {
    /// Map a raw state code to a state
    ///
    /// Codes outside `0..=3` are treated as `Unknown`.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Warn,
            2 => Self::Crit,
            _ => Self::Unknown,
        }
    }

    /// Numeric code used by the plain export format
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warn => 1,
            Self::Crit => 2,
            Self::Unknown => 3,
        }
    }

    /// Short uppercase label for logs
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Crit => "CRIT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether this state counts as a problem
    #[must_use]
    pub fn is_problem(self) -> bool {
        self > Self::Ok
    }
}

impl std::fmt::Display for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single (name, state) pair as returned by a status source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostObservation {
    /// Host name, unique within one poll
    pub name: String,
    /// Reported state
    pub state: HostState,
}

impl HostObservation {
    /// Create an observation
    pub fn new(name: impl Into<String>, state: HostState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// A host as placed on the grid for the current poll cycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Host name
    pub name: String,
    /// Current state
    pub state: HostState,
    /// Position in priority order; doubles as the output cell index
    pub cell_index: usize,
    /// Category color derived from the host name
    pub category_color: Rgb,
    /// Priority class (0 = most important)
    pub priority: u8,
}

/// Plain export entry: `{"name": ..., "state": 0..3}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostExport {
    /// Host name
    pub name: String,
    /// State code
    pub state: u8,
}

impl From<&HostRecord> for HostExport {
    fn from(record: &HostRecord) -> Self {
        Self {
            name: record.name.clone(),
            state: record.state.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_maps_out_of_range_to_unknown() {
        assert_eq!(HostState::from_code(0), HostState::Ok);
        assert_eq!(HostState::from_code(1), HostState::Warn);
        assert_eq!(HostState::from_code(2), HostState::Crit);
        assert_eq!(HostState::from_code(3), HostState::Unknown);
        assert_eq!(HostState::from_code(7), HostState::Unknown);
        assert_eq!(HostState::from_code(-1), HostState::Unknown);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(HostState::Warn.is_problem());
        assert!(HostState::Unknown.is_problem());
        assert!(!HostState::Ok.is_problem());
        assert!(HostState::Crit > HostState::Warn);
    }

    #[test]
    fn test_export_uses_codes() {
        let record = HostRecord {
            name: "db-server".to_string(),
            state: HostState::Crit,
            cell_index: 0,
            category_color: Rgb::BLACK,
            priority: 0,
        };
        let json = serde_json::to_string(&HostExport::from(&record)).unwrap();
        assert_eq!(json, r#"{"name":"db-server","state":2}"#);
    }
}
