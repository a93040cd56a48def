//! Materialization state of a registered instance.

use super::ParseHandleStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Materialization state of a registered mail transport instance.
///
/// `Ready` and `Failed` are terminal for the lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    /// Registered, but no lookup has asked for it yet.
    Unmaterialized,
    /// Construction and verification are in flight.
    Materializing,
    /// Verified and usable.
    Ready,
    /// Construction or verification failed.
    Failed,
}

impl HandleState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmaterialized => "unmaterialized",
            Self::Materializing => "materializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    /// Returns whether no further transition can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for HandleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HandleState {
    type Error = ParseHandleStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unmaterialized" => Ok(Self::Unmaterialized),
            "materializing" => Ok(Self::Materializing),
            "ready" => Ok(Self::Ready),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseHandleStateError(value.to_owned())),
        }
    }
}
