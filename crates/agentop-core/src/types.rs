//! Shared types used across agentop crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Autoscaling version assumed until the first successful detection.
pub const DEFAULT_AUTOSCALING_VERSION: AutoscalingVersion = AutoscalingVersion::V2;

/// Availability of the OpenShift Routes API in the cluster.
///
/// Tri-state so that "not yet known" can be told apart from a negative
/// detection result. Serialized through its text form, so anything
/// [`FromStr`] accepts also deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoutesAvailability {
    Unknown,
    Available,
    NotAvailable,
}

impl RoutesAvailability {
    /// Whether the routes API is known to be served.
    pub fn is_available(self) -> bool {
        self == RoutesAvailability::Available
    }

    /// Canonical text form.
    pub fn as_str(self) -> &'static str {
        match self {
            RoutesAvailability::Unknown => "Unknown",
            RoutesAvailability::Available => "Available",
            RoutesAvailability::NotAvailable => "NotAvailable",
        }
    }
}

impl From<bool> for RoutesAvailability {
    fn from(available: bool) -> Self {
        if available {
            RoutesAvailability::Available
        } else {
            RoutesAvailability::NotAvailable
        }
    }
}

impl fmt::Display for RoutesAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutesAvailability {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Ok(RoutesAvailability::Unknown),
            "available" | "true" => Ok(RoutesAvailability::Available),
            "notavailable" | "not-available" | "not_available" | "false" => {
                Ok(RoutesAvailability::NotAvailable)
            }
            _ => Err(ParseError::RoutesAvailability(s.to_string())),
        }
    }
}

impl TryFrom<String> for RoutesAvailability {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RoutesAvailability> for String {
    fn from(routes: RoutesAvailability) -> Self {
        routes.as_str().to_string()
    }
}

/// Preferred version of the horizontal pod autoscaling API.
///
/// Serialized as `autoscaling/<version>`; deserialization accepts the same
/// forms as [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AutoscalingVersion {
    V1,
    V2Beta1,
    V2Beta2,
    V2,
    Unknown,
}

impl AutoscalingVersion {
    /// Fully-qualified API group/version, e.g. `autoscaling/v2beta2`.
    pub fn as_str(self) -> &'static str {
        match self {
            AutoscalingVersion::V1 => "autoscaling/v1",
            AutoscalingVersion::V2Beta1 => "autoscaling/v2beta1",
            AutoscalingVersion::V2Beta2 => "autoscaling/v2beta2",
            AutoscalingVersion::V2 => "autoscaling/v2",
            AutoscalingVersion::Unknown => "unknown",
        }
    }
}

impl Default for AutoscalingVersion {
    fn default() -> Self {
        DEFAULT_AUTOSCALING_VERSION
    }
}

impl fmt::Display for AutoscalingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoscalingVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let version = normalized
            .strip_prefix("autoscaling/")
            .unwrap_or(&normalized);
        match version {
            "v1" => Ok(AutoscalingVersion::V1),
            "v2beta1" => Ok(AutoscalingVersion::V2Beta1),
            "v2beta2" => Ok(AutoscalingVersion::V2Beta2),
            "v2" => Ok(AutoscalingVersion::V2),
            "unknown" => Ok(AutoscalingVersion::Unknown),
            _ => Err(ParseError::AutoscalingVersion(s.to_string())),
        }
    }
}

impl TryFrom<String> for AutoscalingVersion {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AutoscalingVersion> for String {
    fn from(version: AutoscalingVersion) -> Self {
        version.as_str().to_string()
    }
}

/// Everything the operator learns about its environment in one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedState {
    pub routes: RoutesAvailability,
    pub autoscaling_version: AutoscalingVersion,
}

impl Default for DetectedState {
    /// Routes start out as `NotAvailable` until a probe says otherwise.
    fn default() -> Self {
        Self {
            routes: RoutesAvailability::NotAvailable,
            autoscaling_version: DEFAULT_AUTOSCALING_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid routes availability: {0:?}")]
    RoutesAvailability(String),

    #[error("invalid autoscaling version: {0:?}")]
    AutoscalingVersion(String),
}
