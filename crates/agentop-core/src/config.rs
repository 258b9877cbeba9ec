//! agentop.toml settings parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::types::AutoscalingVersion;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorSettings {
    pub autodetect: Option<AutodetectSettings>,
    pub images: Option<ImagesSettings>,
    pub labels_filter: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutodetectSettings {
    /// Detection interval, e.g. "5s", "500ms", "2m".
    pub interval: Option<String>,
    /// Version assumed until the first successful detection.
    pub autoscaling_version: Option<AutoscalingVersion>,
}

/// Auto-instrumentation container image per language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagesSettings {
    pub java: Option<String>,
    pub nodejs: Option<String>,
    pub python: Option<String>,
    pub dotnet: Option<String>,
    pub php: Option<String>,
    pub ruby: Option<String>,
    pub go: Option<String>,
}

impl OperatorSettings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let settings: OperatorSettings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured detection interval, if any.
    pub fn auto_detect_interval(&self) -> anyhow::Result<Option<Duration>> {
        let Some(raw) = self.autodetect.as_ref().and_then(|a| a.interval.as_deref()) else {
            return Ok(None);
        };
        parse_duration(raw)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("invalid autodetect interval: {raw:?}"))
    }

    /// Configured autoscaling version, if any.
    pub fn autoscaling_version(&self) -> Option<AutoscalingVersion> {
        self.autodetect.as_ref().and_then(|a| a.autoscaling_version)
    }

    /// Scaffold a settings file with the default detection options.
    pub fn scaffold() -> Self {
        OperatorSettings {
            autodetect: Some(AutodetectSettings {
                interval: Some("5s".to_string()),
                autoscaling_version: Some(AutoscalingVersion::default()),
            }),
            images: Some(ImagesSettings::default()),
            labels_filter: Some(Vec::new()),
        }
    }
}

/// Parse a duration string like "500ms", "5s" or "2m".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
