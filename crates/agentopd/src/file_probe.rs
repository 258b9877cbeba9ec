//! Capability probe backed by a TOML file.
//!
//! The file is re-read on every query, so editing it while the daemon runs
//! is picked up on the next detection pass:
//!
//! ```toml
//! routes = "Available"
//! autoscaling_version = "autoscaling/v2"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use agentop_autodetect::{BoxFuture, CapabilityProbe, ProbeError, ProbeResult};
use agentop_core::{AutoscalingVersion, RoutesAvailability};

#[derive(Debug, Deserialize)]
struct CapabilitiesFile {
    routes: Option<String>,
    autoscaling_version: Option<String>,
}

/// [`CapabilityProbe`] reading its answers from a TOML file.
pub struct FileProbe {
    path: PathBuf,
}

impl FileProbe {
    /// Probe backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The capabilities file this probe reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> ProbeResult<CapabilitiesFile> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ProbeError::new(format!("{}: {e}", self.path.display())))?;
        toml::from_str(&content)
            .map_err(|e| ProbeError::new(format!("{}: {e}", self.path.display())))
    }

    async fn read_routes(&self) -> ProbeResult<RoutesAvailability> {
        let raw = self
            .read()
            .await?
            .routes
            .ok_or_else(|| ProbeError::new("routes not reported"))?;
        raw.parse::<RoutesAvailability>()
            .map_err(|e| ProbeError::new(e.to_string()))
    }

    async fn read_autoscaling_version(&self) -> ProbeResult<AutoscalingVersion> {
        let raw = self
            .read()
            .await?
            .autoscaling_version
            .ok_or_else(|| ProbeError::new("autoscaling_version not reported"))?;
        raw.parse::<AutoscalingVersion>()
            .map_err(|e| ProbeError::new(e.to_string()))
    }
}

impl CapabilityProbe for FileProbe {
    fn routes_availability(&self) -> BoxFuture<'_, ProbeResult<RoutesAvailability>> {
        Box::pin(self.read_routes())
    }

    fn autoscaling_version(&self) -> BoxFuture<'_, ProbeResult<AutoscalingVersion>> {
        Box::pin(self.read_autoscaling_version())
    }
}
