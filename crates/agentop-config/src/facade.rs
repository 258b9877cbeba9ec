//! The configuration facade handed to every operator subsystem.

use std::sync::Arc;
use std::time::Duration;

use agentop_autodetect::{
    AutoDetectHandle, AutoDetector, AutodetectResult, ChangeNotifier, StateStore,
};
use agentop_core::{AutoscalingVersion, DetectedState, RoutesAvailability};

use crate::labels::LabelsFilter;

/// Auto-instrumentation container image per language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Images {
    pub java: String,
    pub nodejs: String,
    pub python: String,
    pub dotnet: String,
    pub php: String,
    pub ruby: String,
    pub go: String,
}

/// Operator configuration: static settings plus auto-detected capabilities.
///
/// Cloning is cheap and every clone observes the same detected state.
#[derive(Clone)]
pub struct Config {
    pub(crate) detector: Arc<AutoDetector>,
    pub(crate) images: Images,
    pub(crate) labels_filter: LabelsFilter,
}

impl Config {
    /// Run one detection pass now and keep detecting in the background.
    ///
    /// The returned result is the first pass's; the background task runs
    /// regardless. Stop it with [`AutoDetectHandle::shutdown`].
    ///
    /// Each call spawns its own background task with its own handle, so
    /// call this once per `Config` unless independent loops are wanted.
    pub async fn start_auto_detect(&self) -> (AutoDetectHandle, AutodetectResult<()>) {
        Arc::clone(&self.detector).start().await
    }

    /// Run a single detection pass.
    pub async fn auto_detect(&self) -> AutodetectResult<()> {
        self.detector.run_once().await
    }

    /// Availability of the OpenShift Routes API.
    pub fn routes(&self) -> RoutesAvailability {
        self.state().routes()
    }

    /// Preferred autoscaling API version.
    pub fn autoscaling_version(&self) -> AutoscalingVersion {
        self.state().autoscaling_version()
    }

    /// Both detected values, read together.
    pub fn detected(&self) -> DetectedState {
        self.state().snapshot()
    }

    /// Register `callback` to run whenever routes availability changes.
    pub fn register_routes_change_callback<F>(&self, callback: F)
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.notifier().register(callback);
    }

    /// Interval between background detection passes.
    pub fn auto_detect_frequency(&self) -> Duration {
        self.detector.interval()
    }

    /// All auto-instrumentation images.
    pub fn images(&self) -> &Images {
        &self.images
    }

    /// Java auto-instrumentation image.
    pub fn auto_instrumentation_java_image(&self) -> &str {
        &self.images.java
    }

    /// Node.js auto-instrumentation image.
    pub fn auto_instrumentation_nodejs_image(&self) -> &str {
        &self.images.nodejs
    }

    /// Python auto-instrumentation image.
    pub fn auto_instrumentation_python_image(&self) -> &str {
        &self.images.python
    }

    /// .NET auto-instrumentation image.
    pub fn auto_instrumentation_dotnet_image(&self) -> &str {
        &self.images.dotnet
    }

    /// PHP auto-instrumentation image.
    pub fn auto_instrumentation_php_image(&self) -> &str {
        &self.images.php
    }

    /// Ruby auto-instrumentation image.
    pub fn auto_instrumentation_ruby_image(&self) -> &str {
        &self.images.ruby
    }

    /// Go auto-instrumentation image.
    pub fn auto_instrumentation_go_image(&self) -> &str {
        &self.images.go
    }

    /// Label filters converted to regex strings.
    pub fn labels_filter(&self) -> &[String] {
        self.labels_filter.patterns()
    }

    /// Whether `label` should be left out when propagating labels.
    pub fn is_label_filtered(&self, label: &str) -> bool {
        self.labels_filter.is_filtered(label)
    }

    fn state(&self) -> &Arc<StateStore> {
        self.detector.state()
    }

    fn notifier(&self) -> &Arc<ChangeNotifier> {
        self.detector.notifier()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("detected", &self.detected())
            .field("auto_detect_frequency", &self.auto_detect_frequency())
            .field("images", &self.images)
            .field("labels_filter", &self.labels_filter())
            .finish()
    }
}
