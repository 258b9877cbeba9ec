//! Builder for [`Config`].

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use agentop_autodetect::{
    AutoDetector, CapabilityProbe, ChangeNotifier, DEFAULT_AUTO_DETECT_FREQUENCY, StateStore,
};
use agentop_core::config::ImagesSettings;
use agentop_core::{
    AutoscalingVersion, DEFAULT_AUTOSCALING_VERSION, DetectedState, OperatorSettings,
    RoutesAvailability,
};

use crate::error::{ConfigError, ConfigResult};
use crate::facade::{Config, Images};
use crate::labels::LabelsFilter;

/// Assembles a [`Config`] from defaults, a settings file, and explicit options.
///
/// Later calls override earlier ones, so apply settings first and
/// command-line overrides after.
pub struct ConfigBuilder {
    probe: Option<Arc<dyn CapabilityProbe>>,
    auto_detect_frequency: Duration,
    autoscaling_version: AutoscalingVersion,
    initial_routes: RoutesAvailability,
    images: Images,
    labels_filter: Vec<String>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            probe: None,
            auto_detect_frequency: DEFAULT_AUTO_DETECT_FREQUENCY,
            autoscaling_version: DEFAULT_AUTOSCALING_VERSION,
            initial_routes: RoutesAvailability::NotAvailable,
            images: Images::default(),
            labels_filter: Vec::new(),
        }
    }
}

impl ConfigBuilder {
    /// Start from the defaults: 5s interval, `autoscaling/v2`, no images.
    pub fn new() -> Self {
        Self::default()
    }

    /// The probe used by every detection pass. Required.
    pub fn with_probe(mut self, probe: Arc<dyn CapabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Interval between background detection passes.
    pub fn with_auto_detect_frequency(mut self, frequency: Duration) -> Self {
        self.auto_detect_frequency = frequency;
        self
    }

    /// Autoscaling version reported until the first successful detection.
    pub fn with_autoscaling_version(mut self, version: AutoscalingVersion) -> Self {
        self.autoscaling_version = version;
        self
    }

    /// Routes availability reported until the first successful detection.
    pub fn with_initial_routes(mut self, routes: RoutesAvailability) -> Self {
        self.initial_routes = routes;
        self
    }

    /// Replace every auto-instrumentation image at once.
    pub fn with_images(mut self, images: Images) -> Self {
        self.images = images;
        self
    }

    /// Java auto-instrumentation image.
    pub fn with_java_image(mut self, image: impl Into<String>) -> Self {
        self.images.java = image.into();
        self
    }

    /// Node.js auto-instrumentation image.
    pub fn with_nodejs_image(mut self, image: impl Into<String>) -> Self {
        self.images.nodejs = image.into();
        self
    }

    /// Python auto-instrumentation image.
    pub fn with_python_image(mut self, image: impl Into<String>) -> Self {
        self.images.python = image.into();
        self
    }

    /// .NET auto-instrumentation image.
    pub fn with_dotnet_image(mut self, image: impl Into<String>) -> Self {
        self.images.dotnet = image.into();
        self
    }

    /// PHP auto-instrumentation image.
    pub fn with_php_image(mut self, image: impl Into<String>) -> Self {
        self.images.php = image.into();
        self
    }

    /// Ruby auto-instrumentation image.
    pub fn with_ruby_image(mut self, image: impl Into<String>) -> Self {
        self.images.ruby = image.into();
        self
    }

    /// Go auto-instrumentation image.
    pub fn with_go_image(mut self, image: impl Into<String>) -> Self {
        self.images.go = image.into();
        self
    }

    /// Wildcard label filters; `*` is the only wildcard.
    pub fn with_labels_filter<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels_filter = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Apply every value present in a settings file.
    pub fn with_settings(mut self, settings: &OperatorSettings) -> ConfigResult<Self> {
        if let Some(interval) = settings.auto_detect_interval()? {
            self.auto_detect_frequency = interval;
        }
        if let Some(version) = settings.autoscaling_version() {
            self.autoscaling_version = version;
        }
        if let Some(images) = &settings.images {
            self.apply_images(images);
        }
        if let Some(filters) = &settings.labels_filter {
            self.labels_filter = filters.clone();
        }
        Ok(self)
    }

    fn apply_images(&mut self, images: &ImagesSettings) {
        let slots = [
            (&mut self.images.java, &images.java),
            (&mut self.images.nodejs, &images.nodejs),
            (&mut self.images.python, &images.python),
            (&mut self.images.dotnet, &images.dotnet),
            (&mut self.images.php, &images.php),
            (&mut self.images.ruby, &images.ruby),
            (&mut self.images.go, &images.go),
        ];
        for (slot, value) in slots {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
    }

    /// Validate the options and assemble the [`Config`].
    pub fn build(self) -> ConfigResult<Config> {
        let probe = self.probe.ok_or(ConfigError::MissingProbe)?;
        if self.auto_detect_frequency.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        let labels_filter = LabelsFilter::from_wildcards(self.labels_filter.as_slice())?;

        let state = Arc::new(StateStore::new(DetectedState {
            routes: self.initial_routes,
            autoscaling_version: self.autoscaling_version,
        }));
        let notifier = Arc::new(ChangeNotifier::new());
        let detector = AutoDetector::new(probe, state, notifier)
            .with_interval(self.auto_detect_frequency);

        debug!(
            interval_ms = self.auto_detect_frequency.as_millis() as u64,
            autoscaling_version = %self.autoscaling_version,
            labels_filters = self.labels_filter.len(),
            "configuration built"
        );

        Ok(Config {
            detector: Arc::new(detector),
            images: self.images,
            labels_filter,
        })
    }
}
