//! agentop-autodetect — environment capability detection for the operator.
//!
//! Probes the cluster for the capabilities the operator adapts to, keeps
//! the results in a shared [`StateStore`], and tells registered callbacks
//! when the OpenShift Routes availability flips.
//!
//! # Architecture
//!
//! ```text
//! AutoDetector
//!   ├── run_once()  (first pass runs on the caller's task)
//!   │   ├── CapabilityProbe::routes_availability()
//!   │   │     └── changed? → StateStore::swap_routes() → ChangeNotifier::invoke()
//!   │   └── CapabilityProbe::autoscaling_version() → StateStore
//!   └── background task: sleep(interval) | shutdown → run_once()
//! ```
//!
//! Only the first pass's error reaches the caller of
//! [`AutoDetector::start`]. Later failures are logged and retried on the
//! next tick. Callback failures are always logged and never fail a pass.

pub mod detector;
pub mod error;
pub mod notifier;
pub mod probe;
pub mod store;

pub use detector::{AutoDetectHandle, AutoDetector, DEFAULT_AUTO_DETECT_FREQUENCY};
pub use error::{AutodetectError, AutodetectResult, CallbackError, CallbackFailure, ProbeError, ProbeResult};
pub use notifier::{ChangeCallback, ChangeNotifier};
pub use probe::{BoxFuture, CapabilityProbe, StaticProbe};
pub use store::StateStore;
