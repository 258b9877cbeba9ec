//! Detected state store.
//!
//! Both detected fields sit behind one mutex, so readers always see a
//! consistent pair and never a value that was not written.

use std::sync::{Mutex, MutexGuard};

use agentop_core::{AutoscalingVersion, DetectedState, RoutesAvailability};

/// Shared holder of the most recent detection results.
#[derive(Debug, Default)]
pub struct StateStore {
    current: Mutex<DetectedState>,
}

impl StateStore {
    /// Create a store holding `initial`.
    pub fn new(initial: DetectedState) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DetectedState> {
        self.current.lock().expect("detected state lock")
    }

    /// Current routes availability.
    pub fn routes(&self) -> RoutesAvailability {
        self.lock().routes
    }

    /// Replace the routes availability.
    pub fn set_routes(&self, routes: RoutesAvailability) {
        self.lock().routes = routes;
    }

    /// Store `routes` and return the value it replaced.
    pub fn swap_routes(&self, routes: RoutesAvailability) -> RoutesAvailability {
        std::mem::replace(&mut self.lock().routes, routes)
    }

    /// Current autoscaling version.
    pub fn autoscaling_version(&self) -> AutoscalingVersion {
        self.lock().autoscaling_version
    }

    /// Replace the autoscaling version.
    pub fn set_autoscaling_version(&self, version: AutoscalingVersion) {
        self.lock().autoscaling_version = version;
    }

    /// Both fields, read under a single lock acquisition.
    pub fn snapshot(&self) -> DetectedState {
        *self.lock()
    }
}
