//! Capability probes — the queries a detection pass asks of the environment.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use agentop_core::{AutoscalingVersion, RoutesAvailability};

use crate::error::{ProbeError, ProbeResult};

/// Boxed future returned by [`CapabilityProbe`] queries.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Answers the environment questions the operator adapts to.
///
/// Either query may fail; failures are retried on the next pass.
pub trait CapabilityProbe: Send + Sync {
    /// Whether the OpenShift Routes API is served by the cluster.
    fn routes_availability(&self) -> BoxFuture<'_, ProbeResult<RoutesAvailability>>;

    /// The preferred horizontal pod autoscaling API version.
    fn autoscaling_version(&self) -> BoxFuture<'_, ProbeResult<AutoscalingVersion>>;
}

#[derive(Debug, Clone)]
struct Answers {
    routes: Result<RoutesAvailability, String>,
    autoscaling: Result<AutoscalingVersion, String>,
}

/// Probe with fixed answers that can be changed at runtime.
///
/// Useful when the environment is known up front, and for exercising
/// detection without a cluster.
#[derive(Debug)]
pub struct StaticProbe {
    answers: Mutex<Answers>,
    routes_calls: AtomicU64,
    autoscaling_calls: AtomicU64,
}

impl StaticProbe {
    /// Create a probe answering `routes` and `autoscaling`.
    pub fn new(routes: RoutesAvailability, autoscaling: AutoscalingVersion) -> Self {
        Self {
            answers: Mutex::new(Answers {
                routes: Ok(routes),
                autoscaling: Ok(autoscaling),
            }),
            routes_calls: AtomicU64::new(0),
            autoscaling_calls: AtomicU64::new(0),
        }
    }

    /// Answer `routes` from now on.
    pub fn set_routes(&self, routes: RoutesAvailability) {
        self.answers.lock().expect("probe answers lock").routes = Ok(routes);
    }

    /// Answer `version` from now on.
    pub fn set_autoscaling_version(&self, version: AutoscalingVersion) {
        self.answers.lock().expect("probe answers lock").autoscaling = Ok(version);
    }

    /// Make the routes query fail with `message` until the next `set_routes`.
    pub fn fail_routes(&self, message: &str) {
        self.answers.lock().expect("probe answers lock").routes = Err(message.to_string());
    }

    /// Make the autoscaling query fail with `message` until the next
    /// `set_autoscaling_version`.
    pub fn fail_autoscaling(&self, message: &str) {
        self.answers.lock().expect("probe answers lock").autoscaling = Err(message.to_string());
    }

    /// Number of routes queries answered so far.
    pub fn routes_calls(&self) -> u64 {
        self.routes_calls.load(Ordering::Relaxed)
    }

    /// Number of autoscaling queries answered so far.
    pub fn autoscaling_calls(&self) -> u64 {
        self.autoscaling_calls.load(Ordering::Relaxed)
    }

    fn answers(&self) -> Answers {
        self.answers.lock().expect("probe answers lock").clone()
    }
}

impl CapabilityProbe for StaticProbe {
    fn routes_availability(&self) -> BoxFuture<'_, ProbeResult<RoutesAvailability>> {
        self.routes_calls.fetch_add(1, Ordering::Relaxed);
        let answer = self.answers().routes;
        Box::pin(async move { answer.map_err(ProbeError::new) })
    }

    fn autoscaling_version(&self) -> BoxFuture<'_, ProbeResult<AutoscalingVersion>> {
        self.autoscaling_calls.fetch_add(1, Ordering::Relaxed);
        let answer = self.answers().autoscaling;
        Box::pin(async move { answer.map_err(ProbeError::new) })
    }
}
