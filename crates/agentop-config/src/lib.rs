//! agentop-config — the operator's configuration facade.
//!
//! [`Config`] combines the static settings the operator is started with
//! (auto-instrumentation images, label filters) and the capabilities it
//! detects at runtime (OpenShift Routes availability, autoscaling API
//! version). Build one with [`ConfigBuilder`], share it by `Clone`, and
//! call [`Config::start_auto_detect`] once at startup.

pub mod builder;
pub mod error;
pub mod facade;
pub mod labels;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use facade::{Config, Images};
pub use labels::LabelsFilter;
