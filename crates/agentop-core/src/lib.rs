pub mod config;
pub mod types;

pub use config::{parse_duration, OperatorSettings};
pub use types::*;
