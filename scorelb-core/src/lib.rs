//! Scorelb Core Library
//!
//! This library provides core functionality for the scorelb system including:
//! - Weighted metrics and node scoring
//! - Node availability state
//! - Balancer options and file configuration
//! - Shared error types

pub mod config;
pub mod error;
pub mod node;

// Re-export commonly used types
pub use config::model::{BalancerConfig, NodeConfig, Options};
pub use error::LbError;
pub use node::{Metric, MetricSnapshot, Node, NodeSnapshot, STATUS_UNAVAILABLE};
