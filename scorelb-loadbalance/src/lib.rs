//! Scorelb Load Balance Library
//!
//! This library provides the client-side balancing functionality including:
//! - Per-node HTTP probing of health and weighted metrics
//! - Sequential refresh passes with failure isolation
//! - Score-minimizing node selection with an optional best-node cache
//! - A cancellable background watch loop and node update subscriptions

pub mod loadbalance;

// Re-export commonly used types
pub use loadbalance::{
    apply_outcome, Balancer, HttpProber, NodeProber, NodeUpdate, ProbeOutcome, UpdateOp,
    WatchHandle,
};
pub use scorelb_core::{LbError, Node, NodeSnapshot, Options};
