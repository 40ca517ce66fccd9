use super::Metric;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// 节点状态快照，用于展示和监控
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub endpoint: String,
    pub last_status: u16,
    pub available: bool,
    pub error: bool,
    pub score: f64,
    pub metrics: BTreeMap<String, MetricSnapshot>,
    pub last_probe_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub value: f64,
    pub weight: u32,
    pub score: f64,
}

impl From<Metric> for MetricSnapshot {
    fn from(metric: Metric) -> Self {
        Self {
            value: metric.value(),
            weight: metric.weight(),
            score: metric.score(),
        }
    }
}
