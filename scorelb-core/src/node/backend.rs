use super::{Metric, MetricSnapshot, NodeSnapshot};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// 不可用哨兵状态：从未成功探测，或探测传输失败
pub const STATUS_UNAVAILABLE: u16 = 0;

/// 后端节点
///
/// 节点的 `endpoint` 和指标名称集合在构造后固定，只有状态码、指标值和
/// 最近探测时间会随探测变化。可变部分由读写锁保护，刷新循环写入的同时
/// 其他任务可以安全地读取评分。
#[derive(Debug)]
pub struct Node {
    endpoint: String,
    state: RwLock<NodeState>,
}

#[derive(Debug, Clone)]
struct NodeState {
    metrics: BTreeMap<String, Metric>,
    last_status: u16,
    last_probe_at: Option<DateTime<Utc>>,
}

impl Node {
    /// 创建没有任何指标的节点
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: RwLock::new(NodeState {
                metrics: BTreeMap::new(),
                last_status: STATUS_UNAVAILABLE,
                last_probe_at: None,
            }),
        }
    }

    /// 添加一个指标（仅在节点共享之前可用）
    pub fn with_metric(self, name: impl Into<String>, weight: u32) -> Self {
        self.with_metric_value(name, weight, 0.0)
    }

    /// 添加一个带初始值的指标
    pub fn with_metric_value(mut self, name: impl Into<String>, weight: u32, value: f64) -> Self {
        self.state
            .get_mut()
            .metrics
            .insert(name.into(), Metric::with_value(weight, value));
        self
    }

    /// 设置初始状态码（仅在节点共享之前可用）
    pub fn with_status(mut self, status: u16) -> Self {
        self.state.get_mut().last_status = status;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn last_status(&self) -> u16 {
        self.state.read().last_status
    }

    pub fn last_probe_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_probe_at
    }

    pub fn is_available(&self) -> bool {
        Self::status_available(self.last_status())
    }

    /// 不可用或状态码 >= 400 都视为错误
    pub fn is_error(&self) -> bool {
        Self::status_error(self.last_status())
    }

    /// 节点评分：所有指标得分之和，越低越优
    pub fn score(&self) -> f64 {
        self.state.read().metrics.values().map(Metric::score).sum()
    }

    pub fn metric(&self, name: &str) -> Option<Metric> {
        self.state.read().metrics.get(name).copied()
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.state.read().metrics.keys().cloned().collect()
    }

    /// 记录探测得到的状态码，不修改指标值
    pub fn record_status(&self, status: u16) {
        let mut state = self.state.write();
        state.last_status = status;
        state.last_probe_at = Some(Utc::now());
    }

    /// 将节点重置为不可用
    pub fn mark_unavailable(&self) {
        self.record_status(STATUS_UNAVAILABLE);
    }

    /// 记录一次成功探测：写入状态码，并覆盖响应中出现的已知指标
    ///
    /// 未知的指标名被忽略，响应中未出现的指标保留原值。返回被更新的指标数量。
    pub fn record_metrics(&self, status: u16, values: &HashMap<String, f64>) -> usize {
        let mut state = self.state.write();
        state.last_status = status;
        state.last_probe_at = Some(Utc::now());

        let mut updated = 0;
        for (name, value) in values {
            if let Some(metric) = state.metrics.get_mut(name) {
                metric.set_value(*value);
                updated += 1;
            }
        }
        updated
    }

    /// 获取节点状态的一致性快照
    pub fn snapshot(&self) -> NodeSnapshot {
        let state = self.state.read().clone();
        let score = state.metrics.values().map(Metric::score).sum();

        NodeSnapshot {
            endpoint: self.endpoint.clone(),
            last_status: state.last_status,
            available: Self::status_available(state.last_status),
            error: Self::status_error(state.last_status),
            score,
            metrics: state
                .metrics
                .iter()
                .map(|(name, metric)| (name.clone(), MetricSnapshot::from(*metric)))
                .collect(),
            last_probe_at: state.last_probe_at,
        }
    }

    fn status_available(status: u16) -> bool {
        status != STATUS_UNAVAILABLE
    }

    fn status_error(status: u16) -> bool {
        !Self::status_available(status) || status >= 400
    }
}
