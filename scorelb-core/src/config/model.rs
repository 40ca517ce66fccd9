use crate::node::Node;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// 负载均衡器选项，构造后不可变
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// 探测请求的 User-Agent，为空时不发送
    #[serde(default)]
    pub user_agent: String,
    /// 原样转发的 Authorization 头，为空时不发送
    #[serde(default)]
    pub authorization: String,
    /// 启用最优节点单槽缓存
    #[serde(default)]
    pub cache_optimal_node: bool,
    /// 探测时追加在节点 endpoint 后面的路径
    #[serde(default)]
    pub route: String,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    /// 为 true 时，缓存中处于错误状态的节点不会绕过 only_available 过滤
    #[serde(default)]
    pub cache_respects_availability: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            authorization: String::new(),
            cache_optimal_node: false,
            route: String::new(),
            probe_timeout_seconds: default_probe_timeout(),
            cache_respects_availability: false,
        }
    }
}

impl Options {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    /// 节点的探测地址
    pub fn probe_url(&self, endpoint: &str) -> String {
        format!("{}{}", endpoint, self.route)
    }
}

/// 单个节点的配置：地址和指标权重
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeConfig {
    pub uri: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, u32>,
}

impl NodeConfig {
    pub fn to_node(&self) -> Node {
        self.metrics
            .iter()
            .fold(Node::new(self.uri.clone()), |node, (name, weight)| {
                node.with_metric(name.clone(), *weight)
            })
    }
}

/// 配置文件中的负载均衡器定义
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalancerConfig {
    #[serde(default)]
    pub options: Options,
    #[serde(default = "default_watch_interval")]
    pub watch_interval_seconds: u64,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            options: Options::default(),
            watch_interval_seconds: default_watch_interval(),
            nodes: Vec::new(),
        }
    }
}

impl BalancerConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_seconds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.watch_interval_seconds == 0 {
            anyhow::bail!("watchIntervalSeconds must be greater than 0");
        }

        if self.options.probe_timeout_seconds == 0 {
            anyhow::bail!("probeTimeoutSeconds must be greater than 0");
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.uri.trim().is_empty() {
                anyhow::bail!("Node uri cannot be empty");
            }

            if !node.uri.starts_with("http://") && !node.uri.starts_with("https://") {
                anyhow::bail!("Node uri '{}' must start with http:// or https://", node.uri);
            }

            if !seen.insert(node.uri.as_str()) {
                anyhow::bail!("Duplicate node uri '{}'", node.uri);
            }
        }

        Ok(())
    }
}

fn default_probe_timeout() -> u64 {
    15
}

fn default_watch_interval() -> u64 {
    30
}
