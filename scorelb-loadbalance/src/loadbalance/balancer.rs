use super::{apply_outcome, HttpProber, NodeProber, NodeUpdate};
use parking_lot::RwLock;
use scorelb_core::{BalancerConfig, LbError, Node, NodeSnapshot, Options};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// 评分最小化负载均衡器
///
/// 持有固定的节点集合和选项，按顺序逐个探测节点，并返回评分最低的节点。
/// 启用 `cache_optimal_node` 时会维护一个最优节点缓存：缓存只会被评分更低的
/// 无错误节点替换，不会因为时间或缓存节点自身变差而失效。
pub struct Balancer {
    nodes: Vec<Arc<Node>>,
    options: Options,
    prober: Arc<dyn NodeProber>,
    cached: RwLock<Option<Arc<Node>>>,
    updates: broadcast::Sender<NodeUpdate>,
}

impl std::fmt::Debug for Balancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Balancer")
            .field("nodes", &self.nodes)
            .field("options", &self.options)
            .field("cached", &*self.cached.read())
            .finish_non_exhaustive()
    }
}

impl Balancer {
    /// 使用 HTTP 探测器创建负载均衡器
    pub fn new(nodes: Vec<Node>, options: Options) -> Result<Self, LbError> {
        let prober = HttpProber::from_options(&options)?;
        Ok(Self::with_prober(nodes, options, Arc::new(prober)))
    }

    /// 创建没有节点的负载均衡器
    pub fn empty(options: Options) -> Result<Self, LbError> {
        Self::new(Vec::new(), options)
    }

    /// 从配置文件定义创建负载均衡器
    pub fn from_config(config: &BalancerConfig) -> Result<Self, LbError> {
        let nodes = config.nodes.iter().map(|node| node.to_node()).collect();
        Self::new(nodes, config.options.clone())
    }

    /// 使用自定义探测器创建负载均衡器
    pub fn with_prober(nodes: Vec<Node>, options: Options, prober: Arc<dyn NodeProber>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        Self {
            nodes: nodes.into_iter().map(Arc::new).collect(),
            options,
            prober,
            cached: RwLock::new(None),
            updates,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn node(&self, endpoint: &str) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|node| node.endpoint() == endpoint)
    }

    pub fn snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes.iter().map(|node| node.snapshot()).collect()
    }

    /// 当前缓存的最优节点
    pub fn cached_node(&self) -> Option<Arc<Node>> {
        self.cached.read().clone()
    }

    /// 订阅节点状态变更
    pub fn subscribe(&self) -> broadcast::Receiver<NodeUpdate> {
        self.updates.subscribe()
    }

    /// 执行一轮刷新
    ///
    /// 按顺序探测所有节点。单个节点的探测错误只记录日志，不会中断本轮刷新。
    pub async fn refresh_once(&self) {
        debug!("Starting refresh pass for {} nodes", self.nodes.len());

        for node in &self.nodes {
            if let Err(e) = self.probe(node).await {
                warn!("Probe failed for node {}: {}", node.endpoint(), e);
            }

            if self.options.cache_optimal_node && !node.is_error() {
                self.offer_cached(node);
            }
        }

        debug!("Completed refresh pass");
    }

    /// 探测指定 endpoint 的节点
    pub async fn probe_node(&self, endpoint: &str) -> Result<(), LbError> {
        let node = self
            .node(endpoint)
            .ok_or_else(|| LbError::NilNode(endpoint.to_string()))?;
        self.probe(node).await
    }

    /// 选择评分最低的节点
    ///
    /// 缓存非空时直接返回缓存节点，不论 `only_available` 以及缓存节点当前是否
    /// 处于错误状态；只有设置了 `cache_respects_availability` 时，错误状态的
    /// 缓存节点才会在 `only_available` 下被跳过，转为全量扫描。
    ///
    /// 扫描时评分相同保留先出现的节点。
    pub fn select_optimal(&self, only_available: bool) -> Option<Arc<Node>> {
        if let Some(cached) = self.cached_node() {
            let skip_cached =
                only_available && self.options.cache_respects_availability && cached.is_error();
            if !skip_cached {
                return Some(cached);
            }
            debug!(
                "Cached node {} is in error state, falling back to full scan",
                cached.endpoint()
            );
        }

        let mut best: Option<(&Arc<Node>, f64)> = None;
        for node in &self.nodes {
            if only_available && node.is_error() {
                continue;
            }

            let score = node.score();
            let better = match best {
                None => true,
                Some((_, best_score)) => score < best_score,
            };
            if better {
                best = Some((node, score));
            }
        }

        best.map(|(node, _)| node.clone())
    }

    async fn probe(&self, node: &Arc<Node>) -> Result<(), LbError> {
        let outcome = self.prober.probe(node, &self.options).await;
        let op = outcome.update_op();
        let result = apply_outcome(node, outcome);

        if let Some(op) = op {
            // 没有订阅者时发送失败，忽略即可
            let _ = self.updates.send(NodeUpdate {
                node: node.clone(),
                op,
            });
        }

        result
    }

    fn offer_cached(&self, node: &Arc<Node>) {
        let mut cached = self.cached.write();
        let replace = match cached.as_ref() {
            None => true,
            Some(current) => node.score() < current.score(),
        };

        if replace {
            info!(
                "Caching optimal node {} (score: {})",
                node.endpoint(),
                node.score()
            );
            *cached = Some(node.clone());
        }
    }
}
