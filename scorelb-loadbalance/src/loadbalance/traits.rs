use async_trait::async_trait;
use scorelb_core::{Node, Options};

use super::ProbeOutcome;

/// 节点探测接口
///
/// 负责对单个节点执行一次健康/指标检查并返回原始结果，不修改节点状态。
/// 状态的写入统一由 [`apply_outcome`](super::apply_outcome) 完成，
/// 这样可以在不依赖网络的情况下替换探测实现进行测试。
#[async_trait]
pub trait NodeProber: Send + Sync {
    /// 探测单个节点
    async fn probe(&self, node: &Node, options: &Options) -> ProbeOutcome;
}
