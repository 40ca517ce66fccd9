use scorelb_core::Node;
use std::sync::Arc;

/// 节点状态变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    /// 节点被重置为不可用（传输失败或响应体无法解析）
    Unavailable,
    /// 探测成功，指标已刷新
    Available,
}

/// 推送给订阅者的节点变更通知
#[derive(Debug, Clone)]
pub struct NodeUpdate {
    pub node: Arc<Node>,
    pub op: UpdateOp,
}

impl NodeUpdate {
    pub fn endpoint(&self) -> &str {
        self.node.endpoint()
    }
}
