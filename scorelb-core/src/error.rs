use thiserror::Error;

/// 负载均衡错误类型
///
/// 对外只暴露两类探测错误：`NilNode` 和 `NodeUnavailable`。
/// 超时、连接失败、5xx、响应体无法解析都归入 `NodeUnavailable`。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LbError {
    /// 要探测的节点不存在
    #[error("node is nil: no node registered for '{0}'")]
    NilNode(String),

    /// 节点不可用
    #[error("node not available: {endpoint} ({reason})")]
    NodeUnavailable { endpoint: String, reason: String },

    /// HTTP客户端创建失败
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl LbError {
    pub fn unavailable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        LbError::NodeUnavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, LbError::NodeUnavailable { .. })
    }
}
