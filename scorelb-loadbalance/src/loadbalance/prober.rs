use super::{NodeProber, UpdateOp};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use scorelb_core::{LbError, Node, Options};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 单次探测的原始结果
///
/// 对外只有 `NodeUnavailable` 一种失败，这里保留具体原因，便于记录日志和测试。
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// 状态码 < 400 且响应体是 `指标名 -> 数值` 的 JSON 对象
    Success {
        status: u16,
        values: HashMap<String, f64>,
    },
    /// 连接失败、超时、DNS 解析失败等
    TransportError(String),
    /// 状态码 >= 400
    StatusError(u16),
    /// 状态码正常但响应体无法解析
    DecodeError { status: u16, reason: String },
}

impl ProbeOutcome {
    /// 该结果需要推送给订阅者的变更类型
    pub fn update_op(&self) -> Option<UpdateOp> {
        match self {
            ProbeOutcome::Success { .. } => Some(UpdateOp::Available),
            ProbeOutcome::TransportError(_) | ProbeOutcome::DecodeError { .. } => {
                Some(UpdateOp::Unavailable)
            }
            ProbeOutcome::StatusError(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

/// 将探测结果写入节点
///
/// - 传输失败：状态重置为0，指标不变
/// - 状态码 >= 400：记录状态码，指标不变
/// - 响应体无法解析：状态重置为0（即使已经收到状态码），指标不变
/// - 成功：记录状态码，覆盖响应中出现的已知指标
pub fn apply_outcome(node: &Node, outcome: ProbeOutcome) -> Result<(), LbError> {
    match outcome {
        ProbeOutcome::Success { status, values } => {
            let updated = node.record_metrics(status, &values);
            debug!(
                "Node {} refreshed: status={}, updated {} of {} reported metrics, score={}",
                node.endpoint(),
                status,
                updated,
                values.len(),
                node.score()
            );
            Ok(())
        }
        ProbeOutcome::TransportError(reason) => {
            node.mark_unavailable();
            Err(LbError::unavailable(node.endpoint(), reason))
        }
        ProbeOutcome::StatusError(status) => {
            node.record_status(status);
            Err(LbError::unavailable(
                node.endpoint(),
                format!("HTTP status {status}"),
            ))
        }
        ProbeOutcome::DecodeError { status, reason } => {
            node.mark_unavailable();
            Err(LbError::unavailable(
                node.endpoint(),
                format!("invalid metrics body (HTTP {status}): {reason}"),
            ))
        }
    }
}

/// 基于 reqwest 的 HTTP 探测器
///
/// 对 `endpoint + route` 发送 GET 请求，超时时间来自 [`Options::probe_timeout`]。
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self, LbError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LbError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn from_options(options: &Options) -> Result<Self, LbError> {
        Self::new(options.probe_timeout())
    }
}

#[async_trait]
impl NodeProber for HttpProber {
    async fn probe(&self, node: &Node, options: &Options) -> ProbeOutcome {
        let start_time = Instant::now();
        let url = options.probe_url(node.endpoint());
        debug!("Probing node {} with URL: {}", node.endpoint(), url);

        let mut request = self.client.get(&url);

        if !options.authorization.is_empty() {
            request = request.header(AUTHORIZATION, options.authorization.as_str());
        }

        if !options.user_agent.is_empty() {
            request = request.header(USER_AGENT, options.user_agent.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Node {} probe error: {}", node.endpoint(), e);
                return ProbeOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status().as_u16();
        debug!(
            "Received response from node {} with status: {} ({}ms)",
            node.endpoint(),
            status,
            start_time.elapsed().as_millis()
        );

        if status >= 400 {
            warn!("Node {} probe failed with status: {}", node.endpoint(), status);
            return ProbeOutcome::StatusError(status);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read metrics body from node {}: {}", node.endpoint(), e);
                return ProbeOutcome::DecodeError {
                    status,
                    reason: e.to_string(),
                };
            }
        };

        match serde_json::from_slice::<HashMap<String, f64>>(&body) {
            Ok(values) => ProbeOutcome::Success { status, values },
            Err(e) => {
                warn!("Node {} returned an invalid metrics body: {}", node.endpoint(), e);
                ProbeOutcome::DecodeError {
                    status,
                    reason: e.to_string(),
                }
            }
        }
    }
}
