use serde::Serialize;

/// 加权指标
///
/// 指标对节点评分的贡献为 `value * weight`。权重在构造时确定，之后不可修改；
/// 只有成功的探测响应会更新 `value`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    value: f64,
    weight: u32,
}

impl Metric {
    /// 创建新的指标，初始值为0
    pub fn new(weight: u32) -> Self {
        Self { value: 0.0, weight }
    }

    /// 创建带初始值的指标
    pub fn with_value(weight: u32, value: f64) -> Self {
        Self { value, weight }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// 计算指标得分
    pub fn score(&self) -> f64 {
        self.value * f64::from(self.weight)
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = value;
    }
}
