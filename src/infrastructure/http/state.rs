//! Application State

use crate::domain::speech::DurationEstimator;

/// 应用状态
///
/// HTTP 层不持有合成引擎，只做校验与时长估算
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub estimator: DurationEstimator,
    /// 启动时能力检测的结果
    pub engine_available: bool,
}

impl AppState {
    pub fn new(estimator: DurationEstimator, engine_available: bool) -> Self {
        Self {
            estimator,
            engine_available,
        }
    }
}
