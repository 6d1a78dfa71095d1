//! 로그시그니처 엔진 에러 타입

use crate::core::tensor::Device;
use thiserror::Error;

/// 엔진 전역 에러
///
/// 모든 에러는 호출자에게 그대로 전달되며 내부에서 삼키지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogsigError {
    /// channels < 1, depth < 1, 지원하지 않는 mode 등
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 행당 작업 공간 또는 곱셈-덧셈 수가 설정된 한계를 넘음
    #[error("basis too large: channels={channels}, depth={depth} needs {entries} per row (limit {limit})")]
    BasisTooLarge {
        channels: usize,
        depth: usize,
        entries: usize,
        limit: usize,
    },

    /// 한 호출 안에서 서로 다른 장치의 텐서가 섞임
    #[error("device mismatch: expected {expected}, found {found}")]
    DeviceMismatch { expected: Device, found: Device },

    /// 레벨 누락, 잘못된 레벨 크기, 잘못된 배치/스트림 차원
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

pub type Result<T> = std::result::Result<T, LogsigError>;

impl LogsigError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        LogsigError::ShapeMismatch(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        LogsigError::InvalidConfiguration(msg.into())
    }
}
