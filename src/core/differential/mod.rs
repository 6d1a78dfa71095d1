//! # 시그니처 → 로그시그니처 미분 계층
//!
//! 행 단위 순전파/역전파 커널과 자동 미분 그래프에 붙는 노드들

pub mod backward;
pub mod forward;
pub mod stream;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use backward::{logsignature_forward, logsignature_rows_backward, SignatureToLogsignatureBackward};
pub use forward::logsignature_rows;
pub use stream::{stack_stream, StreamStackBackward};
