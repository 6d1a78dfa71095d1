//! # 절단 텐서 대수
//!
//! 채널 C, 깊이 D 의 절단 텐서 대수 위에서의 곱, 로그, 지수와 그 전치(adjoint)

pub mod layout;
pub mod logarithm;
pub mod product;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use layout::{signature_channels, TensorAlgebraLayout};
pub use logarithm::{exp, log, LogWorkspace, LOG_WORKSPACE_EXTRA_BUFFERS};
pub use product::{mult, mult_backward};
