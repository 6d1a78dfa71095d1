//! # 로그시그니처 엔진 핵심 모듈
//!
//! 절단 텐서 대수 위에서 시그니처를 자유 Lie 대수 좌표(로그시그니처)로 바꾸는 구성 요소들

pub mod algebra;
pub mod basis;
pub mod config;
pub mod differential;
pub mod error;
pub mod tensor;
pub mod transform;

// 주요 타입들 재수출
pub use algebra::{signature_channels, TensorAlgebraLayout};
pub use basis::{
    logsignature_channels, lyndon_brackets, lyndon_words, Basis, BasisCache, LogSignatureMode,
    LyndonBracket, LyndonWord,
};
pub use config::TransformConfig;
pub use error::{LogsigError, Result};
pub use tensor::{Device, GradFn, Tensor};
pub use transform::*;
