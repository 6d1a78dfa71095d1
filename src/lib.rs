//! 로그시그니처 엔진 라이브러리
//!
//! 절단 시그니처를 Lyndon 기저 위의 로그시그니처로 변환하고, 그 해석적 역전파를 제공한다.

pub mod core;

// 핵심 모듈들 재수출
pub use crate::core::{
    // 변환 진입점
    make_transform, signature_to_logsignature, SignatureToLogsignature,
    signature_from_levels, signature_levels,
    // 기저
    logsignature_channels, lyndon_brackets, lyndon_words, signature_channels,
    Basis, BasisCache, LogSignatureMode, LyndonBracket, LyndonWord,
    // 텐서 및 설정
    Device, GradFn, Tensor, TensorAlgebraLayout, TransformConfig,
    LogsigError, Result,
};

// 편의 타입 별칭들
pub type Mode = LogSignatureMode;
