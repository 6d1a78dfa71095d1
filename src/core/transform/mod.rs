//! # 시그니처 → 로그시그니처 변환 진입점
//!
//! 재사용 핸들과 함수형 호출, 레벨 변환과 채널 수 보조 함수

pub mod handle;
pub mod signature;


// 재수출
pub use handle::{make_transform, signature_to_logsignature, SignatureToLogsignature};
pub use signature::{signature_from_levels, signature_levels};
