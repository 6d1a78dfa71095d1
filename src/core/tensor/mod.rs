//! # 텐서 및 자동 미분 계약
//!
//! 로그시그니처 엔진이 소비하는 최소한의 호스트 텐서 계층:
//! 장치 태그, 장치별 메모리 집계, 불변 텐서, 역전파 그래프, 수치 그래디언트 검증

pub mod autograd;
pub mod device;
pub mod gradcheck;
pub mod memory;
pub mod tensor;


// 재수출
pub use autograd::{BackwardNode, GradFn, WeakGradFn};
pub use device::Device;
pub use gradcheck::{gradcheck, GradcheckConfig, GradcheckMismatch, GradcheckReport};
pub use tensor::Tensor;
