//! 텐서 장치 태그

use serde::{Deserialize, Serialize};
use std::fmt;

/// 텐서가 놓인 장치
///
/// `Accelerator` 저장소는 호스트 메모리로 에뮬레이션되지만 할당량은 ordinal 별로
/// 따로 집계된다 (`memory` 모듈 참조).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    Cpu,
    Accelerator(u16),
}

impl Default for Device {
    fn default() -> Self {
        Device::Cpu
    }
}

impl Device {
    pub fn is_accelerator(&self) -> bool {
        matches!(self, Device::Accelerator(_))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Accelerator(ordinal) => write!(f, "accel:{}", ordinal),
        }
    }
}
