//! 로그시그니처 표현 모드

use crate::core::error::LogsigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 로그시그니처를 어떤 좌표로 내보낼지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSignatureMode {
    /// 텐서 대수 좌표 그대로 (가장 큼)
    Expand,
    /// Lyndon 괄호 기저 계수
    Brackets,
    /// Lyndon 단어 위치의 계수 (가장 작음)
    #[default]
    Words,
}

impl LogSignatureMode {
    pub const ALL: [LogSignatureMode; 3] = [
        LogSignatureMode::Expand,
        LogSignatureMode::Brackets,
        LogSignatureMode::Words,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogSignatureMode::Expand => "expand",
            LogSignatureMode::Brackets => "brackets",
            LogSignatureMode::Words => "words",
        }
    }
}

impl fmt::Display for LogSignatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogSignatureMode {
    type Err = LogsigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "expand" => Ok(LogSignatureMode::Expand),
            "brackets" => Ok(LogSignatureMode::Brackets),
            "words" => Ok(LogSignatureMode::Words),
            other => Err(LogsigError::config(format!(
                "unsupported mode `{}` (expected expand, brackets or words)",
                other
            ))),
        }
    }
}
