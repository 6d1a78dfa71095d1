//! # 로그시그니처 기저
//!
//! Lyndon 단어/괄호 생성, 모드별 사영 테이블, 프로세스 전역 기저 캐시

pub mod basis;
pub mod bracket;
pub mod cache;
pub mod lyndon;
pub mod mode;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use basis::{logsignature_channels, Basis};
pub use bracket::{Expansion, LyndonBracket};
pub use cache::BasisCache;
pub use lyndon::{is_lyndon, lyndon_word_count, lyndon_words, LyndonWord};
pub use mode::LogSignatureMode;

use crate::core::error::Result;

/// 길이 1..=depth 의 Lyndon 괄호 (단어와 같은 순서)
pub fn lyndon_brackets(channels: usize, depth: usize) -> Result<Vec<LyndonBracket>> {
    Ok(lyndon_words(channels, depth)?
        .iter()
        .map(LyndonBracket::from_word)
        .collect())
}
