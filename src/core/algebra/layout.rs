//! 절단 텐서 대수 좌표 레이아웃
//!
//! "full" 원소는 스칼라 항(레벨 0)을 포함한 `1 + signature_channels` 길이 벡터이고,
//! 시그니처 좌표는 스칼라 항을 뺀 레벨 1..D 의 연결이다.
//! 레벨 k 의 단어 `i1 i2 .. ik` 는 레벨 안에서 `Σ ij · C^(k-j)` 위치에 놓인다.

use crate::core::error::{LogsigError, Result};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorAlgebraLayout {
    channels: usize,
    depth: usize,
    /// level_sizes[k] = C^k (k = 0..=D)
    level_sizes: Vec<usize>,
    /// full 원소 안에서 레벨 k 의 시작 위치 (k = 0..=D+1)
    offsets: Vec<usize>,
}

impl TensorAlgebraLayout {
    pub fn new(channels: usize, depth: usize) -> Result<Self> {
        if channels < 1 {
            return Err(LogsigError::config(format!("channels must be >= 1, got {}", channels)));
        }
        if depth < 1 {
            return Err(LogsigError::config(format!("depth must be >= 1, got {}", depth)));
        }

        let overflow = || {
            LogsigError::config(format!(
                "tensor algebra of channels={} depth={} overflows usize",
                channels, depth
            ))
        };
        let mut level_sizes = Vec::with_capacity(depth + 1);
        let mut offsets = Vec::with_capacity(depth + 2);
        let mut size = 1usize;
        let mut offset = 0usize;
        for k in 0..=depth {
            if k > 0 {
                size = size.checked_mul(channels).ok_or_else(overflow)?;
            }
            level_sizes.push(size);
            offsets.push(offset);
            offset = offset.checked_add(size).ok_or_else(overflow)?;
        }
        offsets.push(offset);

        Ok(Self {
            channels,
            depth,
            level_sizes,
            offsets,
        })
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn level_size(&self, level: usize) -> usize {
        self.level_sizes[level]
    }

    /// 스칼라 항을 포함한 원소 길이
    #[inline]
    pub fn full_len(&self) -> usize {
        self.offsets[self.depth + 1]
    }

    /// 레벨 1..D 좌표 수
    #[inline]
    pub fn signature_channels(&self) -> usize {
        self.full_len() - 1
    }

    /// full 원소 안에서 레벨 범위
    #[inline]
    pub fn level_range(&self, level: usize) -> Range<usize> {
        self.offsets[level]..self.offsets[level + 1]
    }

    /// 시그니처 좌표(스칼라 제외) 안에서 레벨 범위, level >= 1
    #[inline]
    pub fn signature_level_range(&self, level: usize) -> Range<usize> {
        self.offsets[level] - 1..self.offsets[level + 1] - 1
    }

    /// 단어의 레벨 내 평탄 인덱스
    pub fn word_index(&self, letters: &[usize]) -> usize {
        letters
            .iter()
            .fold(0usize, |acc, &letter| acc * self.channels + letter)
    }

    /// 단어의 시그니처 좌표 위치
    pub fn word_position(&self, letters: &[usize]) -> usize {
        self.signature_level_range(letters.len()).start + self.word_index(letters)
    }
}

/// 레벨 1..D 시그니처 좌표 수 `Σ C^k`
pub fn signature_channels(channels: usize, depth: usize) -> Result<usize> {
    Ok(TensorAlgebraLayout::new(channels, depth)?.signature_channels())
}
