//! # 변환 설정
//!
//! 기저 크기 한계와 행 단위 병렬화 설정

use serde::{Deserialize, Serialize};

/// 기본 행당 작업 공간 한계 (f64 원소 수, 128MiB)
pub const DEFAULT_MAX_BASIS_ENTRIES: usize = 1 << 24;

/// 기본 행당 곱셈-덧셈 한계
pub const DEFAULT_MAX_ROW_WORK: usize = 1 << 30;

/// 시그니처→로그시그니처 변환 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// 행 하나를 변환하는 작업 공간의 최대 원소 수 ((D + 7) × full_len)
    pub max_basis_entries: usize,
    /// 행 하나의 Horner 곱셈-덧셈 최대 횟수 (D × Σ (k+1)·C^k)
    pub max_row_work: usize,
    /// rayon 행 병렬화 사용 여부
    pub parallel: bool,
    /// 병렬화를 시작하는 최소 행 수 (batch × stream)
    pub parallel_min_rows: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_basis_entries: DEFAULT_MAX_BASIS_ENTRIES,
            max_row_work: DEFAULT_MAX_ROW_WORK,
            parallel: true,
            parallel_min_rows: 16,
        }
    }
}

impl TransformConfig {
    /// 단일 스레드 프리셋 (재현성 검증, 작은 배치용)
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// 기저 크기 한계 조정
    pub fn with_max_basis_entries(mut self, max_basis_entries: usize) -> Self {
        self.max_basis_entries = max_basis_entries;
        self
    }

    /// 곱셈-덧셈 한계 조정
    pub fn with_max_row_work(mut self, max_row_work: usize) -> Self {
        self.max_row_work = max_row_work;
        self
    }

    /// 주어진 행 수에서 병렬 경로를 탈지 여부
    pub fn use_parallel(&self, rows: usize) -> bool {
        self.parallel && rows >= self.parallel_min_rows.max(1)
    }
}
