//! # 로그시그니처 기저
//!
//! (channels, depth, mode) 에 대해 한 번 만들고 이후에는 읽기 전용으로 공유한다.
//! 순전파/역전파는 모드와 무관하게 하나의 경로를 타고, 모드별 차이는 `Projection`
//! 테이블에만 들어있다.
//!
//! - expand: 항등
//! - words: Lyndon 단어 위치의 계수를 모음 (gather)
//! - brackets: words 계수에서 단위 삼각 연립방정식을 풀어 괄호 기저 계수를 얻음.
//!   괄호 P_w 의 전개는 `w + Σ_{u > w} a_u u` 꼴이므로 같은 레벨 안에서 삼각 구조다.

use super::bracket::LyndonBracket;
use super::lyndon::{lyndon_words, LyndonWord};
use super::mode::LogSignatureMode;
use crate::core::algebra::{TensorAlgebraLayout, LOG_WORKSPACE_EXTRA_BUFFERS};
use crate::core::config::TransformConfig;
use crate::core::error::{LogsigError, Result};
use std::collections::HashMap;

/// 모드별 변환 테이블
#[derive(Debug, Clone)]
enum Projection {
    Identity,
    Words {
        /// 단어별 시그니처 좌표 위치
        positions: Vec<usize>,
    },
    Brackets {
        positions: Vec<usize>,
        /// transforms[a] = 단어 a 의 괄호 전개에서 (뒤쪽 Lyndon 단어 b, 계수), b > a
        transforms: Vec<Vec<(usize, f64)>>,
        /// expansions[a] = 괄호 a 의 텐서 전개 (시그니처 좌표 위치, 계수)
        expansions: Vec<Vec<(usize, f64)>>,
    },
}

#[derive(Debug)]
pub struct Basis {
    mode: LogSignatureMode,
    layout: TensorAlgebraLayout,
    words: Vec<LyndonWord>,
    brackets: Vec<LyndonBracket>,
    projection: Projection,
}

/// 설정된 자원 한계 검사
///
/// 행 하나에 드는 작업 공간 `(D + 1 + 6) × full_len` 과 Horner 곱 비용
/// `D × Σ_{k=0..D} (k+1)·C^k` 를 레이아웃을 만들기 전에 포화 산술로 센다.
pub(crate) fn check_size(
    channels: usize,
    depth: usize,
    config: &TransformConfig,
) -> Result<TensorAlgebraLayout> {
    if channels < 1 || depth < 1 {
        return TensorAlgebraLayout::new(channels, depth);
    }
    let too_large = |entries: usize, limit: usize| LogsigError::BasisTooLarge {
        channels,
        depth,
        entries,
        limit,
    };

    let buffers = depth
        .saturating_add(1)
        .saturating_add(LOG_WORKSPACE_EXTRA_BUFFERS);
    // full_len ≥ D+1 이므로 이 경우 레벨을 셀 필요도 없다
    if depth > config.max_basis_entries {
        return Err(too_large(
            buffers.saturating_mul(depth.saturating_add(1)),
            config.max_basis_entries,
        ));
    }

    let mut size = 1usize;
    let mut full_len = 0usize;
    let mut product = 0usize;
    for k in 0..=depth {
        if k > 0 {
            size = size.saturating_mul(channels);
        }
        full_len = full_len.saturating_add(size);
        product = product.saturating_add(size.saturating_mul(k + 1));
        if full_len == usize::MAX {
            break;
        }
    }

    let workspace = buffers.saturating_mul(full_len);
    if workspace > config.max_basis_entries {
        return Err(too_large(workspace, config.max_basis_entries));
    }
    let work = depth.saturating_mul(product);
    if work > config.max_row_work {
        return Err(too_large(work, config.max_row_work));
    }
    TensorAlgebraLayout::new(channels, depth)
}

impl Basis {
    /// 기저 생성. 순수하고 결정적이다.
    pub fn build(
        channels: usize,
        depth: usize,
        mode: LogSignatureMode,
        config: &TransformConfig,
    ) -> Result<Self> {
        let layout = check_size(channels, depth, config)?;

        let (words, brackets, projection) = match mode {
            LogSignatureMode::Expand => (Vec::new(), Vec::new(), Projection::Identity),
            LogSignatureMode::Words => {
                let words = lyndon_words(channels, depth)?;
                let positions = words.iter().map(|w| layout.word_position(w.letters())).collect();
                (words, Vec::new(), Projection::Words { positions })
            }
            LogSignatureMode::Brackets => {
                let words = lyndon_words(channels, depth)?;
                let brackets: Vec<LyndonBracket> = words.iter().map(LyndonBracket::from_word).collect();
                let projection = bracket_projection(&layout, &words, &brackets);
                (words, brackets, projection)
            }
        };

        Ok(Self {
            mode,
            layout,
            words,
            brackets,
            projection,
        })
    }

    pub fn mode(&self) -> LogSignatureMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn depth(&self) -> usize {
        self.layout.depth()
    }

    pub fn layout(&self) -> &TensorAlgebraLayout {
        &self.layout
    }

    pub fn signature_channels(&self) -> usize {
        self.layout.signature_channels()
    }

    /// 출력 계수 벡터 길이
    pub fn logsignature_channels(&self) -> usize {
        match &self.projection {
            Projection::Identity => self.layout.signature_channels(),
            _ => self.words.len(),
        }
    }

    /// Lyndon 단어 (expand 모드에서는 비어있음)
    pub fn words(&self) -> &[LyndonWord] {
        &self.words
    }

    /// Lyndon 괄호 (brackets 모드에서만 채워짐)
    pub fn brackets(&self) -> &[LyndonBracket] {
        &self.brackets
    }

    /// 전개된 로그(레벨 1..D)를 이 기저 좌표로 사영
    pub fn project(&self, expanded: &[f64], out: &mut [f64]) {
        match &self.projection {
            Projection::Identity => out.copy_from_slice(expanded),
            Projection::Words { positions } => {
                for (o, &p) in out.iter_mut().zip(positions) {
                    *o = expanded[p];
                }
            }
            Projection::Brackets {
                positions,
                transforms,
                ..
            } => {
                for (o, &p) in out.iter_mut().zip(positions) {
                    *o = expanded[p];
                }
                // 앞쪽 단어의 계수가 확정되면 그 괄호 전개를 뒤쪽 단어에서 뺀다
                for (a, row) in transforms.iter().enumerate() {
                    let coefficient = out[a];
                    for &(b, value) in row {
                        out[b] -= value * coefficient;
                    }
                }
            }
        }
    }

    /// `project` 의 전치. grad_expanded 를 덮어쓴다.
    pub fn project_adjoint(&self, grad: &[f64], grad_expanded: &mut [f64]) {
        match &self.projection {
            Projection::Identity => grad_expanded.copy_from_slice(grad),
            Projection::Words { positions } => {
                grad_expanded.fill(0.0);
                for (&g, &p) in grad.iter().zip(positions) {
                    grad_expanded[p] = g;
                }
            }
            Projection::Brackets {
                positions,
                transforms,
                ..
            } => {
                grad_expanded.fill(0.0);
                for (&g, &p) in grad.iter().zip(positions) {
                    grad_expanded[p] = g;
                }
                for (a, row) in transforms.iter().enumerate().rev() {
                    let correction: f64 = row
                        .iter()
                        .map(|&(b, value)| value * grad_expanded[positions[b]])
                        .sum();
                    grad_expanded[positions[a]] -= correction;
                }
            }
        }
    }

    /// 계수 벡터를 텐서 대수 좌표(레벨 1..D)로 되돌림. expand/brackets 모드만 지원.
    pub fn embed(&self, coefficients: &[f64]) -> Result<Vec<f64>> {
        if coefficients.len() != self.logsignature_channels() {
            return Err(LogsigError::shape(format!(
                "expected {} coefficients, got {}",
                self.logsignature_channels(),
                coefficients.len()
            )));
        }
        match &self.projection {
            Projection::Identity => Ok(coefficients.to_vec()),
            Projection::Words { .. } => Err(LogsigError::config(
                "words-mode coefficients cannot be embedded; build the basis in brackets mode",
            )),
            Projection::Brackets { expansions, .. } => {
                let mut out = vec![0.0; self.layout.signature_channels()];
                for (&c, expansion) in coefficients.iter().zip(expansions) {
                    for &(p, value) in expansion {
                        out[p] += c * value;
                    }
                }
                Ok(out)
            }
        }
    }
}

fn bracket_projection(
    layout: &TensorAlgebraLayout,
    words: &[LyndonWord],
    brackets: &[LyndonBracket],
) -> Projection {
    let positions: Vec<usize> = words.iter().map(|w| layout.word_position(w.letters())).collect();
    let word_at: HashMap<usize, usize> = positions
        .iter()
        .enumerate()
        .map(|(index, &position)| (position, index))
        .collect();

    let mut transforms = Vec::with_capacity(words.len());
    let mut expansions = Vec::with_capacity(words.len());
    for (a, bracket) in brackets.iter().enumerate() {
        let level_start = layout.signature_level_range(bracket.degree()).start;
        let expansion: Vec<(usize, f64)> = bracket
            .expand(layout.channels())
            .into_iter()
            .map(|(index, c)| (level_start + index, c as f64))
            .collect();

        let row: Vec<(usize, f64)> = expansion
            .iter()
            .filter_map(|&(p, value)| match word_at.get(&p) {
                Some(&b) if b != a => Some((b, value)),
                _ => None,
            })
            .collect();
        debug_assert!(row.iter().all(|&(b, _)| b > a));

        transforms.push(row);
        expansions.push(expansion);
    }

    Projection::Brackets {
        positions,
        transforms,
        expansions,
    }
}

/// 모드별 로그시그니처 채널 수
pub fn logsignature_channels(channels: usize, depth: usize, mode: LogSignatureMode) -> Result<usize> {
    let layout = TensorAlgebraLayout::new(channels, depth)?;
    Ok(match mode {
        LogSignatureMode::Expand => layout.signature_channels(),
        LogSignatureMode::Words | LogSignatureMode::Brackets => (1..=depth)
            .map(|level| super::lyndon::lyndon_word_count(channels, level))
            .sum(),
    })
}
