//! 통합 테스트 공용 도구
//!
//! 참조 값은 라이브러리 구현과 독립적으로 계산한다: Chen 항등식으로 만든 시그니처,
//! 거듭제곱 급수 로그, 전수 탐색 Lyndon 단어, 밀집 괄호 전개 + 가우스 소거.

#![allow(dead_code)]

use approx::assert_relative_eq;
use logsig_engine::{Device, LogSignatureMode, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 레벨 0..=D 로 나눈 텐서 대수 원소
pub type Levels = Vec<Vec<f64>>;

pub fn random_paths(seed: u64, batch: usize, length: usize, channels: usize, scale: f64) -> Vec<Vec<Vec<f64>>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..batch)
        .map(|_| {
            (0..length)
                .map(|_| (0..channels).map(|_| rng.gen_range(-scale..scale)).collect())
                .collect()
        })
        .collect()
}

fn identity(channels: usize, depth: usize) -> Levels {
    let mut levels: Levels = (0..=depth).map(|k| vec![0.0; channels.pow(k as u32)]).collect();
    levels[0][0] = 1.0;
    levels
}

/// 절단 텐서 곱
pub fn tensor_mul(a: &Levels, b: &Levels, channels: usize, depth: usize) -> Levels {
    let mut out: Levels = (0..=depth).map(|k| vec![0.0; channels.pow(k as u32)]).collect();
    for k in 0..=depth {
        for i in 0..=k {
            let width = channels.pow((k - i) as u32);
            for (ia, &va) in a[i].iter().enumerate() {
                for (ib, &vb) in b[k - i].iter().enumerate() {
                    out[k][ia * width + ib] += va * vb;
                }
            }
        }
    }
    out
}

/// 선분 하나의 시그니처: Δ^{⊗k} / k!
fn segment_signature(delta: &[f64], channels: usize, depth: usize) -> Levels {
    let mut levels = identity(channels, depth);
    for k in 1..=depth {
        let previous = levels[k - 1].clone();
        for (i, &p) in previous.iter().enumerate() {
            for (c, &d) in delta.iter().enumerate() {
                levels[k][i * channels + c] = p * d / k as f64;
            }
        }
    }
    levels
}

/// 점 수 L 인 경로의 접두 시그니처 L-1 개 (Chen 항등식)
pub fn prefix_signatures(path: &[Vec<f64>], channels: usize, depth: usize) -> Vec<Levels> {
    let mut running = identity(channels, depth);
    path.windows(2)
        .map(|pair| {
            let delta: Vec<f64> = pair[1].iter().zip(&pair[0]).map(|(b, a)| b - a).collect();
            running = tensor_mul(&running, &segment_signature(&delta, channels, depth), channels, depth);
            running.clone()
        })
        .collect()
}

/// 레벨 1..D 를 이어붙인 평탄 좌표
pub fn flatten(levels: &Levels) -> Vec<f64> {
    levels[1..].iter().flatten().copied().collect()
}

/// 경로 묶음의 시그니처 텐서. stream 이면 (batch, L-1, sig), 아니면 (batch, sig)
pub fn signature_tensor(paths: &[Vec<Vec<f64>>], channels: usize, depth: usize, stream: bool, device: Device) -> Tensor {
    let mut data = Vec::new();
    let mut positions = 0;
    for path in paths {
        let prefixes = prefix_signatures(path, channels, depth);
        positions = prefixes.len();
        if stream {
            for prefix in &prefixes {
                data.extend(flatten(prefix));
            }
        } else if let Some(last) = prefixes.last() {
            data.extend(flatten(last));
        }
    }
    let width: usize = (1..=depth).map(|k| channels.pow(k as u32)).sum();
    let shape = if stream {
        vec![paths.len(), positions, width]
    } else {
        vec![paths.len(), width]
    };
    Tensor::from_shape_vec(&shape, data, device).unwrap()
}

/// log(1 + S) = Σ (-1)^{n+1} S^n / n
pub fn naive_log(signature: &Levels, channels: usize, depth: usize) -> Levels {
    let mut s = signature.clone();
    s[0][0] = 0.0;
    let mut result: Levels = (0..=depth).map(|k| vec![0.0; channels.pow(k as u32)]).collect();
    let mut power = s.clone();
    for n in 1..=depth {
        let sign = if n % 2 == 1 { 1.0 } else { -1.0 };
        for (r, p) in result.iter_mut().zip(&power) {
            for (rv, pv) in r.iter_mut().zip(p) {
                *rv += sign * pv / n as f64;
            }
        }
        power = tensor_mul(&power, &s, channels, depth);
    }
    result
}

/// 모든 회전보다 엄격히 작은 단어
fn is_lyndon_by_rotation(word: &[usize]) -> bool {
    (1..word.len()).all(|r| {
        let rotated: Vec<usize> = word[r..].iter().chain(&word[..r]).copied().collect();
        word < rotated.as_slice()
    })
}

fn all_words(channels: usize, length: usize) -> Vec<Vec<usize>> {
    (0..channels.pow(length as u32))
        .map(|flat| {
            (0..length)
                .rev()
                .map(|j| (flat / channels.pow(j as u32)) % channels)
                .collect()
        })
        .collect()
}

/// 길이 우선, 사전순 Lyndon 단어 (전수 탐색)
pub fn brute_force_lyndon(channels: usize, depth: usize) -> Vec<Vec<usize>> {
    (1..=depth)
        .flat_map(|length| all_words(channels, length))
        .filter(|w| is_lyndon_by_rotation(w))
        .collect()
}

type Polynomial = BTreeMap<Vec<usize>, f64>;

fn dense_bracket(word: &[usize]) -> Polynomial {
    if word.len() == 1 {
        return Polynomial::from([(word.to_vec(), 1.0)]);
    }
    // 가장 긴 Lyndon 진접미사
    let split = (1..word.len())
        .find(|&i| is_lyndon_by_rotation(&word[i..]))
        .unwrap();
    let left = dense_bracket(&word[..split]);
    let right = dense_bracket(&word[split..]);
    let mut out = Polynomial::new();
    for (a, ca) in &left {
        for (b, cb) in &right {
            let ab: Vec<usize> = a.iter().chain(b).copied().collect();
            let ba: Vec<usize> = b.iter().chain(a).copied().collect();
            *out.entry(ab).or_insert(0.0) += ca * cb;
            *out.entry(ba).or_insert(0.0) -= ca * cb;
        }
    }
    out
}

fn word_coordinate(levels: &Levels, word: &[usize], channels: usize) -> f64 {
    let flat = word.iter().fold(0, |acc, &letter| acc * channels + letter);
    levels[word.len()][flat]
}

/// 가우스 소거 (부분 피벗)
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Vec<f64> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap();
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);
        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor != 0.0 {
                for k in col..n {
                    matrix[row][k] -= factor * matrix[col][k];
                }
                rhs[row] -= factor * rhs[col];
            }
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / matrix[row][row];
    }
    x
}

/// 시그니처 하나의 참조 로그시그니처
pub fn reference_logsignature(signature: &Levels, channels: usize, depth: usize, mode: LogSignatureMode) -> Vec<f64> {
    let log = naive_log(signature, channels, depth);
    match mode {
        LogSignatureMode::Expand => flatten(&log),
        LogSignatureMode::Words => brute_force_lyndon(channels, depth)
            .iter()
            .map(|w| word_coordinate(&log, w, channels))
            .collect(),
        LogSignatureMode::Brackets => {
            // Lyndon 단어 좌표에서 Σ c_w P_w 를 맞추는 연립방정식
            let words = brute_force_lyndon(channels, depth);
            let expansions: Vec<Polynomial> = words.iter().map(|w| dense_bracket(w)).collect();
            let matrix = words
                .iter()
                .map(|u| {
                    expansions
                        .iter()
                        .map(|p| p.get(u).copied().unwrap_or(0.0))
                        .collect()
                })
                .collect();
            let rhs = words.iter().map(|u| word_coordinate(&log, u, channels)).collect();
            solve(matrix, rhs)
        }
    }
}

/// 경로 묶음의 참조 로그시그니처 (signature_tensor 와 같은 행 순서)
pub fn reference_tensor_data(
    paths: &[Vec<Vec<f64>>],
    channels: usize,
    depth: usize,
    stream: bool,
    mode: LogSignatureMode,
) -> Vec<f64> {
    let mut data = Vec::new();
    for path in paths {
        let prefixes = prefix_signatures(path, channels, depth);
        if stream {
            for prefix in &prefixes {
                data.extend(reference_logsignature(prefix, channels, depth, mode));
            }
        } else if let Some(last) = prefixes.last() {
            data.extend(reference_logsignature(last, channels, depth, mode));
        }
    }
    data
}

pub fn assert_all_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "길이 불일치");
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = tolerance, max_relative = tolerance);
    }
}
