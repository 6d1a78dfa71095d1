//! # Lyndon 단어
//!
//! 알파벳 `0..C` 위에서 길이 D 이하의 Lyndon 단어를 Duval 알고리즘으로 생성한다.
//! 반환 순서는 길이 오름차순, 같은 길이 안에서는 사전순이다.

use crate::core::algebra::TensorAlgebraLayout;
use crate::core::error::Result;
use std::fmt;

/// 모든 진접미사보다 사전순으로 작은 비어있지 않은 단어
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LyndonWord(Vec<usize>);

impl LyndonWord {
    /// Lyndon 단어가 아니면 None
    pub fn new(letters: Vec<usize>) -> Option<Self> {
        is_lyndon(&letters).then_some(Self(letters))
    }

    pub fn letters(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 표준 분해 w = uv. v 는 가장 긴 Lyndon 진접미사이며 u 도 Lyndon 단어가 된다.
    /// 길이 1 단어는 None.
    pub fn standard_factorization(&self) -> Option<(LyndonWord, LyndonWord)> {
        (1..self.0.len())
            .find(|&split| is_lyndon(&self.0[split..]))
            .map(|split| {
                (
                    LyndonWord(self.0[..split].to_vec()),
                    LyndonWord(self.0[split..].to_vec()),
                )
            })
    }
}

impl fmt::Display for LyndonWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: Vec<String> = self.0.iter().map(|l| l.to_string()).collect();
        write!(f, "{}", letters.join(","))
    }
}

pub fn is_lyndon(letters: &[usize]) -> bool {
    !letters.is_empty() && (1..letters.len()).all(|i| letters < &letters[i..])
}

/// 길이 1..=depth 의 모든 Lyndon 단어 (길이 우선, 사전순)
pub fn lyndon_words(channels: usize, depth: usize) -> Result<Vec<LyndonWord>> {
    TensorAlgebraLayout::new(channels, depth)?;

    let mut words = Vec::new();
    let mut w: Vec<usize> = vec![0];
    loop {
        words.push(LyndonWord(w.clone()));
        let m = w.len();
        while w.len() < depth {
            w.push(w[w.len() - m]);
        }
        while w.last() == Some(&(channels - 1)) {
            w.pop();
        }
        match w.last_mut() {
            Some(last) => *last += 1,
            None => break,
        }
    }

    // Duval 은 사전순으로 내보내므로 안정 정렬로 길이별 묶음만 만든다
    words.sort_by_key(|word| word.len());
    Ok(words)
}

/// 레벨 `level` 의 Lyndon 단어 수 (Witt 공식)
pub fn lyndon_word_count(channels: usize, level: usize) -> usize {
    if level == 0 {
        return 0;
    }
    let total: i128 = divisors(level)
        .into_iter()
        .map(|d| mobius(d) as i128 * (channels as i128).pow((level / d) as u32))
        .sum();
    (total / level as i128) as usize
}

fn divisors(n: usize) -> Vec<usize> {
    (1..=n).filter(|d| n % d == 0).collect()
}

fn mobius(mut n: usize) -> i64 {
    let mut result = 1;
    let mut p = 2;
    while p * p <= n {
        if n % p == 0 {
            n /= p;
            if n % p == 0 {
                return 0;
            }
            result = -result;
        }
        p += 1;
    }
    if n > 1 {
        result = -result;
    }
    result
}
