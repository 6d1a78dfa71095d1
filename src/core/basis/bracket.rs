//! Lyndon 괄호 (표준 분해에 따른 자유 Lie 대수 기저 원소)

use super::lyndon::LyndonWord;
use std::collections::BTreeMap;
use std::fmt;

/// 레벨 내 평탄 인덱스 → 정수 계수
pub type Expansion = BTreeMap<usize, i64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyndonBracket {
    Letter(usize),
    Bracket(Box<LyndonBracket>, Box<LyndonBracket>),
}

impl LyndonBracket {
    /// 표준 분해를 재귀적으로 적용해 괄호 생성
    pub fn from_word(word: &LyndonWord) -> Self {
        match word.standard_factorization() {
            Some((u, v)) => LyndonBracket::Bracket(
                Box::new(LyndonBracket::from_word(&u)),
                Box::new(LyndonBracket::from_word(&v)),
            ),
            None => LyndonBracket::Letter(word.letters()[0]),
        }
    }

    pub fn degree(&self) -> usize {
        match self {
            LyndonBracket::Letter(_) => 1,
            LyndonBracket::Bracket(a, b) => a.degree() + b.degree(),
        }
    }

    /// 텐서 대수 전개. [a, b] = ab - ba
    pub fn expand(&self, channels: usize) -> Expansion {
        match self {
            LyndonBracket::Letter(letter) => Expansion::from([(*letter, 1)]),
            LyndonBracket::Bracket(a, b) => {
                let ea = a.expand(channels);
                let eb = b.expand(channels);
                let width_a = channels.pow(a.degree() as u32);
                let width_b = channels.pow(b.degree() as u32);

                let mut out = Expansion::new();
                for (&ia, &ca) in &ea {
                    for (&ib, &cb) in &eb {
                        *out.entry(ia * width_b + ib).or_insert(0) += ca * cb;
                        *out.entry(ib * width_a + ia).or_insert(0) -= ca * cb;
                    }
                }
                out.retain(|_, c| *c != 0);
                out
            }
        }
    }
}

impl fmt::Display for LyndonBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LyndonBracket::Letter(letter) => write!(f, "{}", letter),
            LyndonBracket::Bracket(a, b) => write!(f, "[{},{}]", a, b),
        }
    }
}
