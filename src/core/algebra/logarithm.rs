//! # 절단 로그/지수
//!
//! 시그니처 `1 + S` 의 로그를 Horner 스킴으로 계산한다.
//!
//! ```text
//! y_D = 1/D
//! y_i = 1/i - S ⊗ y_{i+1}     (i = D-1 .. 1)
//! log = S ⊗ y_1
//! ```
//!
//! 역전파는 저장된 시그니처로부터 y_i 를 다시 계산한 뒤 곱의 전치를 역순으로 적용한다.

use super::layout::TensorAlgebraLayout;
use super::product::{mult, mult_backward};

/// `LogWorkspace` 가 Horner 중간값 D+1 개 외에 더 잡는 full_len 버퍼 수
pub const LOG_WORKSPACE_EXTRA_BUFFERS: usize = 6;

/// 행 하나 분량의 로그 작업 공간. shape 만으로 크기가 정해지며 호출 간에 재사용된다.
#[derive(Debug, Clone)]
pub struct LogWorkspace {
    layout: TensorAlgebraLayout,
    /// 입력 S (스칼라 항 0)
    x: Vec<f64>,
    /// ys[i] = y_i (i = 1..=D, ys[0] 미사용)
    ys: Vec<Vec<f64>>,
    tmp: Vec<f64>,
    log: Vec<f64>,
    grad_x: Vec<f64>,
    grad_y: Vec<f64>,
    grad_y_next: Vec<f64>,
}

impl LogWorkspace {
    pub fn new(layout: &TensorAlgebraLayout) -> Self {
        let n = layout.full_len();
        Self {
            layout: layout.clone(),
            x: vec![0.0; n],
            ys: vec![vec![0.0; n]; layout.depth() + 1],
            tmp: vec![0.0; n],
            log: vec![0.0; n],
            grad_x: vec![0.0; n],
            grad_y: vec![0.0; n],
            grad_y_next: vec![0.0; n],
        }
    }

    pub fn layout(&self) -> &TensorAlgebraLayout {
        &self.layout
    }

    fn load<I>(&mut self, signature: I)
    where
        I: IntoIterator<Item = f64>,
    {
        self.x[0] = 0.0;
        for (slot, value) in self.x[1..].iter_mut().zip(signature) {
            *slot = value;
        }
    }

    fn horner(&mut self) {
        let depth = self.layout.depth();

        let y_top = &mut self.ys[depth];
        y_top.fill(0.0);
        y_top[0] = 1.0 / depth as f64;

        for i in (1..depth).rev() {
            mult(&self.layout, &self.x, &self.ys[i + 1], &mut self.tmp);
            let y = &mut self.ys[i];
            for (yv, &t) in y.iter_mut().zip(&self.tmp) {
                *yv = -t;
            }
            y[0] += 1.0 / i as f64;
        }

        mult(&self.layout, &self.x, &self.ys[1], &mut self.log);
    }

    /// 시그니처(레벨 1..D)의 로그. 반환값도 레벨 1..D 좌표.
    pub fn log<I>(&mut self, signature: I) -> &[f64]
    where
        I: IntoIterator<Item = f64>,
    {
        self.load(signature);
        self.horner();
        &self.log[1..]
    }

    /// `log` 의 전치. grad_log(레벨 1..D) 를 받아 시그니처 그래디언트(레벨 1..D) 반환.
    pub fn log_backward<I>(&mut self, signature: I, grad_log: &[f64]) -> &[f64]
    where
        I: IntoIterator<Item = f64>,
    {
        self.load(signature);
        self.horner();

        let depth = self.layout.depth();
        self.grad_x.fill(0.0);
        self.grad_y.fill(0.0);

        // log = S ⊗ y_1
        self.tmp[0] = 0.0;
        self.tmp[1..].copy_from_slice(grad_log);
        mult_backward(
            &self.layout,
            &self.tmp,
            &self.x,
            &self.ys[1],
            Some(self.grad_x.as_mut_slice()),
            Some(self.grad_y.as_mut_slice()),
        );

        // y_i = 1/i - S ⊗ y_{i+1}
        for i in 1..depth {
            for (t, &g) in self.tmp.iter_mut().zip(&self.grad_y) {
                *t = -g;
            }
            self.grad_y_next.fill(0.0);
            let grad_next = if i + 1 < depth {
                Some(self.grad_y_next.as_mut_slice())
            } else {
                None
            };
            mult_backward(
                &self.layout,
                &self.tmp,
                &self.x,
                &self.ys[i + 1],
                Some(self.grad_x.as_mut_slice()),
                grad_next,
            );
            std::mem::swap(&mut self.grad_y, &mut self.grad_y_next);
        }

        &self.grad_x[1..]
    }
}

/// 시그니처 하나의 로그 (레벨 1..D → 레벨 1..D)
pub fn log(layout: &TensorAlgebraLayout, signature: &[f64]) -> Vec<f64> {
    let mut workspace = LogWorkspace::new(layout);
    workspace.log(signature.iter().copied()).to_vec()
}

/// 절단 지수. exp(L) = 1 + L(1 + L/2(1 + L/3(...))), 스칼라 항을 뺀 레벨 1..D 반환.
pub fn exp(layout: &TensorAlgebraLayout, lie: &[f64]) -> Vec<f64> {
    let n = layout.full_len();
    let mut x = vec![0.0; n];
    x[1..].copy_from_slice(lie);

    let mut r = vec![0.0; n];
    r[0] = 1.0;
    let mut tmp = vec![0.0; n];
    for k in (1..=layout.depth()).rev() {
        mult(layout, &x, &r, &mut tmp);
        let scale = 1.0 / k as f64;
        for (rv, &t) in r.iter_mut().zip(&tmp) {
            *rv = t * scale;
        }
        r[0] += 1.0;
    }
    r[1..].to_vec()
}
