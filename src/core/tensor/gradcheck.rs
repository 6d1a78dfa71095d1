//! # 수치 그래디언트 검증
//!
//! 중앙 차분으로 얻은 야코비안과 역전파(VJP)로 얻은 야코비안을 원소별로 비교한다.
//! 개발/테스트용이며 입력 텐서는 건드리지 않는다.

use super::tensor::Tensor;
use crate::core::error::Result;

/// 검증 허용 오차
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradcheckConfig {
    /// 중앙 차분 간격
    pub eps: f64,
    pub atol: f64,
    pub rtol: f64,
}

impl Default for GradcheckConfig {
    fn default() -> Self {
        Self {
            eps: 1e-6,
            atol: 2e-5,
            rtol: 2e-3,
        }
    }
}

/// 허용 오차를 넘은 야코비안 원소
#[derive(Debug, Clone, PartialEq)]
pub struct GradcheckMismatch {
    pub input_index: usize,
    pub output_index: usize,
    pub analytical: f64,
    pub numerical: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GradcheckReport {
    /// 비교한 야코비안 원소 수
    pub checked: usize,
    pub max_abs_error: f64,
    pub mismatches: Vec<GradcheckMismatch>,
}

impl GradcheckReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// `f` 의 해석적 그래디언트를 수치 그래디언트와 비교
pub fn gradcheck<F>(f: F, input: &Tensor, config: &GradcheckConfig) -> Result<GradcheckReport>
where
    F: Fn(&Tensor) -> Result<Tensor>,
{
    let device = input.device();
    let shape = input.shape().to_vec();
    let base = input.to_vec();
    let n_in = base.len();

    let probe = f(&Tensor::from_shape_vec(&shape, base.clone(), device)?)?;
    let out_shape = probe.shape().to_vec();
    let n_out = probe.len();
    drop(probe);

    // numerical[i * n_out + j] = d out_j / d in_i
    let mut numerical = vec![0.0; n_in * n_out];
    for i in 0..n_in {
        let mut plus = base.clone();
        plus[i] += config.eps;
        let mut minus = base.clone();
        minus[i] -= config.eps;
        let f_plus = f(&Tensor::from_shape_vec(&shape, plus, device)?)?.to_vec();
        let f_minus = f(&Tensor::from_shape_vec(&shape, minus, device)?)?.to_vec();
        for j in 0..n_out {
            numerical[i * n_out + j] = (f_plus[j] - f_minus[j]) / (2.0 * config.eps);
        }
    }

    let mut analytical = vec![0.0; n_in * n_out];
    for j in 0..n_out {
        let leaf = Tensor::from_shape_vec(&shape, base.clone(), device)?;
        leaf.set_requires_grad(true)?;
        let output = f(&leaf)?;
        let mut seed = vec![0.0; n_out];
        seed[j] = 1.0;
        output.backward(&Tensor::from_shape_vec(&out_shape, seed, device)?)?;
        if let Some(grad) = leaf.grad() {
            for (i, value) in grad.to_vec().into_iter().enumerate() {
                analytical[i * n_out + j] = value;
            }
        }
    }

    let mut report = GradcheckReport {
        checked: n_in * n_out,
        ..GradcheckReport::default()
    };
    for i in 0..n_in {
        for j in 0..n_out {
            let a = analytical[i * n_out + j];
            let n = numerical[i * n_out + j];
            let err = (a - n).abs();
            report.max_abs_error = report.max_abs_error.max(err);
            if err > config.atol + config.rtol * n.abs() {
                report.mismatches.push(GradcheckMismatch {
                    input_index: i,
                    output_index: j,
                    analytical: a,
                    numerical: n,
                });
            }
        }
    }
    Ok(report)
}
