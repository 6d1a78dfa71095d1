//! # 행 단위 순전파
//!
//! 각 행(배치 × 스트림 위치)은 서로 독립이다. 행마다 Horner 로그를 계산한 뒤
//! 기저의 사영 테이블을 적용한다. 작업 공간은 rayon 작업자마다 하나씩 만들어 재사용한다.

use crate::core::algebra::LogWorkspace;
use crate::core::basis::Basis;
use crate::core::config::TransformConfig;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis};
use rayon::prelude::*;

/// 행 하나를 처리하는 데 필요한 버퍼 묶음
pub(crate) struct RowWorkspace<'a> {
    basis: &'a Basis,
    log: LogWorkspace,
    coefficients: Vec<f64>,
    grad_coefficients: Vec<f64>,
    grad_expanded: Vec<f64>,
}

impl<'a> RowWorkspace<'a> {
    pub(crate) fn new(basis: &'a Basis) -> Self {
        Self {
            basis,
            log: LogWorkspace::new(basis.layout()),
            coefficients: vec![0.0; basis.logsignature_channels()],
            grad_coefficients: vec![0.0; basis.logsignature_channels()],
            grad_expanded: vec![0.0; basis.signature_channels()],
        }
    }

    pub(crate) fn forward(&mut self, signature: ArrayView1<'_, f64>, mut out: ArrayViewMut1<'_, f64>) {
        let expanded = self.log.log(signature.iter().copied());
        self.basis.project(expanded, &mut self.coefficients);
        for (o, &c) in out.iter_mut().zip(&self.coefficients) {
            *o = c;
        }
    }

    pub(crate) fn backward(
        &mut self,
        signature: ArrayView1<'_, f64>,
        grad_output: ArrayView1<'_, f64>,
        mut grad_signature: ArrayViewMut1<'_, f64>,
    ) {
        for (slot, &g) in self.grad_coefficients.iter_mut().zip(grad_output.iter()) {
            *slot = g;
        }
        self.basis
            .project_adjoint(&self.grad_coefficients, &mut self.grad_expanded);
        let grad = self
            .log
            .log_backward(signature.iter().copied(), &self.grad_expanded);
        for (o, &g) in grad_signature.iter_mut().zip(grad) {
            *o = g;
        }
    }
}

/// (rows, signature_channels) → (rows, logsignature_channels)
pub fn logsignature_rows(
    basis: &Basis,
    signature: ArrayView2<'_, f64>,
    config: &TransformConfig,
) -> Array2<f64> {
    let rows = signature.nrows();
    let mut out = Array2::zeros((rows, basis.logsignature_channels()));

    if config.use_parallel(rows) {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(signature.axis_iter(Axis(0)).into_par_iter())
            .for_each_init(
                || RowWorkspace::new(basis),
                |workspace, (out_row, sig_row)| workspace.forward(sig_row, out_row),
            );
    } else {
        let mut workspace = RowWorkspace::new(basis);
        for (out_row, sig_row) in out.axis_iter_mut(Axis(0)).zip(signature.axis_iter(Axis(0))) {
            workspace.forward(sig_row, out_row);
        }
    }
    out
}
