//! # 행 단위 역전파와 자동 미분 노드
//!
//! 저장 상태는 입력 시그니처와 기저에 대한 약한 참조뿐이다. Horner 중간값은 역전파 때 다시 계산한다.

use super::forward::{logsignature_rows, RowWorkspace};
use crate::core::basis::{Basis, BasisCache, LogSignatureMode};
use crate::core::config::TransformConfig;
use crate::core::error::{LogsigError, Result};
use crate::core::tensor::{BackwardNode, GradFn, Tensor};
use ndarray::{Array2, ArrayView2, Axis, IxDyn};
use rayon::prelude::*;
use std::sync::{Arc, Weak};

/// `logsignature_rows` 의 전치: dL/dLogsig (rows, L) → dL/dSig (rows, signature_channels)
pub fn logsignature_rows_backward(
    basis: &Basis,
    signature: ArrayView2<'_, f64>,
    grad_output: ArrayView2<'_, f64>,
    config: &TransformConfig,
) -> Array2<f64> {
    let rows = signature.nrows();
    let mut grad = Array2::zeros((rows, basis.signature_channels()));

    if config.use_parallel(rows) {
        grad.axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(signature.axis_iter(Axis(0)).into_par_iter())
            .zip(grad_output.axis_iter(Axis(0)).into_par_iter())
            .for_each_init(
                || RowWorkspace::new(basis),
                |workspace, ((grad_row, sig_row), out_row)| workspace.backward(sig_row, out_row, grad_row),
            );
    } else {
        let mut workspace = RowWorkspace::new(basis);
        for ((grad_row, sig_row), out_row) in grad
            .axis_iter_mut(Axis(0))
            .zip(signature.axis_iter(Axis(0)))
            .zip(grad_output.axis_iter(Axis(0)))
        {
            workspace.backward(sig_row, out_row, grad_row);
        }
    }
    grad
}

/// 시그니처 텐서를 (rows, signature_channels) 로 본 뷰
pub(crate) fn as_rows<'a>(tensor: &'a Tensor, width: usize) -> Result<ArrayView2<'a, f64>> {
    let rows = if width == 0 { 0 } else { tensor.len() / width };
    tensor
        .data()
        .into_shape((rows, width))
        .map_err(|e| {
            LogsigError::shape(format!(
                "cannot view tensor of shape {:?} as rows of {}: {}",
                tensor.shape(),
                width,
                e
            ))
        })
}

/// 로그시그니처 변환의 역전파 노드
///
/// 입력 시그니처 (원래 shape 그대로) 와 기저의 약한 참조만 가진다. 출력은 참조하지 않는다.
/// 역전파 시점에 기저가 이미 해제됐으면 같은 키로 전역 캐시에서 다시 얻는다.
pub struct SignatureToLogsignatureBackward {
    inputs: Vec<Tensor>,
    basis: Weak<Basis>,
    key: (usize, usize, LogSignatureMode),
    config: TransformConfig,
}

impl SignatureToLogsignatureBackward {
    pub fn basis(&self) -> Result<Arc<Basis>> {
        if let Some(basis) = self.basis.upgrade() {
            return Ok(basis);
        }
        let (channels, depth, mode) = self.key;
        log::debug!(
            "basis released before backward, refetching: channels={} depth={} mode={}",
            channels,
            depth,
            mode
        );
        BasisCache::global().get_or_build(channels, depth, mode, &self.config)
    }
}

impl BackwardNode for SignatureToLogsignatureBackward {
    fn name(&self) -> &'static str {
        "SignatureToLogsignatureBackward"
    }

    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let signature = &self.inputs[0];
        grad_output.check_device(signature.device())?;

        let basis = self.basis()?;
        let width = basis.signature_channels();
        let rows = signature.len() / width;
        let expected = [rows, basis.logsignature_channels()];
        if grad_output.shape() != expected {
            return Err(LogsigError::shape(format!(
                "gradient of shape {:?} does not match logsignature rows {:?}",
                grad_output.shape(),
                expected
            )));
        }

        log::trace!(
            "logsignature backward: rows={} mode={} device={}",
            rows,
            basis.mode(),
            signature.device()
        );

        let sig_rows = as_rows(signature, width)?;
        let out_rows = as_rows(grad_output, basis.logsignature_channels())?;
        let grad = logsignature_rows_backward(&basis, sig_rows, out_rows, &self.config);
        let grad = grad
            .into_shape(IxDyn(signature.shape()))
            .map_err(|e| LogsigError::shape(e.to_string()))?;

        Ok(vec![Some(Tensor::from_array(grad, signature.device()))])
    }
}

/// 시그니처 행들을 로그시그니처 행들로 변환하고, 필요하면 역전파 노드를 붙인다.
///
/// 입력의 마지막 차원은 기저의 signature_channels 와 같아야 하며 앞쪽 차원은 모두 행으로 펼친다.
/// 결과는 항상 (rows, logsignature_channels) 이다.
pub fn logsignature_forward(
    signature: &Tensor,
    basis: &Arc<Basis>,
    config: &TransformConfig,
) -> Result<Tensor> {
    let width = basis.signature_channels();
    if signature.shape().last() != Some(&width) {
        return Err(LogsigError::shape(format!(
            "signature of shape {:?} does not end in {} channels (channels={}, depth={})",
            signature.shape(),
            width,
            basis.channels(),
            basis.depth()
        )));
    }

    let rows = as_rows(signature, width)?;
    log::trace!(
        "logsignature forward: rows={} mode={} device={}",
        rows.nrows(),
        basis.mode(),
        signature.device()
    );
    let out = logsignature_rows(basis, rows, config);

    let grad_fn = signature.requires_grad().then(|| {
        GradFn::new(SignatureToLogsignatureBackward {
            inputs: vec![signature.clone()],
            basis: Arc::downgrade(basis),
            key: (basis.channels(), basis.depth(), basis.mode()),
            config: config.clone(),
        })
    });
    Ok(Tensor::from_op(out.into_dyn(), signature.device(), grad_fn))
}
