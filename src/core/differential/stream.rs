//! # 스트림 어댑터
//!
//! (batch, stream, sig) 입력의 각 접두 위치를 독립된 행으로 보고 한 번에 변환한 뒤
//! 결과를 (batch, stream, L) 로 다시 쌓는다. 모든 위치가 같은 기저를 쓴다.

use crate::core::error::{LogsigError, Result};
use crate::core::tensor::{BackwardNode, GradFn, Tensor};

/// 평탄한 행 결과를 스트림 축으로 다시 쌓는 노드
pub struct StreamStackBackward {
    inputs: Vec<Tensor>,
}

impl BackwardNode for StreamStackBackward {
    fn name(&self) -> &'static str {
        "StreamStackBackward"
    }

    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let rows = &self.inputs[0];
        grad_output.check_device(rows.device())?;
        if grad_output.len() != rows.len() {
            return Err(LogsigError::shape(format!(
                "stream gradient of shape {:?} does not match {:?}",
                grad_output.shape(),
                rows.shape()
            )));
        }
        let grad = grad_output.reshaped(rows.shape())?;
        Ok(vec![Some(Tensor::from_array(grad, rows.device()))])
    }
}

/// (batch × stream, L) → (batch, stream, L)
pub fn stack_stream(rows: &Tensor, batch: usize, stream: usize) -> Result<Tensor> {
    let width = rows.shape().last().copied().unwrap_or(0);
    let stacked = rows.reshaped(&[batch, stream, width])?;
    let grad_fn = rows.requires_grad().then(|| {
        GradFn::new(StreamStackBackward {
            inputs: vec![rows.clone()],
        })
    });
    Ok(Tensor::from_op(stacked, rows.device(), grad_fn))
}
