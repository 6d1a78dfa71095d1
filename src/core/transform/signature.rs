//! 레벨별 텐서 ↔ 연결된 시그니처 레이아웃 변환

use crate::core::algebra::TensorAlgebraLayout;
use crate::core::error::{LogsigError, Result};
use crate::core::tensor::Tensor;
use ndarray::{Axis, Slice};

/// 레벨 1..D 텐서들을 마지막 축으로 이어붙임. 결과는 그래프 밖 leaf 텐서다.
///
/// 레벨 k 의 마지막 차원은 C^k 여야 하고, 앞쪽 차원과 장치는 모든 레벨이 같아야 한다.
pub fn signature_from_levels(levels: &[Tensor], channels: usize, depth: usize) -> Result<Tensor> {
    let layout = TensorAlgebraLayout::new(channels, depth)?;
    if levels.len() != depth {
        return Err(LogsigError::shape(format!(
            "expected {} signature levels, got {}",
            depth,
            levels.len()
        )));
    }

    let device = levels[0].device();
    for (k, level) in (1..=depth).zip(levels) {
        level.check_device(device)?;
        if level.shape().last() != Some(&layout.level_size(k)) {
            return Err(LogsigError::shape(format!(
                "level {} has shape {:?}, expected last dimension {}",
                k,
                level.shape(),
                layout.level_size(k)
            )));
        }
    }

    let axis = Axis(levels[0].ndim() - 1);
    let views: Vec<_> = levels.iter().map(|level| level.data()).collect();
    let joined = ndarray::concatenate(axis, &views)
        .map_err(|e| LogsigError::shape(format!("levels do not share leading dimensions: {}", e)))?;
    Ok(Tensor::from_array(joined, device))
}

/// 연결된 시그니처를 레벨 1..D 텐서들로 나눔
pub fn signature_levels(signature: &Tensor, channels: usize, depth: usize) -> Result<Vec<Tensor>> {
    let layout = TensorAlgebraLayout::new(channels, depth)?;
    if signature.shape().last() != Some(&layout.signature_channels()) {
        return Err(LogsigError::shape(format!(
            "signature of shape {:?} does not end in {} channels",
            signature.shape(),
            layout.signature_channels()
        )));
    }

    let axis = Axis(signature.ndim() - 1);
    let data = signature.data();
    Ok((1..=depth)
        .map(|k| {
            let range = layout.signature_level_range(k);
            let level = data.slice_axis(axis, Slice::from(range)).to_owned();
            Tensor::from_array(level, signature.device())
        })
        .collect())
}
