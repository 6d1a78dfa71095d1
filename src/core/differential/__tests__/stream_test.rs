use super::{basis, random_tensor};
use crate::core::basis::LogSignatureMode;
use crate::core::config::TransformConfig;
use crate::core::differential::{logsignature_forward, stack_stream};
use crate::core::error::LogsigError;
use crate::core::tensor::{Device, Tensor};

#[test]
fn 스트림_쌓기는_행_순서를_유지() {
    let rows = Tensor::from_shape_vec(&[6, 2], (0..12).map(f64::from).collect(), Device::Cpu).unwrap();
    let stacked = stack_stream(&rows, 2, 3).unwrap();
    assert_eq!(stacked.shape(), &[2, 3, 2]);
    assert_eq!(stacked.to_vec(), rows.to_vec());
    assert!(stacked.grad_fn().is_none());
}

#[test]
fn 스트림_노드는_한_단계_아래에_변환_노드를_가짐() {
    let basis = basis(2, 2, LogSignatureMode::Words);
    let input = random_tensor(220, &[2, 3, 6], 1.0, Device::Cpu);
    input.set_requires_grad(true).unwrap();

    let rows = logsignature_forward(&input, &basis, &TransformConfig::default()).unwrap();
    assert_eq!(rows.shape(), &[6, 3]);
    let out = stack_stream(&rows, 2, 3).unwrap();
    drop(rows);

    let top = out.grad_fn().unwrap();
    assert_eq!(top.name(), "StreamStackBackward");
    let next = top.next_functions();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].as_ref().unwrap().name(), "SignatureToLogsignatureBackward");

    let seed = random_tensor(221, &[2, 3, 3], 1.0, Device::Cpu);
    out.backward(&seed).unwrap();
    assert_eq!(input.grad().unwrap().shape(), &[2, 3, 6]);
}

#[test]
fn 스트림_역전파_크기_검증() {
    let rows = random_tensor(222, &[4, 2], 1.0, Device::Cpu);
    rows.set_requires_grad(true).unwrap();
    let out = stack_stream(&rows, 2, 2).unwrap();
    assert!(matches!(
        out.grad_fn().unwrap().backward(&Tensor::zeros(&[3, 2], Device::Cpu)),
        Err(LogsigError::ShapeMismatch(_))
    ));
    assert!(matches!(stack_stream(&rows, 3, 2), Err(LogsigError::ShapeMismatch(_))));
}
