use super::{basis, random_tensor};
use crate::core::algebra::log;
use crate::core::basis::LogSignatureMode;
use crate::core::config::TransformConfig;
use crate::core::differential::{logsignature_forward, logsignature_rows};
use crate::core::error::LogsigError;
use crate::core::tensor::Device;
use ndarray::{Axis, Ix2};

#[test]
fn 확장_모드는_행별_로그와_같음() {
    let basis = basis(2, 3, LogSignatureMode::Expand);
    let input = random_tensor(200, &[4, 14], 1.0, Device::Cpu);
    let rows = input.data().into_dimensionality::<Ix2>().unwrap();

    let out = logsignature_rows(&basis, rows.view(), &TransformConfig::sequential());
    for (out_row, sig_row) in out.axis_iter(Axis(0)).zip(rows.axis_iter(Axis(0))) {
        let expected = log(basis.layout(), &sig_row.to_vec());
        assert_eq!(out_row.to_vec(), expected);
    }
}

#[test]
fn 병렬과_순차_결과가_비트_단위로_같음() {
    for mode in LogSignatureMode::ALL {
        let basis = basis(3, 3, mode);
        let input = random_tensor(201, &[40, 39], 0.8, Device::Cpu);
        let rows = input.data().into_dimensionality::<Ix2>().unwrap();

        let parallel = TransformConfig {
            parallel_min_rows: 1,
            ..TransformConfig::default()
        };
        let a = logsignature_rows(&basis, rows.view(), &parallel);
        let b = logsignature_rows(&basis, rows.view(), &TransformConfig::sequential());
        assert_eq!(a, b, "mode={}", mode);
    }
}

#[test]
fn 그래디언트_요청_여부에_따라_노드_부착() {
    let basis = basis(2, 4, LogSignatureMode::Words);
    let config = TransformConfig::default();

    let plain = random_tensor(202, &[3, 30], 0.5, Device::Cpu);
    let out = logsignature_forward(&plain, &basis, &config).unwrap();
    assert_eq!(out.shape(), &[3, 8]);
    assert!(out.grad_fn().is_none());
    assert!(!out.requires_grad());

    let tracked = random_tensor(202, &[3, 30], 0.5, Device::Cpu);
    tracked.set_requires_grad(true).unwrap();
    let out = logsignature_forward(&tracked, &basis, &config).unwrap();
    let grad_fn = out.grad_fn().unwrap();
    assert_eq!(grad_fn.name(), "SignatureToLogsignatureBackward");
    assert!(grad_fn.next_functions()[0].is_none());
}

#[test]
fn 마지막_차원이_다르면_거부() {
    let basis = basis(2, 2, LogSignatureMode::Words);
    let input = random_tensor(203, &[3, 5], 1.0, Device::Cpu);
    assert!(matches!(
        logsignature_forward(&input, &basis, &TransformConfig::default()),
        Err(LogsigError::ShapeMismatch(_))
    ));
}

#[test]
fn 장치는_입력을_따름() {
    let device = Device::Accelerator(204);
    let basis = basis(2, 2, LogSignatureMode::Brackets);
    let input = random_tensor(204, &[2, 6], 1.0, device);
    let out = logsignature_forward(&input, &basis, &TransformConfig::default()).unwrap();
    assert_eq!(out.device(), device);
}
