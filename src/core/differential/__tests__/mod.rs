pub mod forward_test;
pub mod stream_test;

use crate::core::basis::{Basis, LogSignatureMode};
use crate::core::config::TransformConfig;
use crate::core::tensor::{Device, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub fn basis(channels: usize, depth: usize, mode: LogSignatureMode) -> Arc<Basis> {
    Arc::new(Basis::build(channels, depth, mode, &TransformConfig::default()).unwrap())
}

/// [-scale, scale) 균등 난수 텐서
pub fn random_tensor(seed: u64, shape: &[usize], scale: f64, device: Device) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = shape.iter().product();
    let data = (0..len).map(|_| rng.gen_range(-scale..scale)).collect();
    Tensor::from_shape_vec(shape, data, device).unwrap()
}
