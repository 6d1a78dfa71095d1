//! # 불변 f64 텐서
//!
//! 데이터는 생성 후 바뀌지 않는다. 복제는 `Arc` 공유이고, 연산은 항상 새 버퍼를 만든다.
//! 그래디언트 추적 정보(`requires_grad`, `grad`, `grad_fn`)만 텐서별로 따로 가진다.

use super::autograd::{self, GradFn};
use super::device::Device;
use super::memory::Allocation;
use crate::core::error::{LogsigError, Result};
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

static NEXT_TENSOR_ID: AtomicUsize = AtomicUsize::new(1);

/// 장치 메모리로 집계되는 실제 버퍼
#[derive(Debug)]
struct Storage {
    data: ArrayD<f64>,
    device: Device,
    _allocation: Allocation,
}

impl Storage {
    fn new(data: ArrayD<f64>, device: Device) -> Arc<Self> {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        let bytes = data.len() * std::mem::size_of::<f64>();
        Arc::new(Self {
            data,
            device,
            _allocation: Allocation::new(device, bytes),
        })
    }
}

struct TensorInner {
    id: usize,
    storage: Arc<Storage>,
    requires_grad: AtomicBool,
    grad: Mutex<Option<Tensor>>,
    grad_fn: Option<GradFn>,
}

/// 참조 카운트 기반 텐서 핸들
#[derive(Clone)]
pub struct Tensor(Arc<TensorInner>);

impl Tensor {
    fn with_storage(storage: Arc<Storage>, grad_fn: Option<GradFn>) -> Self {
        Tensor(Arc::new(TensorInner {
            id: NEXT_TENSOR_ID.fetch_add(1, Ordering::Relaxed),
            storage,
            requires_grad: AtomicBool::new(false),
            grad: Mutex::new(None),
            grad_fn,
        }))
    }

    /// ndarray 배열로부터 leaf 텐서 생성
    pub fn from_array(data: ArrayD<f64>, device: Device) -> Self {
        Self::with_storage(Storage::new(data, device), None)
    }

    /// 평탄한 벡터와 shape 로부터 leaf 텐서 생성
    pub fn from_shape_vec(shape: &[usize], data: Vec<f64>, device: Device) -> Result<Self> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), data)
            .map_err(|e| LogsigError::shape(format!("cannot build tensor of shape {:?}: {}", shape, e)))?;
        Ok(Self::from_array(array, device))
    }

    pub fn zeros(shape: &[usize], device: Device) -> Self {
        Self::from_array(ArrayD::zeros(IxDyn(shape)), device)
    }

    /// 연산 결과 텐서 (grad_fn 이 있으면 non-leaf)
    pub(crate) fn from_op(data: ArrayD<f64>, device: Device, grad_fn: Option<GradFn>) -> Self {
        Self::with_storage(Storage::new(data, device), grad_fn)
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn shape(&self) -> &[usize] {
        self.0.storage.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        self.0.storage.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn device(&self) -> Device {
        self.0.storage.device
    }

    /// 읽기 전용 뷰 (항상 표준 레이아웃)
    pub fn data(&self) -> ArrayViewD<'_, f64> {
        self.0.storage.data.view()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.storage.data.iter().copied().collect()
    }

    /// grad_fn 이 있거나 사용자가 추적을 요청한 경우
    pub fn requires_grad(&self) -> bool {
        self.0.grad_fn.is_some() || self.0.requires_grad.load(Ordering::SeqCst)
    }

    /// leaf 텐서의 그래디언트 추적 여부 변경
    pub fn set_requires_grad(&self, flag: bool) -> Result<()> {
        if !self.is_leaf() {
            return Err(LogsigError::config(
                "requires_grad can only be changed on leaf tensors",
            ));
        }
        self.0.requires_grad.store(flag, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_leaf(&self) -> bool {
        self.0.grad_fn.is_none()
    }

    pub fn grad_fn(&self) -> Option<&GradFn> {
        self.0.grad_fn.as_ref()
    }

    /// 누적된 그래디언트
    pub fn grad(&self) -> Option<Tensor> {
        self.0.grad.lock().clone()
    }

    pub fn zero_grad(&self) {
        *self.0.grad.lock() = None;
    }

    /// 같은 버퍼를 공유하는 그래프 밖 텐서
    pub fn detach(&self) -> Tensor {
        Self::with_storage(Arc::clone(&self.0.storage), None)
    }

    /// 데이터를 복사한 그래프 밖 텐서
    pub fn deep_clone(&self) -> Tensor {
        Self::from_array(self.0.storage.data.clone(), self.device())
    }

    /// 다른 장치로 복사 (그래프 밖)
    pub fn to_device(&self, device: Device) -> Tensor {
        Self::from_array(self.0.storage.data.clone(), device)
    }

    /// shape 와 모든 원소의 비트 패턴이 같은지
    pub fn bit_eq(&self, other: &Tensor) -> bool {
        self.shape() == other.shape()
            && self
                .data()
                .iter()
                .zip(other.data().iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    pub(crate) fn check_device(&self, expected: Device) -> Result<()> {
        if self.device() != expected {
            return Err(LogsigError::DeviceMismatch {
                expected,
                found: self.device(),
            });
        }
        Ok(())
    }

    /// 원소별 덧셈 (그래프 밖)
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        other.check_device(self.device())?;
        if self.shape() != other.shape() {
            return Err(LogsigError::shape(format!(
                "cannot add tensors of shape {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        let sum = &self.0.storage.data + &other.0.storage.data;
        Ok(Self::from_array(sum, self.device()))
    }

    /// 같은 원소 수를 가진 새 shape 으로 복사
    pub(crate) fn reshaped(&self, shape: &[usize]) -> Result<ArrayD<f64>> {
        let view = self.data();
        let reshaped = view.into_shape(IxDyn(shape)).map_err(|e| {
            LogsigError::shape(format!(
                "cannot reshape {:?} into {:?}: {}",
                self.shape(),
                shape,
                e
            ))
        })?;
        Ok(reshaped.to_owned())
    }

    /// 역전파 시작. `grad` 는 이 텐서와 같은 shape/장치여야 하며 변경되지 않는다.
    pub fn backward(&self, grad: &Tensor) -> Result<()> {
        grad.check_device(self.device())?;
        if grad.shape() != self.shape() {
            return Err(LogsigError::shape(format!(
                "gradient of shape {:?} does not match output of shape {:?}",
                grad.shape(),
                self.shape()
            )));
        }
        autograd::run_backward(self, grad.clone())
    }

    pub(crate) fn accumulate_grad(&self, grad: &Tensor) -> Result<()> {
        let mut slot = self.0.grad.lock();
        let updated = match slot.as_ref() {
            Some(previous) => previous.add(grad)?,
            None => grad.detach(),
        };
        *slot = Some(updated);
        Ok(())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id())
            .field("shape", &self.shape())
            .field("device", &self.device())
            .field("requires_grad", &self.requires_grad())
            .field("grad_fn", &self.grad_fn().map(|g| g.name()))
            .finish()
    }
}
