//! # 역전파 그래프
//!
//! 출력 텐서 → `GradFn` → 저장된 입력 텐서 방향으로만 참조가 흐른다.
//! 노드는 자신의 출력을 참조하지 않으므로 출력이 drop 되면 노드와 저장 텐서가 즉시 해제된다.

use super::tensor::Tensor;
use crate::core::error::{LogsigError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// 미분 가능한 연산의 역전파 노드
pub trait BackwardNode: Send + Sync {
    fn name(&self) -> &'static str;

    /// 순전파 입력들. `backward` 반환값과 순서가 같아야 한다.
    fn inputs(&self) -> &[Tensor];

    /// dL/dOutput 을 받아 각 입력의 dL/dInput 계산
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>>;
}

static NEXT_GRAD_FN_KEY: AtomicUsize = AtomicUsize::new(1);

/// 고유 키를 가진 노드 래퍼
#[derive(Clone)]
pub struct GradFn {
    node: Arc<dyn BackwardNode>,
    key: usize,
}

impl GradFn {
    pub fn new<N: BackwardNode + 'static>(node: N) -> Self {
        Self {
            node: Arc::new(node),
            key: NEXT_GRAD_FN_KEY.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn key(&self) -> usize {
        self.key
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.node.name()
    }

    #[inline]
    pub fn inputs(&self) -> &[Tensor] {
        self.node.inputs()
    }

    /// 입력들의 grad_fn (leaf 입력은 None)
    pub fn next_functions(&self) -> Vec<Option<GradFn>> {
        self.inputs().iter().map(|t| t.grad_fn().cloned()).collect()
    }

    pub fn backward(&self, grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let grads = self.node.backward(grad_output)?;
        if grads.len() != self.inputs().len() {
            return Err(LogsigError::shape(format!(
                "{} returned {} gradients for {} inputs",
                self.name(),
                grads.len(),
                self.inputs().len()
            )));
        }
        Ok(grads)
    }

    /// 수명 추적용 약한 참조
    pub fn downgrade(&self) -> WeakGradFn {
        WeakGradFn {
            node: Arc::downgrade(&self.node),
            key: self.key,
        }
    }
}

impl fmt::Debug for GradFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradFn")
            .field("name", &self.name())
            .field("key", &self.key)
            .finish()
    }
}

/// 노드를 살려두지 않는 참조
#[derive(Clone)]
pub struct WeakGradFn {
    node: Weak<dyn BackwardNode>,
    key: usize,
}

impl WeakGradFn {
    pub fn upgrade(&self) -> Option<GradFn> {
        self.node.upgrade().map(|node| GradFn {
            node,
            key: self.key,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.node.strong_count() > 0
    }
}

/// 역위상 순서로 그래프를 따라가며 leaf 텐서에 그래디언트 누적
pub(crate) fn run_backward(root: &Tensor, seed: Tensor) -> Result<()> {
    let Some(root_fn) = root.grad_fn().cloned() else {
        if root.requires_grad() {
            root.accumulate_grad(&seed)?;
        }
        return Ok(());
    };

    let mut topo: Vec<GradFn> = Vec::new();
    let mut visited: HashSet<usize> = HashSet::new();
    fn collect(gf: &GradFn, topo: &mut Vec<GradFn>, visited: &mut HashSet<usize>) {
        if visited.insert(gf.key()) {
            for parent in gf.inputs() {
                if let Some(parent_fn) = parent.grad_fn() {
                    collect(parent_fn, topo, visited);
                }
            }
            topo.push(gf.clone());
        }
    }
    collect(&root_fn, &mut topo, &mut visited);

    let mut pending: HashMap<usize, Tensor> = HashMap::new();
    pending.insert(root_fn.key(), seed);

    for gf in topo.into_iter().rev() {
        let Some(grad_output) = pending.remove(&gf.key()) else {
            continue;
        };
        let grads = gf.backward(&grad_output)?;
        for (parent, grad) in gf.inputs().iter().zip(grads) {
            let Some(grad) = grad else { continue };
            match parent.grad_fn() {
                Some(parent_fn) => {
                    let merged = match pending.remove(&parent_fn.key()) {
                        Some(previous) => previous.add(&grad)?,
                        None => grad,
                    };
                    pending.insert(parent_fn.key(), merged);
                }
                None => {
                    if parent.requires_grad() {
                        parent.accumulate_grad(&grad)?;
                    }
                }
            }
        }
    }
    Ok(())
}
