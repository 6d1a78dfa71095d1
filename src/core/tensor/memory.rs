//! # 장치별 메모리 집계
//!
//! 모든 텐서 버퍼는 생성 시 바이트 수를 기록하고 drop 시 반납한다.
//! 현재 할당량과 최대 할당량(peak)을 장치별로 조회할 수 있다.

use super::device::Device;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 장치 하나의 할당 카운터
#[derive(Debug, Default)]
pub struct DeviceCounters {
    allocated: AtomicUsize,
    peak: AtomicUsize,
}

impl DeviceCounters {
    fn alloc(&self, bytes: usize) {
        let now = self.allocated.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn free(&self, bytes: usize) {
        self.allocated.fetch_sub(bytes, Ordering::SeqCst);
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn reset_peak(&self) {
        self.peak.store(self.allocated(), Ordering::SeqCst);
    }
}

// 장치별 카운터 (thread-safe)
static DEVICE_COUNTERS: Lazy<RwLock<HashMap<Device, Arc<DeviceCounters>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn counters(device: Device) -> Arc<DeviceCounters> {
    if let Some(found) = DEVICE_COUNTERS.read().get(&device) {
        return Arc::clone(found);
    }
    let mut map = DEVICE_COUNTERS.write();
    Arc::clone(map.entry(device).or_default())
}

/// 현재 장치에 살아있는 텐서 버퍼 바이트 수
pub fn allocated(device: Device) -> usize {
    counters(device).allocated()
}

/// 마지막 `reset_peak_allocated` 이후 최대 할당 바이트 수
pub fn max_allocated(device: Device) -> usize {
    counters(device).peak()
}

/// peak 값을 현재 할당량으로 되돌림
pub fn reset_peak_allocated(device: Device) {
    counters(device).reset_peak();
}

/// 집계 대상 버퍼. drop 되는 순간 할당량을 반납한다.
#[derive(Debug)]
pub(crate) struct Allocation {
    bytes: usize,
    counters: Arc<DeviceCounters>,
}

impl Allocation {
    pub(crate) fn new(device: Device, bytes: usize) -> Self {
        let counters = counters(device);
        counters.alloc(bytes);
        Self { bytes, counters }
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        self.counters.free(self.bytes);
    }
}
