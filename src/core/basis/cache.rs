//! # 기저 캐시
//!
//! (channels, depth, mode) 별로 한 번 만든 기저를 프로세스 전체에서 공유한다.
//! 처음 쓰는 키는 잠금 밖에서 만들고, 동시에 만든 스레드가 있으면 먼저 들어간 쪽을
//! 모두가 돌려받는다.

use super::basis::Basis;
use super::mode::LogSignatureMode;
use crate::core::config::TransformConfig;
use crate::core::error::Result;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type BasisKey = (usize, usize, LogSignatureMode);

// 전역 기저 캐시 (thread-safe)
static GLOBAL_CACHE: Lazy<BasisCache> = Lazy::new(BasisCache::new);

#[derive(Debug, Default)]
pub struct BasisCache {
    entries: RwLock<HashMap<BasisKey, Arc<Basis>>>,
}

impl BasisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 프로세스 전역 캐시
    pub fn global() -> &'static BasisCache {
        &GLOBAL_CACHE
    }

    /// 캐시된 기저를 돌려주고, 없으면 만들어 넣는다.
    ///
    /// 크기 한계는 캐시 적중 여부와 무관하게 호출마다 `config` 로 검사한다.
    pub fn get_or_build(
        &self,
        channels: usize,
        depth: usize,
        mode: LogSignatureMode,
        config: &TransformConfig,
    ) -> Result<Arc<Basis>> {
        super::basis::check_size(channels, depth, config)?;

        let key = (channels, depth, mode);
        if let Some(cached) = self.entries.read().get(&key) {
            log::trace!("basis cache hit: channels={} depth={} mode={}", channels, depth, mode);
            return Ok(Arc::clone(cached));
        }

        let built = Arc::new(Basis::build(channels, depth, mode, config)?);
        log::debug!(
            "built basis: channels={} depth={} mode={} ({} coefficients)",
            channels,
            depth,
            mode,
            built.logsignature_channels()
        );

        let mut entries = self.entries.write();
        let stored = entries.entry(key).or_insert_with(|| Arc::clone(&built));
        if !Arc::ptr_eq(stored, &built) {
            log::debug!(
                "discarding concurrently built basis: channels={} depth={} mode={}",
                channels,
                depth,
                mode
            );
        }
        Ok(Arc::clone(stored))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// 캐시 비우기. 이미 배포된 `Arc<Basis>` 는 그대로 유효하다.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
