//! # 재사용 가능한 변환 핸들
//!
//! (channels, depth, mode, stream) 마다 한 번 만들고 여러 번 호출한다.
//! 핸들은 불변 기저 외의 상태를 쌓지 않는다.

use crate::core::basis::{Basis, BasisCache, LogSignatureMode};
use crate::core::config::TransformConfig;
use crate::core::differential::{logsignature_forward, stack_stream};
use crate::core::error::{LogsigError, Result};
use crate::core::tensor::Tensor;
use std::sync::Arc;

/// 시그니처 → 로그시그니처 변환기
#[derive(Debug, Clone)]
pub struct SignatureToLogsignature {
    stream: bool,
    basis: Arc<Basis>,
    config: TransformConfig,
}

impl SignatureToLogsignature {
    /// 기본 설정으로 생성. 기저는 전역 캐시에서 가져온다.
    pub fn new(channels: usize, depth: usize, stream: bool, mode: LogSignatureMode) -> Result<Self> {
        Self::with_config(channels, depth, stream, mode, TransformConfig::default())
    }

    pub fn with_config(
        channels: usize,
        depth: usize,
        stream: bool,
        mode: LogSignatureMode,
        config: TransformConfig,
    ) -> Result<Self> {
        let basis = BasisCache::global().get_or_build(channels, depth, mode, &config)?;
        Ok(Self {
            stream,
            basis,
            config,
        })
    }

    pub fn channels(&self) -> usize {
        self.basis.channels()
    }

    pub fn depth(&self) -> usize {
        self.basis.depth()
    }

    pub fn stream(&self) -> bool {
        self.stream
    }

    pub fn mode(&self) -> LogSignatureMode {
        self.basis.mode()
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn basis(&self) -> &Arc<Basis> {
        &self.basis
    }

    pub fn signature_channels(&self) -> usize {
        self.basis.signature_channels()
    }

    pub fn logsignature_channels(&self) -> usize {
        self.basis.logsignature_channels()
    }

    /// (batch, sig) → (batch, L), 스트림이면 (batch, stream, sig) → (batch, stream, L)
    ///
    /// 입력이 그래디언트를 요구할 때만 역전파 노드가 붙는다. 입력은 변경되지 않는다.
    pub fn forward(&self, signature: &Tensor) -> Result<Tensor> {
        let expected_ndim = if self.stream { 3 } else { 2 };
        if signature.ndim() != expected_ndim {
            return Err(LogsigError::shape(format!(
                "expected a {}-d signature ({}), got shape {:?}",
                expected_ndim,
                if self.stream {
                    "batch, stream, channels"
                } else {
                    "batch, channels"
                },
                signature.shape()
            )));
        }

        let rows = logsignature_forward(signature, &self.basis, &self.config)?;
        if self.stream {
            let shape = signature.shape();
            stack_stream(&rows, shape[0], shape[1])
        } else {
            Ok(rows)
        }
    }
}

/// 재사용 가능한 변환 핸들 생성
pub fn make_transform(
    channels: usize,
    depth: usize,
    stream: bool,
    mode: LogSignatureMode,
) -> Result<SignatureToLogsignature> {
    SignatureToLogsignature::new(channels, depth, stream, mode)
}

/// 함수형 호출. 기저는 전역 캐시로 공유된다.
pub fn signature_to_logsignature(
    signature: &Tensor,
    channels: usize,
    depth: usize,
    stream: bool,
    mode: LogSignatureMode,
) -> Result<Tensor> {
    make_transform(channels, depth, stream, mode)?.forward(signature)
}
