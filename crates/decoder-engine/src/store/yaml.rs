//! YAML 파일 Rule Store -- 조회할 때마다 규칙 파일을 디스크에서 다시 읽습니다.
//!
//! 캐싱하지 않으므로 파일 수정은 다음 호출부터 반영됩니다.
//! 파일을 읽거나 파싱할 수 없으면 호출 전체가 실패합니다.

use std::path::{Path, PathBuf};

use logsift_core::error::StoreError;
use logsift_core::types::{DecoderDefinition, DecoderFixtures, ServiceDefinition};

use super::{RuleSet, RuleSnapshot, RuleStore};

/// 규칙 파일 최대 크기
pub const MAX_RULE_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// YAML 규칙 파일 기반 Rule Store
#[derive(Debug, Clone)]
pub struct YamlRuleStore {
    path: PathBuf,
}

impl YamlRuleStore {
    /// 규칙 파일 경로로 스토어를 생성합니다. 파일은 조회 시점에 읽습니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 규칙 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 규칙 파일을 읽고 검증합니다.
    ///
    /// # Errors
    /// - 파일이 없거나 읽을 수 없는 경우 [`StoreError::Unavailable`]
    /// - 파일이 너무 크거나 YAML 이 잘못된 경우 [`StoreError::Malformed`]
    /// - 검증 실패 시 [`StoreError::Validation`] / [`StoreError::TooManyRules`]
    pub async fn load(&self) -> Result<RuleSet, StoreError> {
        let source_name = self.path.display().to_string();

        // 파일 크기 검증
        let metadata =
            tokio::fs::metadata(&self.path)
                .await
                .map_err(|e| StoreError::Unavailable {
                    source_name: source_name.clone(),
                    reason: format!("failed to read file metadata: {e}"),
                })?;

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(StoreError::Malformed {
                source_name,
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| StoreError::Unavailable {
                    source_name: source_name.clone(),
                    reason: format!("failed to read file: {e}"),
                })?;

        let rules = RuleSet::from_yaml(&content, &source_name)?;

        tracing::debug!(
            path = %self.path.display(),
            services = rules.services.len(),
            decoders = rules.decoder_count(),
            "loaded rule file"
        );

        Ok(rules)
    }

    async fn load_for(&self, operation: &'static str) -> Result<RuleSet, StoreError> {
        self.load().await.inspect_err(|e| {
            tracing::warn!(
                path = %self.path.display(),
                operation,
                error = %e,
                "rule store fetch failed"
            );
            use logsift_core::metrics as m;
            metrics::counter!(m::STORE_FETCH_ERRORS_TOTAL, m::LABEL_OPERATION => operation)
                .increment(1);
        })
    }
}

impl RuleStore for YamlRuleStore {
    async fn fetch_active_services(&self) -> Result<Vec<ServiceDefinition>, StoreError> {
        Ok(self.load_for("services").await?.active_services())
    }

    async fn fetch_active_decoders(&self) -> Result<Vec<DecoderDefinition>, StoreError> {
        Ok(self.load_for("decoders").await?.active_decoders())
    }

    async fn fetch_decoders_with_fixtures(&self) -> Result<Vec<DecoderFixtures>, StoreError> {
        Ok(self.load_for("fixtures").await?.decoders_with_fixtures())
    }

    // 서비스와 디코더가 같은 파일 버전에서 나오도록 한 번만 읽음
    async fn fetch_snapshot(&self) -> Result<RuleSnapshot, StoreError> {
        Ok(self.load_for("snapshot").await?.snapshot())
    }
}
