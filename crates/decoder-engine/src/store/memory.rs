//! 메모리 Rule Store

use logsift_core::error::StoreError;
use logsift_core::types::{DecoderDefinition, DecoderFixtures, ServiceDefinition};

use super::{RuleSet, RuleSnapshot, RuleStore};

/// 소유한 [`RuleSet`]을 그대로 제공하는 Rule Store
///
/// 테스트와 라이브러리 임베딩에 사용합니다.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuleStore {
    rules: RuleSet,
}

impl MemoryRuleStore {
    /// 검증된 규칙 문서로 스토어를 생성합니다.
    pub fn new(rules: RuleSet) -> Result<Self, StoreError> {
        rules.validate("memory")?;
        Ok(Self { rules })
    }

    /// YAML 문자열로 스토어를 생성합니다.
    pub fn from_yaml(yaml_str: &str) -> Result<Self, StoreError> {
        Ok(Self {
            rules: RuleSet::from_yaml(yaml_str, "memory")?,
        })
    }

    /// 보관 중인 규칙 문서
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl RuleStore for MemoryRuleStore {
    async fn fetch_active_services(&self) -> Result<Vec<ServiceDefinition>, StoreError> {
        Ok(self.rules.active_services())
    }

    async fn fetch_active_decoders(&self) -> Result<Vec<DecoderDefinition>, StoreError> {
        Ok(self.rules.active_decoders())
    }

    async fn fetch_decoders_with_fixtures(&self) -> Result<Vec<DecoderFixtures>, StoreError> {
        Ok(self.rules.decoders_with_fixtures())
    }

    async fn fetch_snapshot(&self) -> Result<RuleSnapshot, StoreError> {
        Ok(self.rules.snapshot())
    }
}
