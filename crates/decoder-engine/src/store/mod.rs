//! Rule Store -- 서비스/디코더/fixture 정의 제공자
//!
//! 엔진은 [`RuleStore`] trait 을 주입받아 호출마다 한 번 조회하고,
//! 조회한 스냅샷을 호출이 끝날 때까지 불변으로 사용합니다.
//! 호출 간 캐싱이나 변경은 하지 않습니다.
//!
//! # 구현
//! - [`MemoryRuleStore`]: 메모리에 보관한 [`RuleSet`]
//! - [`YamlRuleStore`]: 조회할 때마다 YAML 규칙 파일을 다시 읽음

mod memory;
mod rules;
mod yaml;

use std::future::Future;

use logsift_core::error::StoreError;
use logsift_core::types::{DecoderDefinition, DecoderFixtures, ServiceDefinition};

pub use memory::MemoryRuleStore;
pub use rules::{DecoderRule, MAX_DECODERS_COUNT, RuleSet, ServiceRule, TestRule};
pub use yaml::{MAX_RULE_FILE_SIZE, YamlRuleStore};

/// 한 호출 동안 사용하는 불변 규칙 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSnapshot {
    /// 활성 서비스 (평가 순서)
    pub services: Vec<ServiceDefinition>,
    /// 활성 서비스의 활성 디코더 (서비스 순서, 서비스 내 평가 순서)
    pub decoders: Vec<DecoderDefinition>,
}

/// Rule Store 조회 인터페이스
///
/// 모든 조회 결과는 평가 순서로 정렬되어 있어야 하며,
/// 비활성 서비스/디코더는 포함하지 않습니다.
pub trait RuleStore: Send + Sync {
    /// 활성 서비스를 평가 순서대로 조회합니다.
    fn fetch_active_services(
        &self,
    ) -> impl Future<Output = Result<Vec<ServiceDefinition>, StoreError>> + Send;

    /// 활성 서비스에 속한 활성 디코더를 평가 순서대로 조회합니다.
    fn fetch_active_decoders(
        &self,
    ) -> impl Future<Output = Result<Vec<DecoderDefinition>, StoreError>> + Send;

    /// fixture 가 붙은 활성 디코더를 평가 순서대로 조회합니다.
    ///
    /// fixture 가 없는 디코더도 빈 목록과 함께 포함됩니다.
    fn fetch_decoders_with_fixtures(
        &self,
    ) -> impl Future<Output = Result<Vec<DecoderFixtures>, StoreError>> + Send;

    /// 서비스와 디코더를 함께 조회합니다.
    ///
    /// 두 조회 사이의 일관성이 필요한 구현은 이 메서드를 재정의합니다.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<RuleSnapshot, StoreError>> + Send {
        async move {
            let services = self.fetch_active_services().await?;
            let decoders = self.fetch_active_decoders().await?;
            Ok(RuleSnapshot { services, decoders })
        }
    }
}

