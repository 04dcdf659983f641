//! 규칙 문서 -- 서비스, 디코더, 테스트 케이스의 YAML 표현
//!
//! ```yaml
//! services:
//!   - id: ssh
//!     name: SSH
//!     prefilter_keyword: sshd
//!     priority: 10
//!     decoders:
//!       - id: ssh-failed-password
//!         name: FailedLogin
//!         pattern: 'Failed password for (?<user>\w+) from (?<ip>[\d.]+)'
//!         log_example: "Aug 1 sshd: Failed password for root from 10.0.0.5"
//!         tests:
//!           - id: ssh-failed-password-1
//!             log_sample: "sshd: Failed password for admin from 10.1.1.1"
//!             should_match: true
//!             expected_output: { user: admin, ip: 10.1.1.1 }
//! ```
//!
//! 평가 순서는 `priority` 오름차순이며, 같은 값이면 선언 순서를 유지합니다.

use std::collections::{BTreeMap, HashSet};

use logsift_core::error::StoreError;
use logsift_core::types::{
    DecoderDefinition, DecoderFixtures, DecoderTestCase, ServiceDefinition,
};
use serde::{Deserialize, Serialize};

use super::RuleSnapshot;

/// 문서 하나에 허용되는 최대 디코더 수
pub const MAX_DECODERS_COUNT: usize = 10_000;

fn default_true() -> bool {
    true
}

/// 규칙 문서 (최상위)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// 서비스 목록 (선언 순서)
    #[serde(default)]
    pub services: Vec<ServiceRule>,
}

/// 서비스 규칙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRule {
    /// 서비스 ID
    pub id: String,
    /// 서비스 이름
    pub name: String,
    /// prefilter 키워드 (빈 문자열은 모든 라인에 매칭)
    #[serde(default)]
    pub prefilter_keyword: String,
    /// 활성화 여부
    #[serde(default = "default_true")]
    pub active: bool,
    /// 평가 우선순위 (작을수록 먼저)
    #[serde(default)]
    pub priority: i32,
    /// 디코더 목록
    #[serde(default)]
    pub decoders: Vec<DecoderRule>,
}

/// 디코더 규칙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderRule {
    /// 디코더 ID
    pub id: String,
    /// 디코더 이름
    pub name: String,
    /// 정규식 원문
    pub pattern: String,
    /// 활성화 여부
    #[serde(default = "default_true")]
    pub active: bool,
    /// 서비스 내 평가 우선순위 (작을수록 먼저)
    #[serde(default)]
    pub priority: i32,
    /// 대표 로그 예시
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_example: Option<String>,
    /// 회귀 테스트 케이스
    #[serde(default)]
    pub tests: Vec<TestRule>,
}

/// 디코더 테스트 케이스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRule {
    /// 테스트 케이스 ID
    pub id: String,
    /// 샘플 로그 라인
    pub log_sample: String,
    /// 매칭되어야 하는지 여부
    #[serde(default = "default_true")]
    pub should_match: bool,
    /// 기대 추출 필드
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<BTreeMap<String, serde_json::Value>>,
}

impl RuleSet {
    /// YAML 문자열을 파싱하고 검증합니다.
    pub fn from_yaml(yaml_str: &str, source_name: &str) -> Result<Self, StoreError> {
        let rules: RuleSet =
            serde_yaml::from_str(yaml_str).map_err(|e| StoreError::Malformed {
                source_name: source_name.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;

        rules.validate(source_name)?;

        Ok(rules)
    }

    /// 문서의 유효성을 검증합니다.
    ///
    /// ID/이름/패턴 누락과 중복 ID 는 에러입니다.
    /// 빈 prefilter 키워드는 모든 라인에 매칭되므로 경고만 남깁니다.
    pub fn validate(&self, source_name: &str) -> Result<(), StoreError> {
        let count = self.decoder_count();
        if count > MAX_DECODERS_COUNT {
            return Err(StoreError::TooManyRules {
                source_name: source_name.to_owned(),
                count,
                max: MAX_DECODERS_COUNT,
            });
        }

        let mut service_ids = HashSet::new();
        let mut decoder_ids = HashSet::new();
        let mut test_ids = HashSet::new();

        for service in &self.services {
            require(&service.id, "<service>", "service id must not be empty")?;
            require(&service.name, &service.id, "service name must not be empty")?;
            if !service_ids.insert(service.id.as_str()) {
                return Err(duplicate(&service.id, "service"));
            }
            if service.prefilter_keyword.is_empty() {
                tracing::warn!(
                    service_id = %service.id,
                    source = source_name,
                    "empty prefilter keyword matches every line"
                );
            }

            for decoder in &service.decoders {
                require(&decoder.id, &service.id, "decoder id must not be empty")?;
                require(&decoder.name, &decoder.id, "decoder name must not be empty")?;
                require(&decoder.pattern, &decoder.id, "pattern must not be empty")?;
                if !decoder_ids.insert(decoder.id.as_str()) {
                    return Err(duplicate(&decoder.id, "decoder"));
                }

                for test in &decoder.tests {
                    require(&test.id, &decoder.id, "test case id must not be empty")?;
                    if !test_ids.insert(test.id.as_str()) {
                        return Err(duplicate(&test.id, "test case"));
                    }
                    require_string_outputs(test)?;
                }
            }
        }

        Ok(())
    }

    /// 전체 디코더 수 (비활성 포함)
    pub fn decoder_count(&self) -> usize {
        self.services.iter().map(|s| s.decoders.len()).sum()
    }

    /// 활성 서비스를 평가 순서대로 반환합니다.
    pub fn active_services(&self) -> Vec<ServiceDefinition> {
        self.ordered_services()
            .into_iter()
            .map(|service| ServiceDefinition {
                id: service.id.clone(),
                name: service.name.clone(),
                prefilter_keyword: service.prefilter_keyword.clone(),
                is_active: service.active,
                priority: service.priority,
            })
            .collect()
    }

    /// 활성 서비스의 활성 디코더를 평가 순서대로 반환합니다.
    pub fn active_decoders(&self) -> Vec<DecoderDefinition> {
        self.ordered_services()
            .into_iter()
            .flat_map(|service| {
                ordered_decoders(service)
                    .into_iter()
                    .map(move |decoder| decoder.to_definition(&service.id))
            })
            .collect()
    }

    /// 활성 디코더와 테스트 케이스를 평가 순서대로 반환합니다.
    pub fn decoders_with_fixtures(&self) -> Vec<DecoderFixtures> {
        self.ordered_services()
            .into_iter()
            .flat_map(|service| {
                ordered_decoders(service)
                    .into_iter()
                    .map(move |decoder| DecoderFixtures {
                        decoder_id: decoder.id.clone(),
                        decoder_name: decoder.name.clone(),
                        service_name: service.name.clone(),
                        pattern: decoder.pattern.clone(),
                        fixtures: decoder
                            .tests
                            .iter()
                            .map(|test| DecoderTestCase {
                                id: test.id.clone(),
                                decoder_id: decoder.id.clone(),
                                log_sample: test.log_sample.clone(),
                                should_match: test.should_match,
                                expected_output: test.expected_output.clone(),
                            })
                            .collect(),
                    })
            })
            .collect()
    }

    /// 서비스와 디코더를 한 번에 스냅샷으로 만듭니다.
    pub fn snapshot(&self) -> RuleSnapshot {
        RuleSnapshot {
            services: self.active_services(),
            decoders: self.active_decoders(),
        }
    }

    fn ordered_services(&self) -> Vec<&ServiceRule> {
        let mut services: Vec<_> = self.services.iter().filter(|s| s.active).collect();
        // sort_by_key 는 안정 정렬
        services.sort_by_key(|s| s.priority);
        services
    }
}

impl DecoderRule {
    /// 엔진이 사용하는 디코더 정의로 변환합니다.
    pub fn to_definition(&self, service_id: &str) -> DecoderDefinition {
        DecoderDefinition {
            id: self.id.clone(),
            service_id: service_id.to_owned(),
            name: self.name.clone(),
            pattern: self.pattern.clone(),
            is_active: self.active,
            priority: self.priority,
            log_example: self.log_example.clone(),
        }
    }
}

fn ordered_decoders(service: &ServiceRule) -> Vec<&DecoderRule> {
    let mut decoders: Vec<_> = service.decoders.iter().filter(|d| d.active).collect();
    decoders.sort_by_key(|d| d.priority);
    decoders
}

fn require(value: &str, rule_id: &str, reason: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            rule_id: rule_id.to_owned(),
            reason: reason.to_owned(),
        });
    }
    Ok(())
}

// YAML 은 따옴표 없는 스칼라를 숫자/불리언으로 읽어 `007`, `1.10` 같은 원문이 사라짐
fn require_string_outputs(test: &TestRule) -> Result<(), StoreError> {
    let Some(expected) = &test.expected_output else {
        return Ok(());
    };
    match expected
        .iter()
        .find(|(_, value)| !matches!(value, serde_json::Value::String(_) | serde_json::Value::Null))
    {
        Some((key, value)) => Err(StoreError::Validation {
            rule_id: test.id.clone(),
            reason: format!(
                "expected_output field '{key}' must be a quoted string (got {value})"
            ),
        }),
        None => Ok(()),
    }
}

fn duplicate(id: &str, kind: &str) -> StoreError {
    StoreError::Validation {
        rule_id: id.to_owned(),
        reason: format!("duplicate {kind} id"),
    }
}
