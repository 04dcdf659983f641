//! 도메인 타입 -- 서비스, 디코더, 테스트 케이스, 분류 결과
//!
//! Rule Store가 제공하는 정의와 엔진이 만들어 내는 결과 타입을 정의합니다.
//! JSON 직렬화는 HTTP 경계의 필드 이름(camelCase)을 따릅니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// named capture group 에서 추출한 필드 (이름 -> 값)
///
/// 키 순서가 결정적이어야 하므로 `BTreeMap`을 사용합니다.
pub type Fields = BTreeMap<String, String>;

/// 매칭 실패 시 보고되는 서비스 이름
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// 매칭 실패 시 보고되는 디코더 이름
pub const NO_DECODER: &str = "N/A";

/// 서비스 정의
///
/// 로그 라인을 후보 서비스로 좁히기 위한 prefilter 키워드를 가집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    /// 서비스 ID
    pub id: String,
    /// 서비스 이름
    pub name: String,
    /// 대소문자를 구분하는 부분 문자열 키워드
    pub prefilter_keyword: String,
    /// 활성화 여부
    pub is_active: bool,
    /// 평가 우선순위 (작을수록 먼저)
    #[serde(default)]
    pub priority: i32,
}

/// 디코더 정의
///
/// 하나의 서비스에 속한 이름 있는 정규식 규칙입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoderDefinition {
    /// 디코더 ID
    pub id: String,
    /// 소속 서비스 ID
    pub service_id: String,
    /// 디코더 이름
    pub name: String,
    /// 정규식 원문
    pub pattern: String,
    /// 활성화 여부
    pub is_active: bool,
    /// 서비스 내 평가 우선순위 (작을수록 먼저)
    #[serde(default)]
    pub priority: i32,
    /// 대표 로그 예시
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_example: Option<String>,
}

/// 디코더 회귀 테스트 케이스 (fixture)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoderTestCase {
    /// 테스트 케이스 ID
    pub id: String,
    /// 대상 디코더 ID
    pub decoder_id: String,
    /// 샘플 로그 라인
    pub log_sample: String,
    /// 매칭되어야 하는지 여부
    pub should_match: bool,
    /// 기대 추출 필드
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<BTreeMap<String, serde_json::Value>>,
}

/// 테스트 케이스가 붙은 디코더 -- 무결성 테스트 입력 단위
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoderFixtures {
    /// 디코더 ID
    pub decoder_id: String,
    /// 디코더 이름
    pub decoder_name: String,
    /// 소속 서비스 이름
    pub service_name: String,
    /// 정규식 원문
    pub pattern: String,
    /// 테스트 케이스 (저장 순서)
    pub fixtures: Vec<DecoderTestCase>,
}

/// 라인 분류 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// 서비스와 디코더가 모두 매칭됨
    Success,
    /// 매칭 없음
    #[serde(rename = "No Match")]
    NoMatch,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::NoMatch => write!(f, "No Match"),
        }
    }
}

/// 한 라인의 분류 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// 원본 로그 라인
    pub log_line: String,
    /// 분류 상태
    pub status: MatchStatus,
    /// 매칭된 서비스 이름 (`Unknown`)
    pub service_name: String,
    /// 매칭된 디코더 이름 (`N/A`)
    pub decoder_name: String,
    /// 추출 필드 (매칭 실패 시 `None`)
    pub fields: Option<Fields>,
}

impl MatchResult {
    /// 매칭 성공 결과를 생성합니다.
    pub fn success(
        log_line: impl Into<String>,
        service_name: impl Into<String>,
        decoder_name: impl Into<String>,
        fields: Fields,
    ) -> Self {
        Self {
            log_line: log_line.into(),
            status: MatchStatus::Success,
            service_name: service_name.into(),
            decoder_name: decoder_name.into(),
            fields: Some(fields),
        }
    }

    /// 매칭 실패 결과를 생성합니다.
    pub fn no_match(log_line: impl Into<String>) -> Self {
        Self {
            log_line: log_line.into(),
            status: MatchStatus::NoMatch,
            service_name: UNKNOWN_SERVICE.to_owned(),
            decoder_name: NO_DECODER.to_owned(),
            fields: None,
        }
    }

    /// 매칭 성공 여부
    pub fn is_success(&self) -> bool {
        self.status == MatchStatus::Success
    }
}

/// 디코더 식별 정보 (보고서용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoderRef {
    /// 디코더 이름
    pub decoder_name: String,
    /// 서비스 이름
    pub service_name: String,
}

/// 무결성 테스트 보고서
///
/// `passed + failed`는 항상 평가한 디코더 수와 같습니다.
/// 테스트 케이스가 없는 디코더는 `passed`로 세고 `untested`에도 기록합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    /// 통과한 디코더 수
    pub passed: usize,
    /// 실패한 디코더 수
    pub failed: usize,
    /// 실패한 디코더 (평가 순서)
    pub failures: Vec<DecoderRef>,
    /// 테스트 케이스가 없는 디코더 (평가 순서)
    #[serde(default)]
    pub untested: Vec<DecoderRef>,
}

impl TestReport {
    /// 평가한 디코더 수
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// 실패가 하나도 없는지 여부
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
