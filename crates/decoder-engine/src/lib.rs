#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`matcher`]: 매칭 capability (`Matcher`, `PatternCompiler`) 와 `regex` 기반 기본 구현
//! - [`prefilter`]: 키워드 부분 문자열로 후보 서비스 선택
//! - [`decoder`]: 서비스의 디코더를 순서대로 평가하고 named 필드 추출
//! - [`batch`]: 여러 줄 입력의 라인별 분류
//! - [`integrity`]: fixture 기반 디코더 회귀 검증
//! - [`store`]: Rule Store trait 과 메모리/YAML 구현
//! - [`engine`]: 호출 단위 코디네이터
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! RuleStore -> snapshot -> CompiledDecoders
//!                  |              |
//!   raw text -> Prefilter -> DecoderMatcher -> Vec<MatchResult>
//!
//! RuleStore -> DecoderFixtures -> IntegrityRunner -> TestReport
//! ```

pub mod batch;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod integrity;
pub mod matcher;
pub mod prefilter;
pub mod store;

// --- 주요 타입 re-export ---

// 엔진
pub use engine::DecoderEngine;

// 에러
pub use error::EngineError;

// 매칭
pub use decoder::{CompiledDecoder, CompiledDecoders};
pub use matcher::{Matcher, PatternCompiler, RegexCompiler, RegexMatcher};
pub use prefilter::Prefilter;

// 배치 / 무결성
pub use batch::{BatchLimits, BatchProcessor};
pub use integrity::{IntegrityRunner, Verdict};

// Rule Store
pub use store::{MemoryRuleStore, RuleSet, RuleSnapshot, RuleStore, YamlRuleStore};
