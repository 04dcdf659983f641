//! 매칭 capability -- 패턴 컴파일과 named capture 추출
//!
//! 엔진은 특정 정규식 API에 묶이지 않고 [`PatternCompiler`] / [`Matcher`]
//! trait 을 통해서만 패턴을 다룹니다. 기본 구현은 `regex` 크레이트 기반의
//! [`RegexCompiler`] 이며, 선형 시간 평가를 보장하고 컴파일 크기에 한도를 둡니다.

use logsift_core::config::EngineConfig;
use logsift_core::types::Fields;
use regex::{Regex, RegexBuilder};

use crate::error::EngineError;

/// 컴파일된 패턴 -- "매칭 시도 후 named 필드 맵 또는 None"
pub trait Matcher: Send + Sync {
    /// 라인에 대해 매칭을 시도합니다.
    ///
    /// 매칭되면 named capture group 만으로 구성된 필드 맵을 반환합니다.
    /// 매칭에 참여하지 않은 그룹은 맵에 포함되지 않습니다.
    fn try_match(&self, line: &str) -> Result<Option<Fields>, EngineError>;
}

/// 패턴 원문을 [`Matcher`]로 컴파일하는 capability
pub trait PatternCompiler: Send + Sync {
    /// 이 컴파일러가 생성하는 매처 타입
    type Matcher: Matcher;

    /// 패턴 원문을 컴파일합니다.
    fn compile(&self, pattern: &str) -> Result<Self::Matcher, EngineError>;
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
    fn try_match(&self, line: &str) -> Result<Option<Fields>, EngineError> {
        (**self).try_match(line)
    }
}

/// `regex` 크레이트 기반 컴파일러
///
/// 운영자가 작성한 패턴의 컴파일 비용을 제한하기 위해
/// 프로그램 크기, DFA 캐시 크기, 중첩 깊이 한도를 적용합니다.
/// look-around, back-reference 같은 미지원 구문은 컴파일 에러가 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexCompiler {
    size_limit: usize,
    dfa_size_limit: usize,
    nest_limit: u32,
}

impl RegexCompiler {
    /// 엔진 설정의 정규식 한도로 컴파일러를 생성합니다.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            size_limit: config.regex_size_limit,
            dfa_size_limit: config.regex_dfa_size_limit,
            nest_limit: config.regex_nest_limit,
        }
    }
}

impl Default for RegexCompiler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl PatternCompiler for RegexCompiler {
    type Matcher = RegexMatcher;

    fn compile(&self, pattern: &str) -> Result<RegexMatcher, EngineError> {
        let regex = RegexBuilder::new(pattern)
            .size_limit(self.size_limit)
            .dfa_size_limit(self.dfa_size_limit)
            .nest_limit(self.nest_limit)
            .build()
            .map_err(|e| EngineError::PatternCompile {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(RegexMatcher { regex })
    }
}

/// `regex::Regex` 를 감싼 매처
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl Matcher for RegexMatcher {
    fn try_match(&self, line: &str) -> Result<Option<Fields>, EngineError> {
        let Some(caps) = self.regex.captures(line) else {
            return Ok(None);
        };

        let fields = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_owned(), m.as_str().to_owned()))
            })
            .collect();

        Ok(Some(fields))
    }
}
