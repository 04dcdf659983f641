//! 배치 프로세서 -- 여러 줄 입력을 라인별로 분류합니다.
//!
//! 입력을 줄바꿈(`\n`, `\r\n`) 단위로 나누고 공백뿐인 라인은 버립니다.
//! 남은 라인마다 Prefilter -> 디코더 매처를 실행하여 정확히 하나의
//! [`MatchResult`]를 만들며, 출력 순서는 입력 순서와 같습니다.
//!
//! 개별 패턴 실패는 배치를 중단시키지 않습니다. 배치 전체를 실패시키는 것은
//! 입력 크기 한도와 처리 기한뿐이며, 이때 부분 결과는 반환하지 않습니다.

use std::time::{Duration, Instant};

use logsift_core::config::EngineConfig;
use logsift_core::types::{MatchResult, ServiceDefinition};
use tracing::{debug, warn};

use crate::decoder::CompiledDecoders;
use crate::error::EngineError;
use crate::matcher::Matcher;
use crate::prefilter::Prefilter;

/// 배치 처리 한도
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// 입력 최대 크기 (바이트)
    pub max_input_bytes: usize,
    /// 평가 대상 라인 최대 길이 (바이트)
    pub max_line_bytes: usize,
    /// 배치 전체 처리 기한 (`None`이면 무제한)
    pub deadline: Option<Duration>,
    /// 선택된 서비스의 디코더가 모두 실패하면 다음 후보 서비스를 시도
    pub service_fallthrough: bool,
}

impl BatchLimits {
    /// 엔진 설정에서 한도를 구성합니다.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_input_bytes: config.max_input_bytes,
            max_line_bytes: config.max_line_bytes,
            deadline: (config.batch_deadline_ms > 0)
                .then(|| Duration::from_millis(config.batch_deadline_ms)),
            service_fallthrough: config.service_fallthrough,
        }
    }

    /// 입력 크기를 검사합니다.
    pub fn check_input(&self, raw: &str) -> Result<(), EngineError> {
        if raw.len() > self.max_input_bytes {
            return Err(EngineError::InputTooLarge {
                size: raw.len(),
                max: self.max_input_bytes,
            });
        }
        Ok(())
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// 입력을 라인으로 나누고 공백뿐인 라인을 제거합니다.
///
/// 반환되는 라인은 trim 되지 않은 원문입니다.
pub fn split_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|line| !line.trim().is_empty())
}

/// 배치 프로세서
///
/// 하나의 스냅샷과 그 스냅샷으로 컴파일한 디코더를 빌려 사용합니다.
pub struct BatchProcessor<'a, M> {
    services: &'a [ServiceDefinition],
    decoders: &'a CompiledDecoders<M>,
    limits: BatchLimits,
}

impl<'a, M: Matcher> BatchProcessor<'a, M> {
    /// 새 프로세서를 생성합니다.
    pub fn new(
        services: &'a [ServiceDefinition],
        decoders: &'a CompiledDecoders<M>,
        limits: BatchLimits,
    ) -> Self {
        Self {
            services,
            decoders,
            limits,
        }
    }

    /// 여러 줄 입력을 분류합니다.
    ///
    /// # Errors
    /// - 입력이 `max_input_bytes` 를 넘는 경우 [`EngineError::InputTooLarge`]
    /// - 처리 기한을 넘긴 경우 [`EngineError::DeadlineExceeded`]
    pub fn process(&self, raw: &str) -> Result<Vec<MatchResult>, EngineError> {
        self.limits.check_input(raw)?;

        let started = Instant::now();
        let mut results = Vec::new();

        for line in split_lines(raw) {
            if let Some(deadline) = self.limits.deadline
                && started.elapsed() > deadline
            {
                use logsift_core::metrics as m;
                metrics::counter!(m::ENGINE_BATCH_DEADLINE_EXCEEDED_TOTAL).increment(1);
                return Err(EngineError::DeadlineExceeded {
                    deadline_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                    processed: results.len(),
                });
            }
            results.push(self.classify(line));
        }

        let matched = results.iter().filter(|r| r.is_success()).count();
        {
            use logsift_core::metrics as m;
            metrics::counter!(m::ENGINE_LINES_TOTAL).increment(results.len() as u64);
            metrics::counter!(m::ENGINE_LINES_MATCHED_TOTAL).increment(matched as u64);
            metrics::histogram!(m::ENGINE_BATCH_DURATION_SECONDS)
                .record(started.elapsed().as_secs_f64());
        }

        debug!(
            lines = results.len(),
            matched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch classified"
        );

        Ok(results)
    }

    /// 한 라인을 분류합니다.
    pub fn classify(&self, line: &str) -> MatchResult {
        if line.len() > self.limits.max_line_bytes {
            warn!(
                line_bytes = line.len(),
                max_line_bytes = self.limits.max_line_bytes,
                "line exceeds length limit, skipping evaluation"
            );
            use logsift_core::metrics as m;
            metrics::counter!(m::ENGINE_LINES_OVERSIZED_TOTAL).increment(1);
            return MatchResult::no_match(line);
        }

        let mut candidates = Prefilter::candidates(line, self.services);
        let Some(first) = candidates.next() else {
            return MatchResult::no_match(line);
        };

        if let Some(result) = self.try_service(line, first) {
            return result;
        }

        if self.limits.service_fallthrough {
            for service in candidates {
                if let Some(result) = self.try_service(line, service) {
                    return result;
                }
            }
        }

        MatchResult::no_match(line)
    }

    fn try_service(&self, line: &str, service: &ServiceDefinition) -> Option<MatchResult> {
        self.decoders
            .match_line(line, &service.id)
            .map(|(decoder, fields)| {
                MatchResult::success(line, service.name.as_str(), decoder.name.as_str(), fields)
            })
    }
}
