//! 무결성 테스트 러너 -- 디코더를 저장된 fixture 로 회귀 검증합니다.
//!
//! 각 디코더의 fixture 를 순서대로 평가하여 매칭 여부와 추출 필드가
//! 기대값과 같은지 확인합니다. 첫 번째 실패 fixture 에서 해당 디코더는
//! 실패로 확정되며 남은 fixture 는 평가하지 않습니다.
//!
//! 러너는 입력 스냅샷의 순수 함수입니다. 같은 입력은 항상 같은 보고서를 만듭니다.
//! fixture 단위의 실패 사유는 `tracing` 으로만 남고 보고서에는 디코더 단위만 기록됩니다.

use std::collections::BTreeMap;
use std::time::Instant;

use logsift_core::types::{DecoderFixtures, DecoderRef, DecoderTestCase, Fields, TestReport};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::matcher::{Matcher, PatternCompiler};

/// 디코더 하나의 판정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// 모든 fixture 통과
    Passed,
    /// fixture 가 없음 (보고서에서는 통과로 집계)
    Untested,
    /// fixture 실패
    Failed {
        /// 처음 실패한 fixture ID
        fixture_id: String,
        /// 실패 사유
        reason: String,
    },
}

/// 무결성 테스트 러너
pub struct IntegrityRunner<'c, C> {
    compiler: &'c C,
}

impl<'c, C: PatternCompiler> IntegrityRunner<'c, C> {
    /// 새 러너를 생성합니다.
    pub fn new(compiler: &'c C) -> Self {
        Self { compiler }
    }

    /// 모든 디코더를 평가하여 보고서를 만듭니다.
    ///
    /// 디코더 순서는 입력 순서를 따르며 `passed + failed == decoders.len()` 입니다.
    pub fn run(&self, decoders: &[DecoderFixtures]) -> TestReport {
        let started = Instant::now();
        let mut report = TestReport::default();

        for decoder in decoders {
            let decoder_ref = DecoderRef {
                decoder_name: decoder.decoder_name.clone(),
                service_name: decoder.service_name.clone(),
            };

            match self.evaluate(decoder) {
                Verdict::Passed => report.passed += 1,
                Verdict::Untested => {
                    report.passed += 1;
                    report.untested.push(decoder_ref);
                }
                Verdict::Failed { fixture_id, reason } => {
                    info!(
                        decoder = %decoder.decoder_name,
                        service = %decoder.service_name,
                        fixture_id = %fixture_id,
                        reason = %reason,
                        "decoder failed integrity test"
                    );
                    report.failed += 1;
                    report.failures.push(decoder_ref);
                }
            }
        }

        {
            use logsift_core::metrics as m;
            metrics::counter!(m::INTEGRITY_DECODERS_TOTAL, m::LABEL_RESULT => "passed")
                .increment(report.passed as u64);
            metrics::counter!(m::INTEGRITY_DECODERS_TOTAL, m::LABEL_RESULT => "failed")
                .increment(report.failed as u64);
            metrics::counter!(m::INTEGRITY_UNTESTED_DECODERS_TOTAL)
                .increment(report.untested.len() as u64);
            metrics::histogram!(m::INTEGRITY_RUN_DURATION_SECONDS)
                .record(started.elapsed().as_secs_f64());
        }

        info!(
            passed = report.passed,
            failed = report.failed,
            untested = report.untested.len(),
            "integrity test completed"
        );

        report
    }

    /// 디코더 하나만 평가합니다.
    ///
    /// # Errors
    /// `decoder_id` 가 목록에 없으면 [`EngineError::DecoderNotFound`]
    pub fn run_for_decoder(
        &self,
        decoders: &[DecoderFixtures],
        decoder_id: &str,
    ) -> Result<TestReport, EngineError> {
        let decoder = decoders
            .iter()
            .find(|d| d.decoder_id == decoder_id)
            .ok_or_else(|| EngineError::DecoderNotFound {
                decoder_id: decoder_id.to_owned(),
            })?;
        Ok(self.run(std::slice::from_ref(decoder)))
    }

    /// 디코더 하나의 fixture 를 순서대로 평가합니다.
    pub fn evaluate(&self, decoder: &DecoderFixtures) -> Verdict {
        if decoder.fixtures.is_empty() {
            return Verdict::Untested;
        }

        let matcher = match self.compiler.compile(&decoder.pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                warn!(
                    decoder = %decoder.decoder_name,
                    error = %e,
                    "decoder pattern failed to compile, treating as never matching"
                );
                use logsift_core::metrics as m;
                metrics::counter!(m::ENGINE_PATTERN_COMPILE_ERRORS_TOTAL).increment(1);
                None
            }
        };

        for fixture in &decoder.fixtures {
            if let Err(reason) = check_fixture(matcher.as_ref(), fixture) {
                return Verdict::Failed {
                    fixture_id: fixture.id.clone(),
                    reason,
                };
            }
        }

        Verdict::Passed
    }
}

fn check_fixture<M: Matcher>(matcher: Option<&M>, fixture: &DecoderTestCase) -> Result<(), String> {
    let outcome = match matcher {
        Some(matcher) => matcher
            .try_match(&fixture.log_sample)
            .map_err(|e| format!("evaluation failed: {e}"))?,
        None => None,
    };

    match (outcome, fixture.should_match) {
        (None, false) => Ok(()),
        (None, true) => Err("expected a match, got none".to_owned()),
        (Some(_), false) => Err("expected no match, got one".to_owned()),
        (Some(fields), true) => match &fixture.expected_output {
            Some(expected) => compare_fields(&fields, expected),
            None => Ok(()),
        },
    }
}

/// 추출 필드와 기대 출력을 비교합니다.
///
/// - 키 집합이 같아야 합니다 (`null` 기대값은 "그룹 없음"을 뜻함)
/// - 문자열은 정확히 같아야 합니다
/// - 숫자, 불리언은 텍스트 표현과 비교합니다
/// - 배열, 객체는 어떤 추출 값과도 같지 않습니다
pub fn compare_fields(
    extracted: &Fields,
    expected: &BTreeMap<String, Value>,
) -> Result<(), String> {
    for (key, want) in expected {
        let got = extracted.get(key);
        let equal = match (want, got) {
            (Value::Null, None) => true,
            (_, None) | (Value::Null, Some(_)) => false,
            (Value::String(s), Some(g)) => s == g,
            (Value::Number(n), Some(g)) => n.to_string() == *g,
            (Value::Bool(b), Some(g)) => b.to_string() == *g,
            (Value::Array(_) | Value::Object(_), Some(_)) => false,
        };
        if !equal {
            return Err(format!("field '{key}': expected {want}, got {got:?}"));
        }
    }

    if let Some(extra) = extracted.keys().find(|k| !expected.contains_key(*k)) {
        return Err(format!("unexpected field '{extra}'"));
    }

    Ok(())
}
