//! 디코더 매처 -- 서비스의 디코더를 순서대로 평가하고 필드를 추출합니다.
//!
//! 패턴은 호출 단위마다 한 번만 컴파일합니다 ([`CompiledDecoders::compile`]).
//! 컴파일에 실패한 디코더는 한 번 경고 로그를 남기고 해당 호출 동안
//! "매칭 안 됨"으로 취급되며, 같은 서비스의 다음 디코더 평가를 막지 않습니다.

use std::collections::HashMap;

use logsift_core::types::{DecoderDefinition, Fields};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::matcher::{Matcher, PatternCompiler};

/// 컴파일된 디코더
pub struct CompiledDecoder<M> {
    /// 디코더 ID
    pub id: String,
    /// 소속 서비스 ID
    pub service_id: String,
    /// 디코더 이름
    pub name: String,
    /// 컴파일 실패 시 `None` (매칭 안 됨)
    matcher: Option<M>,
}

impl<M: Matcher> CompiledDecoder<M> {
    /// 패턴을 컴파일하여 디코더를 생성합니다.
    ///
    /// 컴파일 실패는 전파하지 않고 경고 로그 후 "매칭 안 됨" 디코더를 만듭니다.
    pub fn compile<C>(compiler: &C, definition: &DecoderDefinition) -> Self
    where
        C: PatternCompiler<Matcher = M>,
    {
        let matcher = match compiler.compile(&definition.pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                warn!(
                    decoder = %definition.name,
                    decoder_id = %definition.id,
                    error = %e,
                    "decoder pattern failed to compile, treating as never matching"
                );
                use logsift_core::metrics as m;
                metrics::counter!(m::ENGINE_PATTERN_COMPILE_ERRORS_TOTAL).increment(1);
                None
            }
        };

        Self {
            id: definition.id.clone(),
            service_id: definition.service_id.clone(),
            name: definition.name.clone(),
            matcher,
        }
    }

    /// 패턴이 정상적으로 컴파일되었는지 여부
    pub fn is_compiled(&self) -> bool {
        self.matcher.is_some()
    }

    /// 라인에 대해 디코더를 평가합니다.
    ///
    /// 컴파일에 실패한 디코더는 항상 `Ok(None)` 입니다.
    pub fn evaluate(&self, line: &str) -> Result<Option<Fields>, EngineError> {
        match &self.matcher {
            Some(matcher) => matcher.try_match(line),
            None => Ok(None),
        }
    }
}

/// 한 호출 동안 사용할 컴파일된 디코더 집합 (서비스별, 순서 유지)
pub struct CompiledDecoders<M> {
    by_service: HashMap<String, Vec<CompiledDecoder<M>>>,
    total: usize,
    compile_errors: usize,
}

impl<M: Matcher> CompiledDecoders<M> {
    /// 디코더 목록을 컴파일합니다. 서비스 내 순서는 입력 순서를 따릅니다.
    pub fn compile<C>(compiler: &C, decoders: &[DecoderDefinition]) -> Self
    where
        C: PatternCompiler<Matcher = M>,
    {
        let mut by_service: HashMap<String, Vec<CompiledDecoder<M>>> = HashMap::new();
        let mut compile_errors = 0;

        for definition in decoders {
            let compiled = CompiledDecoder::compile(compiler, definition);
            if !compiled.is_compiled() {
                compile_errors += 1;
            }
            by_service
                .entry(definition.service_id.clone())
                .or_default()
                .push(compiled);
        }

        debug!(
            decoders = decoders.len(),
            compile_errors, "compiled decoder patterns"
        );

        Self {
            by_service,
            total: decoders.len(),
            compile_errors,
        }
    }

    /// 서비스에 속한 디코더 (평가 순서)
    pub fn for_service(&self, service_id: &str) -> &[CompiledDecoder<M>] {
        self.by_service
            .get(service_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 서비스의 디코더를 순서대로 평가하여 첫 번째 매칭 결과를 반환합니다.
    ///
    /// 평가 에러는 로그를 남기고 다음 디코더로 넘어갑니다.
    pub fn match_line(
        &self,
        line: &str,
        service_id: &str,
    ) -> Option<(&CompiledDecoder<M>, Fields)> {
        for decoder in self.for_service(service_id) {
            match decoder.evaluate(line) {
                Ok(Some(fields)) => return Some((decoder, fields)),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        decoder = %decoder.name,
                        error = %e,
                        "decoder evaluation failed, trying next decoder"
                    );
                    use logsift_core::metrics as m;
                    metrics::counter!(m::ENGINE_PATTERN_EVAL_ERRORS_TOTAL).increment(1);
                }
            }
        }
        None
    }

    /// 컴파일한 디코더 수
    pub fn len(&self) -> usize {
        self.total
    }

    /// 디코더가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// 컴파일에 실패한 디코더 수
    pub fn compile_errors(&self) -> usize {
        self.compile_errors
    }
}
