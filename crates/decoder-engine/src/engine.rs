//! 엔진 코디네이터 -- 호출 단위로 스냅샷을 조회하고 배치 분류/무결성 테스트를 실행합니다.
//!
//! [`DecoderEngine`]은 호출 간 상태를 보관하지 않습니다. 매 호출마다
//! Rule Store 에서 스냅샷을 한 번 조회하고, 패턴을 컴파일하고, 결과를 반환한 뒤
//! 모두 버립니다. 따라서 여러 호출이 동시에 실행되어도 잠금이 필요 없습니다.
//!
//! 패턴 컴파일과 평가는 CPU 작업이므로 `spawn_blocking` 스레드에서 실행되며,
//! 비동기 워커는 Rule Store 조회만 담당합니다.

use logsift_core::config::EngineConfig;
use logsift_core::types::{MatchResult, TestReport};
use tracing::{Instrument, Span, info_span};
use uuid::Uuid;

use crate::batch::{BatchLimits, BatchProcessor};
use crate::decoder::CompiledDecoders;
use crate::error::EngineError;
use crate::integrity::IntegrityRunner;
use crate::matcher::{PatternCompiler, RegexCompiler};
use crate::store::RuleStore;

/// 디코딩 엔진
///
/// # 사용 예시
/// ```ignore
/// let store = YamlRuleStore::new("/etc/logsift/rules.yml");
/// let engine = DecoderEngine::new(store, &EngineConfig::default());
///
/// let results = engine.batch_decode("Aug 1 sshd: Failed password for root from 10.0.0.5").await?;
/// let report = engine.run_integrity_test().await?;
/// ```
pub struct DecoderEngine<S, C = RegexCompiler> {
    store: S,
    compiler: C,
    limits: BatchLimits,
}

impl<S: RuleStore> DecoderEngine<S, RegexCompiler> {
    /// 기본 정규식 컴파일러로 엔진을 생성합니다.
    pub fn new(store: S, config: &EngineConfig) -> Self {
        Self::with_compiler(store, RegexCompiler::from_config(config), config)
    }
}

impl<S: RuleStore, C: PatternCompiler + Clone + 'static> DecoderEngine<S, C> {
    /// 지정한 패턴 컴파일러로 엔진을 생성합니다.
    pub fn with_compiler(store: S, compiler: C, config: &EngineConfig) -> Self {
        Self {
            store,
            compiler,
            limits: BatchLimits::from_config(config),
        }
    }

    /// 주입된 Rule Store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 배치 처리 한도
    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    /// 여러 줄 입력을 분류합니다.
    ///
    /// # Errors
    /// - 입력 크기 한도 초과, 처리 기한 초과
    /// - Rule Store 조회 실패 (부분 결과 없음)
    pub async fn batch_decode(&self, raw: &str) -> Result<Vec<MatchResult>, EngineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch_decode", %run_id, input_bytes = raw.len());

        async {
            // 조회 전에 입력 크기부터 거름
            self.limits.check_input(raw)?;

            let snapshot = self.store.fetch_snapshot().await?;
            let compiler = self.compiler.clone();
            let limits = self.limits;
            let raw = raw.to_owned();

            run_blocking(move || {
                let decoders = CompiledDecoders::compile(&compiler, &snapshot.decoders);
                tracing::debug!(
                    services = snapshot.services.len(),
                    decoders = decoders.len(),
                    compile_errors = decoders.compile_errors(),
                    "rule snapshot ready"
                );

                BatchProcessor::new(&snapshot.services, &decoders, limits).process(&raw)
            })
            .await?
        }
        .instrument(span)
        .await
    }

    /// 모든 활성 디코더에 대해 무결성 테스트를 실행합니다.
    pub async fn run_integrity_test(&self) -> Result<TestReport, EngineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run_integrity_test", %run_id);

        async {
            let decoders = self.store.fetch_decoders_with_fixtures().await?;
            let compiler = self.compiler.clone();
            run_blocking(move || IntegrityRunner::new(&compiler).run(&decoders)).await
        }
        .instrument(span)
        .await
    }

    /// 디코더 하나에 대해 무결성 테스트를 실행합니다.
    ///
    /// # Errors
    /// 활성 디코더 중에 `decoder_id` 가 없으면 [`EngineError::DecoderNotFound`]
    pub async fn run_decoder_test(&self, decoder_id: &str) -> Result<TestReport, EngineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run_decoder_test", %run_id, decoder_id);

        async {
            let decoders = self.store.fetch_decoders_with_fixtures().await?;
            let compiler = self.compiler.clone();
            let decoder_id = decoder_id.to_owned();
            run_blocking(move || {
                IntegrityRunner::new(&compiler).run_for_decoder(&decoders, &decoder_id)
            })
            .await?
        }
        .instrument(span)
        .await
    }
}

/// CPU 작업을 blocking 스레드에서 실행합니다. 현재 span 은 그대로 이어집니다.
async fn run_blocking<T, F>(work: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| EngineError::Task(format!("spawn_blocking failed: {e}")))
}
