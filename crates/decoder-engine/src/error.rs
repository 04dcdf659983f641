//! 디코딩 엔진 에러 타입
//!
//! [`EngineError`]는 엔진 호출 단위에서 발생하는 에러를 표현합니다.
//! 패턴 컴파일/평가 에러는 엔진 내부에서 복구되어 해당 디코더를 "매칭 안 됨"으로
//! 처리하는 데 쓰이며, 호출 전체를 실패시키는 것은 입력 한도, 처리 기한,
//! Rule Store 조회 실패뿐입니다.

use logsift_core::error::{LogsiftError, StoreError};

/// 디코딩 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// 패턴 컴파일 실패 (문법 오류, 미지원 구문, 크기 한도 초과)
    #[error("failed to compile pattern '{pattern}': {reason}")]
    PatternCompile {
        /// 패턴 원문
        pattern: String,
        /// 실패 사유
        reason: String,
    },

    /// 패턴 평가 실패
    #[error("failed to evaluate pattern: {reason}")]
    PatternEval {
        /// 실패 사유
        reason: String,
    },

    /// 배치 입력 크기 한도 초과
    #[error("input too large: {size} bytes (max: {max})")]
    InputTooLarge {
        /// 입력 크기 (바이트)
        size: usize,
        /// 허용 최대 크기 (바이트)
        max: usize,
    },

    /// 배치 처리 기한 초과
    #[error("batch deadline of {deadline_ms}ms exceeded after {processed} lines")]
    DeadlineExceeded {
        /// 설정된 기한 (밀리초)
        deadline_ms: u64,
        /// 기한 초과 시점까지 처리한 라인 수
        processed: usize,
    },

    /// 존재하지 않거나 비활성 디코더
    #[error("decoder not found: {decoder_id}")]
    DecoderNotFound {
        /// 요청한 디코더 ID
        decoder_id: String,
    },

    /// blocking 작업 실행 실패
    #[error("engine task failed: {0}")]
    Task(String),

    /// Rule Store 조회 실패
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EngineError> for LogsiftError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(e) => LogsiftError::Store(e),
            other => LogsiftError::Engine(other.to_string()),
        }
    }
}
