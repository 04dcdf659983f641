//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logsift_`
//! - 모듈명: `engine_`, `integrity_`, `store_`, `http_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logsift_core::metrics::ENGINE_LINES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (passed, failed)
pub const LABEL_RESULT: &str = "result";

/// 조회 연산 레이블 키 (services, decoders, fixtures)
pub const LABEL_OPERATION: &str = "operation";

/// HTTP 경로 레이블 키
pub const LABEL_ROUTE: &str = "route";

/// HTTP 상태 코드 레이블 키
pub const LABEL_STATUS: &str = "status";

// ─── Engine 메트릭 ──────────────────────────────────────────────────

/// Engine: 분류한 전체 라인 수 (counter)
pub const ENGINE_LINES_TOTAL: &str = "logsift_engine_lines_total";

/// Engine: Success 로 분류된 라인 수 (counter)
pub const ENGINE_LINES_MATCHED_TOTAL: &str = "logsift_engine_lines_matched_total";

/// Engine: 길이 한도 초과로 평가 없이 No Match 처리된 라인 수 (counter)
pub const ENGINE_LINES_OVERSIZED_TOTAL: &str = "logsift_engine_lines_oversized_total";

/// Engine: 패턴 컴파일 실패 수 (counter)
pub const ENGINE_PATTERN_COMPILE_ERRORS_TOTAL: &str =
    "logsift_engine_pattern_compile_errors_total";

/// Engine: 패턴 평가 실패 수 (counter)
pub const ENGINE_PATTERN_EVAL_ERRORS_TOTAL: &str = "logsift_engine_pattern_eval_errors_total";

/// Engine: 배치 처리 소요 시간 (histogram, 초)
pub const ENGINE_BATCH_DURATION_SECONDS: &str = "logsift_engine_batch_duration_seconds";

/// Engine: 기한 초과로 실패한 배치 수 (counter)
pub const ENGINE_BATCH_DEADLINE_EXCEEDED_TOTAL: &str =
    "logsift_engine_batch_deadline_exceeded_total";

// ─── Integrity 메트릭 ───────────────────────────────────────────────

/// Integrity: 평가한 디코더 수 (counter, label: result)
pub const INTEGRITY_DECODERS_TOTAL: &str = "logsift_integrity_decoders_total";

/// Integrity: 테스트 케이스가 없는 디코더 수 (counter)
pub const INTEGRITY_UNTESTED_DECODERS_TOTAL: &str = "logsift_integrity_untested_decoders_total";

/// Integrity: 실행 소요 시간 (histogram, 초)
pub const INTEGRITY_RUN_DURATION_SECONDS: &str = "logsift_integrity_run_duration_seconds";

// ─── Rule Store 메트릭 ──────────────────────────────────────────────

/// Rule Store: 조회 실패 수 (counter, label: operation)
pub const STORE_FETCH_ERRORS_TOTAL: &str = "logsift_store_fetch_errors_total";

// ─── HTTP / Daemon 메트릭 ───────────────────────────────────────────

/// HTTP: 처리한 요청 수 (counter, labels: route, status)
pub const HTTP_REQUESTS_TOTAL: &str = "logsift_http_requests_total";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "logsift_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 배치/무결성 실행 소요 시간 히스토그램 버킷 (초)
///
/// 100us ~ 10s 범위
pub const RUN_DURATION_BUCKETS: [f64; 10] = [
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 10.0,
];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logsift-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Engine
    describe_counter!(
        ENGINE_LINES_TOTAL,
        "Total number of non-blank log lines classified"
    );
    describe_counter!(
        ENGINE_LINES_MATCHED_TOTAL,
        "Total number of log lines classified as Success"
    );
    describe_counter!(
        ENGINE_LINES_OVERSIZED_TOTAL,
        "Total number of log lines skipped for exceeding the line length limit"
    );
    describe_counter!(
        ENGINE_PATTERN_COMPILE_ERRORS_TOTAL,
        "Total number of decoder patterns that failed to compile"
    );
    describe_counter!(
        ENGINE_PATTERN_EVAL_ERRORS_TOTAL,
        "Total number of decoder pattern evaluation failures"
    );
    describe_histogram!(
        ENGINE_BATCH_DURATION_SECONDS,
        "Time to classify a single batch in seconds"
    );
    describe_counter!(
        ENGINE_BATCH_DEADLINE_EXCEEDED_TOTAL,
        "Total number of batches aborted by the batch deadline"
    );

    // Integrity
    describe_counter!(
        INTEGRITY_DECODERS_TOTAL,
        "Decoders evaluated by the integrity test, by result"
    );
    describe_counter!(
        INTEGRITY_UNTESTED_DECODERS_TOTAL,
        "Decoders evaluated by the integrity test without any fixture"
    );
    describe_histogram!(
        INTEGRITY_RUN_DURATION_SECONDS,
        "Time to complete a single integrity test run in seconds"
    );

    // Rule Store
    describe_counter!(
        STORE_FETCH_ERRORS_TOTAL,
        "Total number of failed rule store fetches, by operation"
    );

    // HTTP / Daemon
    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests handled, by route and status"
    );
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
