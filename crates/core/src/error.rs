//! 에러 타입 -- 도메인별 에러 정의

/// logsift 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogsiftError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Rule Store 조회 에러
    #[error("rule store error: {0}")]
    Store(#[from] StoreError),

    /// 디코딩 엔진 에러
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Rule Store 에러
///
/// 스토어를 사용할 수 없거나 규칙 문서가 잘못된 경우 발생합니다.
/// 호출 단위 전체를 실패시키며, 부분 결과는 반환하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 스토어에 접근할 수 없음 (파일 없음, 연결 실패 등)
    #[error("rule store unavailable: {source_name}: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// 규칙 문서 파싱 실패
    #[error("malformed rule document: {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },

    /// 규칙 유효성 검증 실패
    #[error("invalid rule '{rule_id}': {reason}")]
    Validation { rule_id: String, reason: String },

    /// 규칙 수 한도 초과
    #[error("too many rules in {source_name}: {count} (max: {max})")]
    TooManyRules {
        source_name: String,
        count: usize,
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_logsift_error() {
        let err = StoreError::Unavailable {
            source_name: "/etc/logsift/rules.yml".to_owned(),
            reason: "not found".to_owned(),
        };
        let top: LogsiftError = err.into();
        assert!(matches!(top, LogsiftError::Store(_)));
        assert!(top.to_string().contains("rules.yml"));
    }

    #[test]
    fn validation_error_display() {
        let err = StoreError::Validation {
            rule_id: "ssh-failed".to_owned(),
            reason: "pattern must not be empty".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ssh-failed"));
        assert!(msg.contains("pattern must not be empty"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "engine.max_line_bytes".to_owned(),
            reason: "must be greater than 0".to_owned(),
        };
        assert!(err.to_string().contains("engine.max_line_bytes"));
    }
}
