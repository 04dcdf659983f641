//! 설정 관리 -- logsift.toml 파싱 및 런타임 설정
//!
//! [`LogsiftConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGSIFT_ENGINE_MAX_LINE_BYTES=8192` 형식)
//! 3. 설정 파일 (`logsift.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logsift_core::error::LogsiftError> {
//! use logsift_core::config::LogsiftConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogsiftConfig::load("logsift.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogsiftConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogsiftError};

/// logsift 통합 설정
///
/// `logsift.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 구성 요소는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsiftConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 디코딩 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// Rule Store 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// Prometheus 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogsiftConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogsiftError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogsiftError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogsiftError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogsiftError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogsiftError> {
        toml::from_str(toml_str).map_err(|e| {
            LogsiftError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGSIFT_{SECTION}_{FIELD}`
    /// 예: `LOGSIFT_STORE_RULES_PATH=/srv/rules.yml`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGSIFT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGSIFT_GENERAL_LOG_FORMAT");

        // Engine
        override_usize(
            &mut self.engine.max_input_bytes,
            "LOGSIFT_ENGINE_MAX_INPUT_BYTES",
        );
        override_usize(
            &mut self.engine.max_line_bytes,
            "LOGSIFT_ENGINE_MAX_LINE_BYTES",
        );
        override_u64(
            &mut self.engine.batch_deadline_ms,
            "LOGSIFT_ENGINE_BATCH_DEADLINE_MS",
        );
        override_usize(
            &mut self.engine.regex_size_limit,
            "LOGSIFT_ENGINE_REGEX_SIZE_LIMIT",
        );
        override_usize(
            &mut self.engine.regex_dfa_size_limit,
            "LOGSIFT_ENGINE_REGEX_DFA_SIZE_LIMIT",
        );
        override_u32(
            &mut self.engine.regex_nest_limit,
            "LOGSIFT_ENGINE_REGEX_NEST_LIMIT",
        );
        override_bool(
            &mut self.engine.service_fallthrough,
            "LOGSIFT_ENGINE_SERVICE_FALLTHROUGH",
        );

        // Store
        override_string(&mut self.store.rules_path, "LOGSIFT_STORE_RULES_PATH");

        // Server
        override_string(&mut self.server.listen_addr, "LOGSIFT_SERVER_LISTEN_ADDR");
        override_u16(&mut self.server.port, "LOGSIFT_SERVER_PORT");

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGSIFT_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "LOGSIFT_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "LOGSIFT_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogsiftError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        self.engine.validate()?;

        if self.store.rules_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.rules_path".to_owned(),
                reason: "rules path must not be empty".to_owned(),
            }
            .into());
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "metrics.port".to_owned(),
                    reason: "must be greater than 0".to_owned(),
                }
                .into());
            }
            if self.metrics.port == self.server.port {
                return Err(ConfigError::InvalidValue {
                    field: "metrics.port".to_owned(),
                    reason: "must differ from server.port".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 디코딩 엔진 설정
///
/// 사용자가 작성한 정규식과 외부 로그 입력에 대한 자원 한도를 정의합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 배치 입력 최대 크기 (바이트)
    pub max_input_bytes: usize,
    /// 정규식 평가 대상 라인 최대 길이 (바이트). 초과 라인은 No Match
    pub max_line_bytes: usize,
    /// 배치 전체 처리 기한 (밀리초, 0이면 무제한)
    pub batch_deadline_ms: u64,
    /// 컴파일된 정규식 프로그램 최대 크기 (바이트)
    pub regex_size_limit: usize,
    /// 지연 DFA 캐시 최대 크기 (바이트)
    pub regex_dfa_size_limit: usize,
    /// 정규식 중첩 깊이 한도
    pub regex_nest_limit: u32,
    /// 선택된 서비스의 디코더가 모두 실패하면 다음 후보 서비스를 시도
    pub service_fallthrough: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 10 * 1024 * 1024, // 10MB
            max_line_bytes: 64 * 1024,         // 64KB
            batch_deadline_ms: 5_000,
            regex_size_limit: 1024 * 1024,         // 1MB
            regex_dfa_size_limit: 2 * 1024 * 1024, // 2MB
            regex_nest_limit: 100,
            service_fallthrough: false,
        }
    }
}

impl EngineConfig {
    /// 엔진 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_INPUT_BYTES: usize = 256 * 1024 * 1024;
        const MAX_REGEX_SIZE_LIMIT: usize = 64 * 1024 * 1024;

        if self.max_input_bytes == 0 || self.max_input_bytes > MAX_INPUT_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_input_bytes".to_owned(),
                reason: format!("must be 1-{MAX_INPUT_BYTES}"),
            });
        }

        if self.max_line_bytes == 0 || self.max_line_bytes > self.max_input_bytes {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_line_bytes".to_owned(),
                reason: "must be greater than 0 and not exceed max_input_bytes".to_owned(),
            });
        }

        if self.regex_size_limit == 0 || self.regex_size_limit > MAX_REGEX_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "engine.regex_size_limit".to_owned(),
                reason: format!("must be 1-{MAX_REGEX_SIZE_LIMIT}"),
            });
        }

        if self.regex_dfa_size_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.regex_dfa_size_limit".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.regex_nest_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.regex_nest_limit".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// Rule Store 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// YAML 규칙 파일 경로
    pub rules_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            rules_path: "/etc/logsift/rules.yml".to_owned(),
        }
    }
}

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
