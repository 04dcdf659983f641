#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logsift_core::types::{DecoderDefinition, ServiceDefinition};
use logsift_engine::{BatchLimits, BatchProcessor, CompiledDecoders, RegexCompiler};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 서비스 목록 (최대 4개로 제한)
    services: Vec<FuzzService>,
    /// 분류 대상 원문
    raw: String,
    fallthrough: bool,
}

#[derive(Arbitrary, Debug)]
struct FuzzService {
    keyword: String,
    /// 디코더 패턴 (서비스당 최대 4개)
    patterns: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    let mut services = Vec::new();
    let mut decoders = Vec::new();

    for (i, service) in input.services.iter().take(4).enumerate() {
        let service_id = format!("svc{i}");
        services.push(ServiceDefinition {
            id: service_id.clone(),
            name: format!("Service{i}"),
            prefilter_keyword: service.keyword.clone(),
            is_active: true,
            priority: 0,
        });
        for (j, pattern) in service.patterns.iter().take(4).enumerate() {
            decoders.push(DecoderDefinition {
                id: format!("dec{i}-{j}"),
                service_id: service_id.clone(),
                name: format!("Decoder{i}-{j}"),
                pattern: pattern.clone(),
                is_active: true,
                priority: 0,
                log_example: None,
            });
        }
    }

    // 잘못된 패턴은 컴파일 실패 -> 매칭 안 됨으로 처리되어야 함
    let compiled = CompiledDecoders::compile(&RegexCompiler::default(), &decoders);
    let limits = BatchLimits {
        deadline: None,
        service_fallthrough: input.fallthrough,
        ..BatchLimits::default()
    };

    let Ok(results) = BatchProcessor::new(&services, &compiled, limits).process(&input.raw) else {
        return;
    };

    let expected = input
        .raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
    assert_eq!(results.len(), expected, "one result per non-blank line");
});
