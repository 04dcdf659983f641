//! 배치 분류 벤치마크
//!
//! 패턴 컴파일 비용과 라인 수/서비스 수에 따른 배치 분류 성능을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logsift_core::types::{DecoderDefinition, ServiceDefinition};
use logsift_engine::{BatchLimits, BatchProcessor, CompiledDecoders, RegexCompiler, RuleSet};

const RULES: &str = include_str!("../../../rules/decoders.yml");

const SAMPLE_LINES: &[&str] = &[
    "Aug 1 host sshd[42]: Failed password for root from 10.0.0.5 port 22 ssh2",
    "Aug 1 host sshd[7]: Accepted publickey for deploy from 10.0.0.7 port 50000 ssh2",
    "Aug 1 host sudo:    alice : TTY=pts/0 ; PWD=/home/alice ; USER=root ; COMMAND=/bin/ls",
    r#"10.1.2.3 - - [01/Aug/2024:10:00:00 +0000] "GET /index.html HTTP/1.1" 200 512 "-" "curl/8.0""#,
    "Aug 1 host kernel: eth0: link up",
];

fn create_batch(lines: usize) -> String {
    (0..lines)
        .map(|i| SAMPLE_LINES[i % SAMPLE_LINES.len()])
        .collect::<Vec<_>>()
        .join("\n")
}

/// 키워드가 모두 다른 서비스 `count` 개 + 마지막에 실제 SSH 서비스
fn create_wide_rules(count: usize) -> (Vec<ServiceDefinition>, Vec<DecoderDefinition>) {
    let mut services = Vec::with_capacity(count + 1);
    let mut decoders = Vec::with_capacity(count + 1);
    for i in 0..count {
        services.push(ServiceDefinition {
            id: format!("svc{i}"),
            name: format!("Service{i}"),
            prefilter_keyword: format!("kw{i}:"),
            is_active: true,
            priority: 0,
        });
        decoders.push(DecoderDefinition {
            id: format!("dec{i}"),
            service_id: format!("svc{i}"),
            name: format!("Decoder{i}"),
            pattern: format!(r"kw{i}: (?<value>\S+)"),
            is_active: true,
            priority: 0,
            log_example: None,
        });
    }
    services.push(ServiceDefinition {
        id: "ssh".to_owned(),
        name: "SSH".to_owned(),
        prefilter_keyword: "sshd".to_owned(),
        is_active: true,
        priority: 0,
    });
    decoders.push(DecoderDefinition {
        id: "ssh-failed".to_owned(),
        service_id: "ssh".to_owned(),
        name: "FailedPassword".to_owned(),
        pattern: r"Failed password for (?<user>\S+) from (?<ip>[\d.]+)".to_owned(),
        is_active: true,
        priority: 0,
        log_example: None,
    });
    (services, decoders)
}

fn bench_compile(c: &mut Criterion) {
    let snapshot = RuleSet::from_yaml(RULES, "bench")
        .expect("shipped rules are valid")
        .snapshot();
    let compiler = RegexCompiler::default();

    c.bench_function("compile_shipped_rules", |b| {
        b.iter(|| CompiledDecoders::compile(&compiler, black_box(&snapshot.decoders)))
    });
}

fn bench_batch_lines(c: &mut Criterion) {
    let snapshot = RuleSet::from_yaml(RULES, "bench")
        .expect("shipped rules are valid")
        .snapshot();
    let decoders = CompiledDecoders::compile(&RegexCompiler::default(), &snapshot.decoders);
    let processor = BatchProcessor::new(&snapshot.services, &decoders, BatchLimits::default());

    let mut group = c.benchmark_group("batch_lines");
    for lines in [10, 100, 1_000] {
        let batch = create_batch(lines);
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &batch, |b, batch| {
            b.iter(|| processor.process(black_box(batch)))
        });
    }
    group.finish();
}

fn bench_service_scaling(c: &mut Criterion) {
    let batch = create_batch(100);

    let mut group = c.benchmark_group("service_scaling");
    for count in [1, 10, 100] {
        let (services, definitions) = create_wide_rules(count);
        let decoders = CompiledDecoders::compile(&RegexCompiler::default(), &definitions);
        let processor = BatchProcessor::new(&services, &decoders, BatchLimits::default());

        group.bench_with_input(BenchmarkId::from_parameter(count), &batch, |b, batch| {
            b.iter(|| processor.process(black_box(batch)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_compile,
    bench_batch_lines,
    bench_service_scaling
);
criterion_main!(benches);
