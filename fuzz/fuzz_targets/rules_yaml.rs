#![no_main]

use libfuzzer_sys::fuzz_target;

use logsift_engine::RuleSet;

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    // 파싱/검증은 에러를 반환할 수 있지만 패닉은 안 됨
    if let Ok(rules) = RuleSet::from_yaml(content, "fuzz") {
        let snapshot = rules.snapshot();
        assert!(snapshot.decoders.len() <= rules.decoder_count());
        let _ = rules.decoders_with_fixtures();
    }
});
