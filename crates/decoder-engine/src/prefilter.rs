//! Prefilter 매처 -- 키워드 부분 문자열로 후보 서비스를 좁힙니다.
//!
//! 정규식 평가 전에 대소문자를 구분하는 부분 문자열 검사만으로
//! 적용 불가능한 서비스를 걸러냅니다. 빈 키워드는 모든 라인에 매칭됩니다.

use logsift_core::types::ServiceDefinition;

/// Prefilter 매처
pub struct Prefilter;

impl Prefilter {
    /// 키워드가 라인에 포함된 첫 번째 서비스를 반환합니다.
    ///
    /// 서비스는 전달된 순서대로 검사하며, 먼저 만족한 서비스가 선택됩니다.
    pub fn select<'a>(
        line: &str,
        services: &'a [ServiceDefinition],
    ) -> Option<&'a ServiceDefinition> {
        Self::candidates(line, services).next()
    }

    /// 키워드가 라인에 포함된 모든 서비스를 순서대로 반환합니다.
    pub fn candidates<'a>(
        line: &str,
        services: &'a [ServiceDefinition],
    ) -> impl Iterator<Item = &'a ServiceDefinition> {
        services
            .iter()
            .filter(move |service| line.contains(service.prefilter_keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, keyword: &str) -> ServiceDefinition {
        ServiceDefinition {
            id: name.to_lowercase(),
            name: name.to_owned(),
            prefilter_keyword: keyword.to_owned(),
            is_active: true,
            priority: 0,
        }
    }

    #[test]
    fn selects_first_satisfied_service() {
        let services = vec![
            service("Nginx", "nginx"),
            service("SSH", "sshd"),
            service("Auth", "sshd"),
        ];
        let selected = Prefilter::select("Aug 1 sshd[42]: Accepted", &services).unwrap();
        assert_eq!(selected.name, "SSH");
    }

    #[test]
    fn keyword_is_case_sensitive() {
        let services = vec![service("SSH", "sshd")];
        assert!(Prefilter::select("Aug 1 SSHD: Accepted", &services).is_none());
    }

    #[test]
    fn no_service_matches() {
        let services = vec![service("SSH", "sshd")];
        assert!(Prefilter::select("not a log line", &services).is_none());
    }

    #[test]
    fn empty_keyword_matches_every_line() {
        let services = vec![service("CatchAll", "")];
        assert!(Prefilter::select("anything", &services).is_some());
    }

    #[test]
    fn candidates_preserve_order() {
        let services = vec![
            service("A", "x"),
            service("B", "nope"),
            service("C", "x"),
        ];
        let names: Vec<_> = Prefilter::candidates("xyz", &services)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
