//! 스냅샷 검증 모듈.
//!
//! 저장된 스냅샷에서 섹터/산업이 확인되지 않은 종목 비율과 섹터 분포를 집계합니다.
//! 미확인 종목이 절반을 넘으면 비정상 수집으로 판단합니다.

use std::collections::HashMap;

use ticker_data::TickerSnapshot;

/// 미확인 종목 샘플 수
const UNRESOLVED_SAMPLE: usize = 10;
/// 섹터 분포 상위 N개
const TOP_SECTORS: usize = 10;

/// 스냅샷 검증 결과
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub total: usize,
    pub resolved: usize,
    /// 섹터 또는 산업이 없는 종목 (심볼 순)
    pub unresolved: Vec<String>,
    /// (섹터, 종목 수) 상위 목록
    pub top_sectors: Vec<(String, usize)>,
}

impl VerifyReport {
    /// 미확인 비율이 50% 이하이면 정상
    pub fn is_healthy(&self) -> bool {
        self.unresolved.len() * 2 <= self.total
    }

    /// 미확인 종목 앞부분
    pub fn unresolved_sample(&self) -> &[String] {
        let n = self.unresolved.len().min(UNRESOLVED_SAMPLE);
        &self.unresolved[..n]
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            resolved = self.resolved,
            unresolved = self.unresolved.len(),
            healthy = self.is_healthy(),
            "스냅샷 검증 완료"
        );
    }
}

/// 스냅샷 검증
pub fn verify_snapshot(snapshot: &TickerSnapshot) -> VerifyReport {
    let unresolved: Vec<String> = snapshot
        .iter()
        .filter(|r| !r.is_resolved())
        .map(|r| r.symbol.clone())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in snapshot.iter() {
        *counts.entry(record.sector.as_deref().unwrap_or("n/a")).or_default() += 1;
    }

    let mut top_sectors: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(sector, count)| (sector.to_string(), count))
        .collect();
    top_sectors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_sectors.truncate(TOP_SECTORS);

    VerifyReport {
        total: snapshot.len(),
        resolved: snapshot.len() - unresolved.len(),
        unresolved,
        top_sectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticker_data::TickerRecord;

    fn record(symbol: &str, sector: Option<&str>, industry: Option<&str>) -> TickerRecord {
        TickerRecord {
            sector: sector.map(String::from),
            industry: industry.map(String::from),
            ..TickerRecord::empty(symbol)
        }
    }

    #[test]
    fn test_verify_counts_and_distribution() {
        let mut snapshot = TickerSnapshot::new();
        snapshot.insert(record("AAPL", Some("Technology"), Some("Consumer Electronics")));
        snapshot.insert(record("MSFT", Some("Technology"), Some("Software")));
        snapshot.insert(record("JPM", Some("Financial Services"), Some("Banks")));
        snapshot.insert(record("QQQ", None, None));

        let report = verify_snapshot(&snapshot);

        assert_eq!(report.total, 4);
        assert_eq!(report.resolved, 3);
        assert_eq!(report.unresolved, vec!["QQQ".to_string()]);
        assert_eq!(report.top_sectors[0], ("Technology".to_string(), 2));
        assert_eq!(report.top_sectors.len(), 3);
        assert!(report.is_healthy());
    }

    #[test]
    fn test_mostly_unresolved_is_unhealthy() {
        let mut snapshot = TickerSnapshot::new();
        snapshot.insert(record("A", Some("Technology"), None));
        snapshot.insert(record("B", None, None));
        snapshot.insert(record("C", Some("Energy"), Some("Oil & Gas")));

        let report = verify_snapshot(&snapshot);
        assert_eq!(report.unresolved.len(), 2);
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_empty_snapshot_is_healthy() {
        let report = verify_snapshot(&TickerSnapshot::new());
        assert_eq!(report.total, 0);
        assert!(report.is_healthy());
        assert!(report.unresolved_sample().is_empty());
    }
}
