//! 조회 결과 집계 모듈.

use std::collections::HashSet;

use ticker_data::{LookupError, TickerRecord, TickerSnapshot};

/// 종목별 조회 결과를 하나의 스냅샷으로 모음.
///
/// 성공한 종목은 스냅샷에, 실패한 종목은 실패 목록에 들어갑니다.
/// 한 종목의 결과는 한 번만 받아들입니다.
#[derive(Debug, Default)]
pub struct SnapshotAggregator {
    snapshot: TickerSnapshot,
    failures: Vec<LookupError>,
    seen: HashSet<String>,
}

impl SnapshotAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 결과 추가. 이미 결과가 있는 종목이면 무시하고 `false` 반환.
    pub fn record(&mut self, result: Result<TickerRecord, LookupError>) -> bool {
        let symbol = match &result {
            Ok(record) => &record.symbol,
            Err(e) => &e.symbol,
        };

        if !self.seen.insert(symbol.clone()) {
            tracing::warn!(symbol = %symbol, "중복 결과 무시");
            return false;
        }

        match result {
            Ok(record) => {
                self.snapshot.insert(record);
            }
            Err(e) => self.failures.push(e),
        }
        true
    }

    /// 결과를 받은 종목 수
    pub fn attempted(&self) -> usize {
        self.seen.len()
    }

    /// (스냅샷, 실패 목록) 반환
    pub fn finish(self) -> (TickerSnapshot, Vec<LookupError>) {
        (self.snapshot, self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_failure_are_split() {
        let mut aggregator = SnapshotAggregator::new();
        assert!(aggregator.record(Ok(TickerRecord::empty("AAPL"))));
        assert!(aggregator.record(Err(LookupError::not_found("ZZZZFAKE"))));

        assert_eq!(aggregator.attempted(), 2);
        let (snapshot, failures) = aggregator.finish();
        assert!(snapshot.contains("AAPL"));
        assert!(!snapshot.contains("ZZZZFAKE"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].symbol, "ZZZZFAKE");
    }

    #[test]
    fn test_second_result_for_symbol_is_rejected() {
        let mut aggregator = SnapshotAggregator::new();
        assert!(aggregator.record(Err(LookupError::not_found("AAPL"))));
        assert!(!aggregator.record(Ok(TickerRecord::empty("AAPL"))));

        let (snapshot, failures) = aggregator.finish();
        assert!(snapshot.is_empty());
        assert_eq!(failures.len(), 1);
    }
}
