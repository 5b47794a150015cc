//! 종목 목록 조회 모듈.
//!
//! 거래소 목록을 받아 수집 정책(테스트 종목, 결손 종목, 특수문자 심볼)에 따라
//! 필터링하고 중복을 제거합니다. 결과가 비어 있으면 수집을 중단합니다.

use std::collections::HashSet;

use ticker_data::{ListedSymbol, ListingError, SymbolLister};

use crate::config::ListingConfig;
use crate::error::CollectorError;
use crate::{CollectionStats, Result};

/// 필터링 제외 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 테스트 종목
    TestIssue,
    /// 재무 결손 (Financial Status = D)
    FinancialDistressed,
    /// Provider가 해석하지 못하는 특수문자 포함
    Nonstandard,
    /// 이미 등장한 심볼
    Duplicate,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TestIssue => "test-issue",
            Self::FinancialDistressed => "financial-distressed",
            Self::Nonstandard => "nonstandard-symbol",
            Self::Duplicate => "duplicate",
        }
    }
}

/// 종목 목록 조회 및 필터링.
pub async fn list_symbols(
    lister: &dyn SymbolLister,
    config: &ListingConfig,
    stats: &mut CollectionStats,
) -> Result<Vec<ListedSymbol>> {
    if let Some(partition) = config.partition.filter(|p| !p.is_valid()) {
        return Err(CollectorError::Config(format!(
            "invalid partition {}/{}",
            partition.index, partition.total
        )));
    }

    tracing::info!(provider = lister.name(), "종목 목록 조회 시작");

    let rows = lister.fetch_listing().await?;
    stats.listed = rows.len();

    let (symbols, skipped) = filter_listing(rows, config);
    stats.skipped = skipped;

    if symbols.is_empty() {
        tracing::error!("수집할 종목이 없습니다");
        return Err(ListingError::Empty.into());
    }

    tracing::info!(
        listed = stats.listed,
        skipped,
        count = symbols.len(),
        "종목 목록 필터링 완료"
    );

    Ok(symbols)
}

/// 수집 정책에 따라 목록 필터링. (남은 종목, 제외된 수) 반환.
pub fn filter_listing(rows: Vec<ListedSymbol>, config: &ListingConfig) -> (Vec<ListedSymbol>, usize) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for mut row in rows {
        row.symbol = row.symbol.to_uppercase();

        if let Some(reason) = skip_reason(&row, config, &seen) {
            tracing::debug!(symbol = %row.symbol, reason = reason.as_str(), "종목 제외");
            skipped += 1;
            continue;
        }

        seen.insert(row.symbol.clone());
        kept.push(row);
    }

    if let Some(partition) = config.partition {
        let range = partition.range(kept.len());
        tracing::info!(
            part = partition.index + 1,
            total = partition.total,
            start = range.start,
            end = range.end,
            "분할 구간 선택"
        );
        let selected: Vec<ListedSymbol> = kept.drain(range).collect();
        kept = selected;
    }

    if config.limit > 0 && kept.len() > config.limit {
        tracing::info!(limit = config.limit, "처리 종목 수 제한");
        kept.truncate(config.limit);
    }

    (kept, skipped)
}

fn skip_reason(
    row: &ListedSymbol,
    config: &ListingConfig,
    seen: &HashSet<String>,
) -> Option<SkipReason> {
    if !config.include_test_issues && row.test_issue {
        return Some(SkipReason::TestIssue);
    }
    if !config.include_financial_distressed && row.financial_status == "D" {
        return Some(SkipReason::FinancialDistressed);
    }
    if !config.include_nonstandard && is_nonstandard(&row.symbol) {
        return Some(SkipReason::Nonstandard);
    }
    if seen.contains(&row.symbol) {
        return Some(SkipReason::Duplicate);
    }
    None
}

/// 영문 대문자/숫자 이외의 문자가 있는 심볼
fn is_nonstandard(symbol: &str) -> bool {
    !symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Partition;
    use crate::CollectorConfig;

    fn listing_config() -> ListingConfig {
        CollectorConfig::default().listing
    }

    fn row(symbol: &str, test_issue: bool, status: &str) -> ListedSymbol {
        ListedSymbol {
            symbol: symbol.to_string(),
            is_etf: false,
            test_issue,
            financial_status: status.to_string(),
        }
    }

    #[test]
    fn test_default_filters() {
        let rows = vec![
            row("AAPL", false, "N"),
            row("ZAZZT", true, "N"),
            row("SICK", false, "D"),
            row("BRK.A", false, "N"),
            row("msft", false, "N"),
            row("AAPL", false, "N"),
        ];

        let (kept, skipped) = filter_listing(rows, &listing_config());
        let symbols: Vec<&str> = kept.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(skipped, 4);
    }

    #[test]
    fn test_include_flags() {
        let mut config = listing_config();
        config.include_test_issues = true;
        config.include_financial_distressed = true;
        config.include_nonstandard = true;

        let rows = vec![
            row("ZAZZT", true, "N"),
            row("SICK", false, "D"),
            row("BRK.A", false, "N"),
        ];

        let (kept, skipped) = filter_listing(rows, &config);
        assert_eq!(kept.len(), 3);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_limit_truncates_in_order() {
        let mut config = listing_config();
        config.limit = 2;

        let rows = vec![row("C", false, "N"), row("A", false, "N"), row("B", false, "N")];
        let (kept, _) = filter_listing(rows, &config);
        let symbols: Vec<&str> = kept.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["C", "A"]);
    }

    #[test]
    fn test_partition_after_filtering() {
        let mut config = listing_config();
        config.partition = Some(Partition { index: 1, total: 2 });

        let rows = vec![
            row("A", false, "N"),
            row("ZAZZT", true, "N"),
            row("B", false, "N"),
            row("C", false, "N"),
            row("A", false, "N"),
            row("D", false, "N"),
            row("E", false, "N"),
        ];
        let (kept, skipped) = filter_listing(rows, &config);
        let symbols: Vec<&str> = kept.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["D", "E"]);
        assert_eq!(skipped, 2);
    }

    #[tokio::test]
    async fn test_invalid_partition_is_config_error() {
        struct NeverCalled;

        #[async_trait::async_trait]
        impl SymbolLister for NeverCalled {
            fn name(&self) -> &str {
                "never"
            }

            async fn fetch_listing(&self) -> std::result::Result<Vec<ListedSymbol>, ListingError> {
                panic!("listing must not be fetched");
            }
        }

        let mut config = listing_config();
        config.partition = Some(Partition { index: 3, total: 3 });

        let err = list_symbols(&NeverCalled, &config, &mut CollectionStats::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
    }

    #[test]
    fn test_nonstandard() {
        assert!(is_nonstandard("BRK.A"));
        assert!(is_nonstandard("ABC$D"));
        assert!(is_nonstandard("AB-W"));
        assert!(!is_nonstandard("AAPL"));
        assert!(!is_nonstandard("A1"));
    }
}
