//! NASDAQ Trader 종목 디렉토리 Provider.
//!
//! `nasdaqtraded.txt`는 `|`로 구분된 텍스트 파일로, 첫 줄이 헤더이고
//! 마지막 줄은 `File Creation Time: ...` 푸터입니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::SymbolLister;
use crate::error::ListingError;
use crate::model::ListedSymbol;

/// NASDAQ Trader 종목 디렉토리 URL
pub const NASDAQ_LISTING_URL: &str =
    "https://www.nasdaqtrader.com/dynamic/symdir/nasdaqtraded.txt";

const REQUIRED_COLUMNS: [&str; 5] = [
    "Symbol",
    "ETF",
    "Test Issue",
    "Financial Status",
    "Nasdaq Traded",
];

/// NASDAQ Trader 종목 목록 Provider.
pub struct NasdaqListingProvider {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl NasdaqListingProvider {
    pub fn new() -> Self {
        Self::with_url(NASDAQ_LISTING_URL)
    }

    /// 다른 URL의 목록 사용 (미러, 테스트 서버 등).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// 요청 타임아웃 설정.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for NasdaqListingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SymbolLister for NasdaqListingProvider {
    fn name(&self) -> &str {
        "NASDAQ Trader"
    }

    async fn fetch_listing(&self) -> Result<Vec<ListedSymbol>, ListingError> {
        tracing::info!(url = %self.url, "NASDAQ 종목 디렉토리 다운로드");

        let text = self
            .client
            .get(&self.url)
            .header("User-Agent", "Mozilla/5.0")
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let symbols = parse_nasdaq_listing(&text)?;
        tracing::info!(count = symbols.len(), "NASDAQ 종목 목록 파싱 완료");

        Ok(symbols)
    }
}

/// `nasdaqtraded.txt` 본문 파싱.
///
/// `Nasdaq Traded = Y`이고 심볼이 비어 있지 않은 행만 반환합니다.
/// 테스트 종목, 결손 종목 등의 정책 필터링은 호출자가 담당합니다.
pub fn parse_nasdaq_listing(text: &str) -> Result<Vec<ListedSymbol>, ListingError> {
    let mut lines = text.lines();

    let header = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Ok(Vec::new()),
    };

    let index: HashMap<&str, usize> = header
        .split('|')
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    for col in REQUIRED_COLUMNS {
        if !index.contains_key(col) {
            return Err(ListingError::MissingColumn(col.to_string()));
        }
    }

    let col = |name: &str| index[name];
    let (symbol_idx, etf_idx, test_idx, status_idx, traded_idx) = (
        col("Symbol"),
        col("ETF"),
        col("Test Issue"),
        col("Financial Status"),
        col("Nasdaq Traded"),
    );

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() || line.starts_with("File Creation Time") {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        let field = |i: usize| parts.get(i).map(|s| s.trim());

        let (Some(traded), Some(symbol), Some(etf), Some(test), Some(status)) = (
            field(traded_idx),
            field(symbol_idx),
            field(etf_idx),
            field(test_idx),
            field(status_idx),
        ) else {
            let preview: String = line.chars().take(80).collect();
            tracing::debug!(line = %preview, "잘못된 형식의 행 건너뛰기");
            continue;
        };

        if traded != "Y" || symbol.is_empty() {
            continue;
        }

        rows.push(ListedSymbol {
            symbol: symbol.to_string(),
            is_etf: etf.eq_ignore_ascii_case("Y"),
            test_issue: test.eq_ignore_ascii_case("Y"),
            financial_status: status.to_uppercase(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Nasdaq Traded|Symbol|Security Name|Listing Exchange|Market Category|ETF|Round Lot Size|Test Issue|Financial Status|CQS Symbol|NASDAQ Symbol|NextShares
Y|AAPL|Apple Inc. - Common Stock|Q|Q|N|100|N|N||AAPL|N
Y|QQQ|Invesco QQQ Trust, Series 1|Q|G|Y|100|N|||QQQ|N
Y|ZAZZT|Tick Pilot Test Stock Class A|Q|G|N|100|Y|N||ZAZZT|N
N|OLDX|Delisted Corp|Q|Q|N|100|N|N||OLDX|N
Y|BRK.A|Berkshire Hathaway Inc.|N| |N|1|N||BRK.A|BRK.A|N
Y|BAD
File Creation Time: 0704202412:02|||||||||||
";

    #[test]
    fn test_parse_nasdaq_listing() {
        let rows = parse_nasdaq_listing(SAMPLE).unwrap();
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();

        // OLDX: Nasdaq Traded = N, BAD: 컬럼 부족, 푸터 제외
        assert_eq!(symbols, vec!["AAPL", "QQQ", "ZAZZT", "BRK.A"]);

        assert!(!rows[0].is_etf);
        assert!(rows[1].is_etf);
        assert!(rows[2].test_issue);
        assert_eq!(rows[0].financial_status, "N");
        assert_eq!(rows[1].financial_status, "");
    }

    #[test]
    fn test_parse_missing_column() {
        let text = "Symbol|ETF|Test Issue\nAAPL|N|N\n";
        match parse_nasdaq_listing(text) {
            Err(ListingError::MissingColumn(col)) => assert_eq!(col, "Financial Status"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_nasdaq_listing("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_listing_from_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/nasdaqtraded.txt")
            .with_status(200)
            .with_body(SAMPLE)
            .create_async()
            .await;

        let provider = NasdaqListingProvider::with_url(format!("{}/nasdaqtraded.txt", server.url()));
        let rows = provider.fetch_listing().await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_listing_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/nasdaqtraded.txt")
            .with_status(503)
            .create_async()
            .await;

        let provider = NasdaqListingProvider::with_url(format!("{}/nasdaqtraded.txt", server.url()));
        let result = provider.fetch_listing().await;

        assert!(matches!(result, Err(ListingError::Fetch(_))));
    }

    #[tokio::test]
    #[ignore] // 실제 네트워크 테스트는 ignore
    async fn test_fetch_live_listing() {
        let provider = NasdaqListingProvider::new();
        let rows = provider.fetch_listing().await.unwrap();
        println!("NASDAQ 종목 수: {}", rows.len());
        assert!(rows.iter().any(|r| r.symbol == "AAPL"));
    }
}
