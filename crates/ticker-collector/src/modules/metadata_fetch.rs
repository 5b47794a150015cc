//! 종목 메타데이터 조회 모듈.
//!
//! 종목별 조회는 서로 독립적이므로 `buffer_unordered`로 동시 실행 수를 제한해
//! 병렬 처리합니다. 결과는 완료 순서대로 하나의 소비자(집계기)에게 전달됩니다.

use futures::stream::{self, Stream, StreamExt};

use ticker_data::{ListedSymbol, LookupError, MetadataFetcher, TickerRecord};

use crate::config::FetchConfig;

/// 단일 종목 조회 결과
#[derive(Debug)]
pub struct FetchOutcome {
    /// 조회 결과
    pub result: Result<TickerRecord, LookupError>,
    /// 재시도 횟수
    pub retries: u32,
}

/// 전체 종목 조회 스트림 (완료 순서, 최대 `max_workers`개 동시 실행)
pub fn fetch_outcomes<'a>(
    fetcher: &'a dyn MetadataFetcher,
    symbols: &'a [ListedSymbol],
    config: &'a FetchConfig,
) -> impl Stream<Item = FetchOutcome> + 'a {
    stream::iter(symbols)
        .map(move |listed| fetch_with_retry(fetcher, listed, config))
        .buffer_unordered(config.workers())
}

/// 일시적 오류(네트워크, 요청 한도, 5xx)만 재시도하며 조회.
///
/// 존재하지 않는 심볼이나 응답 형식 오류는 즉시 실패로 반환합니다.
pub async fn fetch_with_retry(
    fetcher: &dyn MetadataFetcher,
    listed: &ListedSymbol,
    config: &FetchConfig,
) -> FetchOutcome {
    let mut retries = 0;

    let result = loop {
        match fetcher.fetch_metadata(listed).await {
            Ok(record) => break Ok(record),
            Err(e) if e.cause.is_transient() && retries < config.max_retries => {
                retries += 1;
                tracing::debug!(
                    symbol = %listed.symbol,
                    attempt = retries,
                    error = %e,
                    "일시적 오류, 재시도 대기"
                );
                tokio::time::sleep(config.retry_backoff(retries)).await;
            }
            Err(e) => break Err(e),
        }
    };

    // Rate limiting
    if config.request_delay_ms > 0 {
        tokio::time::sleep(config.request_delay()).await;
    }

    FetchOutcome { result, retries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollectorConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ticker_data::LookupCause;

    /// 처음 N번은 지정한 오류로 실패하는 Provider
    struct FlakyFetcher {
        failures: usize,
        cause: LookupCause,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataFetcher for FlakyFetcher {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch_metadata(&self, listed: &ListedSymbol) -> Result<TickerRecord, LookupError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(LookupError::new(&listed.symbol, self.cause.clone()))
            } else {
                Ok(TickerRecord::empty(&listed.symbol))
            }
        }
    }

    fn fast_config(max_retries: u32) -> FetchConfig {
        let mut config = CollectorConfig::default().fetch;
        config.max_retries = max_retries;
        config.retry_backoff_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let fetcher = FlakyFetcher {
            failures: 2,
            cause: LookupCause::RateLimited,
            calls: AtomicUsize::new(0),
        };

        let outcome = fetch_with_retry(&fetcher, &ListedSymbol::new("AAPL"), &fast_config(2)).await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.retries, 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let fetcher = FlakyFetcher {
            failures: 10,
            cause: LookupCause::Network("connection reset".into()),
            calls: AtomicUsize::new(0),
        };

        let outcome = fetch_with_retry(&fetcher, &ListedSymbol::new("AAPL"), &fast_config(1)).await;

        let err = outcome.result.unwrap_err();
        assert!(matches!(err.cause, LookupCause::Network(_)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let fetcher = FlakyFetcher {
            failures: 1,
            cause: LookupCause::NotFound,
            calls: AtomicUsize::new(0),
        };

        let outcome =
            fetch_with_retry(&fetcher, &ListedSymbol::new("ZZZZFAKE"), &fast_config(3)).await;

        assert_eq!(outcome.result.unwrap_err().cause, LookupCause::NotFound);
        assert_eq!(outcome.retries, 0);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_when_disabled() {
        let fetcher = FlakyFetcher {
            failures: 1,
            cause: LookupCause::RateLimited,
            calls: AtomicUsize::new(0),
        };

        let outcome = fetch_with_retry(&fetcher, &ListedSymbol::new("AAPL"), &fast_config(0)).await;

        assert_eq!(outcome.result.unwrap_err().cause, LookupCause::RateLimited);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stream_yields_every_symbol() {
        let fetcher = FlakyFetcher {
            failures: 0,
            cause: LookupCause::NotFound,
            calls: AtomicUsize::new(0),
        };
        let symbols: Vec<ListedSymbol> = (0..50).map(|i| ListedSymbol::new(format!("S{i}"))).collect();
        let mut config = fast_config(0);
        config.max_workers = 4;

        let outcomes: Vec<FetchOutcome> = fetch_outcomes(&fetcher, &symbols, &config).collect().await;

        assert_eq!(outcomes.len(), 50);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
    }
}
