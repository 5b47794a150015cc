//! 종목 메타데이터 수집 워크플로우.
//!
//! 종목 목록 조회 → 종목별 메타데이터 조회 → 집계 → 스냅샷 저장 순서로 한 번 실행됩니다.
//! 개별 종목 실패는 오류 로그에 기록하고 계속 진행하며,
//! 목록 조회 실패와 스냅샷 저장 실패만 수집을 중단합니다.
//! 모든 종목이 실패한 경우에는 이전 스냅샷을 빈 스냅샷으로 덮어쓰지 않습니다.

use futures::StreamExt;
use std::time::Instant;

use ticker_data::{MetadataFetcher, SymbolLister, TickerSnapshot};

use super::aggregate::SnapshotAggregator;
use super::error_log::ErrorLog;
use super::metadata_fetch::fetch_outcomes;
use super::persist::{write_snapshot, write_symbol_list};
use super::symbol_list::list_symbols;
use crate::error::CollectorError;
use crate::{CollectionStats, CollectorConfig, Result};

/// 진행 상황 로그 주기
const PROGRESS_INTERVAL: usize = 250;

/// 종목 메타데이터 수집
pub async fn collect_ticker_info(
    lister: &dyn SymbolLister,
    fetcher: &dyn MetadataFetcher,
    config: &CollectorConfig,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!("종목 메타데이터 수집 시작");

    // 1. 종목 목록
    let symbols = list_symbols(lister, &config.listing, &mut stats).await?;

    let mut error_log =
        ErrorLog::open(&config.output.error_log_path).map_err(CollectorError::ErrorLog)?;

    // 2. 종목별 조회 + 3. 집계
    tracing::info!(
        provider = fetcher.name(),
        symbols = symbols.len(),
        workers = config.fetch.workers(),
        "메타데이터 조회 시작"
    );

    let mut aggregator = SnapshotAggregator::new();
    let mut outcomes = std::pin::pin!(fetch_outcomes(fetcher, &symbols, &config.fetch));

    while let Some(outcome) = outcomes.next().await {
        stats.total += 1;
        stats.retries += outcome.retries as usize;

        match &outcome.result {
            Ok(_) => stats.success += 1,
            Err(e) => {
                stats.errors += 1;
                tracing::warn!(symbol = %e.symbol, reason = %e.cause, "조회 실패");
                error_log
                    .append(&e.symbol, &e.cause.to_string())
                    .map_err(CollectorError::ErrorLog)?;
            }
        }

        aggregator.record(outcome.result);

        if stats.total % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                progress = format!("{}/{}", stats.total, symbols.len()),
                errors = stats.errors,
                "조회 진행 중"
            );
        }
    }

    tracing::debug!(attempted = aggregator.attempted(), "조회 완료");
    let (snapshot, failures) = aggregator.finish();
    record_snapshot_stats(&snapshot, &mut stats);

    if !failures.is_empty() {
        tracing::warn!(
            failed = failures.len(),
            logged = error_log.written(),
            log = %error_log.path().display(),
            "일부 종목 조회 실패 (오류 로그 참조)"
        );
    }

    if snapshot.is_empty() && !failures.is_empty() {
        tracing::error!(
            attempted = stats.total,
            "모든 종목 조회 실패, 이전 스냅샷 유지"
        );
        return Err(CollectorError::NoResults {
            attempted: stats.total,
        });
    }

    // 4. 저장
    write_snapshot(&snapshot, &config.output.snapshot_path)?;

    let unresolved: Vec<String> = snapshot
        .iter()
        .filter(|r| !r.is_resolved())
        .map(|r| r.symbol.clone())
        .collect();
    write_symbol_list(&unresolved, &config.output.unresolved_path)?;

    stats.elapsed = start.elapsed();
    Ok(stats)
}

fn record_snapshot_stats(snapshot: &TickerSnapshot, stats: &mut CollectionStats) {
    for record in snapshot.iter() {
        if record.is_etf {
            stats.etfs += 1;
        } else if !record.is_resolved() {
            stats.unresolved += 1;
        }
        if record.price.is_none() {
            stats.missing_price += 1;
        }
    }
}
