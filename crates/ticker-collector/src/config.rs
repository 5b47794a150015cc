//! 환경변수 기반 설정 모듈.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ticker_data::provider::{NASDAQ_LISTING_URL, YAHOO_BASE_URL};

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 출력 설정
    pub output: OutputConfig,
    /// 종목 목록 설정
    pub listing: ListingConfig,
    /// 메타데이터 조회 설정
    pub fetch: FetchConfig,
}

/// 출력 경로 설정
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// 스냅샷 JSON 경로
    pub snapshot_path: PathBuf,
    /// 조회 실패 로그 경로
    pub error_log_path: PathBuf,
    /// 섹터/산업 미확인 종목 목록 경로
    pub unresolved_path: PathBuf,
}

/// 종목 목록 설정
#[derive(Debug, Clone)]
pub struct ListingConfig {
    /// 종목 디렉토리 URL
    pub url: String,
    /// 테스트 종목 포함
    pub include_test_issues: bool,
    /// 재무 결손(D) 종목 포함
    pub include_financial_distressed: bool,
    /// 특수문자 포함 심볼 포함 ($, ., / 등)
    pub include_nonstandard: bool,
    /// 앞에서부터 N개만 처리 (0 = 전체)
    pub limit: usize,
    /// 분할 실행 시 담당 구간
    pub partition: Option<Partition>,
}

/// 분할 실행 구간.
///
/// 필터링된 목록을 `total`개의 연속 구간으로 나누고 `index`번째(0부터)만 처리합니다.
/// 각 구간의 결과는 별도 스냅샷으로 저장한 뒤 `merge`로 합칩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub index: usize,
    pub total: usize,
}

impl Partition {
    pub fn is_valid(&self) -> bool {
        self.total > 0 && self.index < self.total
    }

    /// 길이 `len`인 목록에서 담당 구간
    pub fn range(&self, len: usize) -> Range<usize> {
        let per_part = len.div_ceil(self.total.max(1));
        let start = (self.index * per_part).min(len);
        let end = (start + per_part).min(len);
        start..end
    }

    /// 구간별 출력 경로 (ticker_info.json → ticker_info_part_0.json)
    pub fn output_path(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match path.extension() {
            Some(ext) => format!("{}_part_{}.{}", stem, self.index, ext.to_string_lossy()),
            None => format!("{}_part_{}", stem, self.index),
        };
        path.with_file_name(name)
    }
}

/// 메타데이터 조회 설정
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Yahoo Finance API URL
    pub yahoo_base_url: String,
    /// 동시 조회 수
    pub max_workers: usize,
    /// 일시적 오류 재시도 횟수 (0 = 재시도 없음)
    pub max_retries: u32,
    /// 재시도 간 기본 대기 (밀리초, 시도 횟수만큼 증가)
    pub retry_backoff_ms: u64,
    /// 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig {
                snapshot_path: PathBuf::from("data/ticker_info.json"),
                error_log_path: PathBuf::from("log/error.log"),
                unresolved_path: PathBuf::from("data/unresolved_tickers.txt"),
            },
            listing: ListingConfig {
                url: NASDAQ_LISTING_URL.to_string(),
                include_test_issues: false,
                include_financial_distressed: false,
                include_nonstandard: false,
                limit: 0,
                partition: None,
            },
            fetch: FetchConfig {
                yahoo_base_url: YAHOO_BASE_URL.to_string(),
                max_workers: 16,
                max_retries: 2,
                retry_backoff_ms: 500,
                request_delay_ms: 0,
                request_timeout_secs: 30,
            },
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드 (미설정 항목은 기본값)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            output: OutputConfig {
                snapshot_path: env_var_path("TICKER_OUTPUT_PATH", defaults.output.snapshot_path),
                error_log_path: env_var_path(
                    "TICKER_ERROR_LOG_PATH",
                    defaults.output.error_log_path,
                ),
                unresolved_path: env_var_path(
                    "TICKER_UNRESOLVED_PATH",
                    defaults.output.unresolved_path,
                ),
            },
            listing: ListingConfig {
                url: std::env::var("TICKER_LISTING_URL").unwrap_or(defaults.listing.url),
                include_test_issues: env_var_bool(
                    "TICKER_INCLUDE_TEST_ISSUES",
                    defaults.listing.include_test_issues,
                ),
                include_financial_distressed: env_var_bool(
                    "TICKER_INCLUDE_FINANCIAL_DISTRESSED",
                    defaults.listing.include_financial_distressed,
                ),
                include_nonstandard: env_var_bool(
                    "TICKER_INCLUDE_NONSTANDARD",
                    defaults.listing.include_nonstandard,
                ),
                limit: env_var_parse("TICKER_LIMIT", defaults.listing.limit),
                partition: env_var_partition(),
            },
            fetch: FetchConfig {
                yahoo_base_url: std::env::var("TICKER_YAHOO_BASE_URL")
                    .unwrap_or(defaults.fetch.yahoo_base_url),
                max_workers: env_var_parse("TICKER_MAX_WORKERS", defaults.fetch.max_workers),
                max_retries: env_var_parse("TICKER_MAX_RETRIES", defaults.fetch.max_retries),
                retry_backoff_ms: env_var_parse(
                    "TICKER_RETRY_BACKOFF_MS",
                    defaults.fetch.retry_backoff_ms,
                ),
                request_delay_ms: env_var_parse(
                    "TICKER_REQUEST_DELAY_MS",
                    defaults.fetch.request_delay_ms,
                ),
                request_timeout_secs: env_var_parse(
                    "TICKER_REQUEST_TIMEOUT_SECS",
                    defaults.fetch.request_timeout_secs,
                ),
            },
        }
    }

    /// 분할 실행 설정. 출력 경로를 구간별 경로로 바꿉니다.
    pub fn set_partition(&mut self, partition: Partition) {
        self.output.snapshot_path = partition.output_path(&self.output.snapshot_path);
        self.output.unresolved_path = partition.output_path(&self.output.unresolved_path);
        self.listing.partition = Some(partition);
    }
}

impl FetchConfig {
    /// 동시 조회 수 (최소 1)
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }

    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// N번째 재시도 전 대기 시간 (선형 증가)
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_var_path(key: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(key).map(PathBuf::from).unwrap_or(default)
}

/// TICKER_PART_INDEX, TICKER_PART_TOTAL 둘 다 있을 때만 분할
fn env_var_partition() -> Option<Partition> {
    let index = std::env::var("TICKER_PART_INDEX").ok()?.parse().ok()?;
    let total = std::env::var("TICKER_PART_TOTAL").ok()?.parse().ok()?;
    Some(Partition { index, total })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(
            config.output.snapshot_path,
            PathBuf::from("data/ticker_info.json")
        );
        assert_eq!(config.output.error_log_path, PathBuf::from("log/error.log"));
        assert_eq!(config.fetch.max_workers, 16);
        assert_eq!(config.listing.limit, 0);
    }

    #[test]
    fn test_retry_backoff_is_linear() {
        let fetch = CollectorConfig::default().fetch;
        assert_eq!(fetch.retry_backoff(1), Duration::from_millis(500));
        assert_eq!(fetch.retry_backoff(3), Duration::from_millis(1500));
    }

    #[test]
    fn test_workers_never_zero() {
        let mut fetch = CollectorConfig::default().fetch;
        fetch.max_workers = 0;
        assert_eq!(fetch.workers(), 1);
    }

    #[test]
    fn test_partition_ranges_cover_list() {
        let parts: Vec<Range<usize>> = (0..3)
            .map(|index| Partition { index, total: 3 }.range(10))
            .collect();

        assert_eq!(parts, vec![0..4, 4..8, 8..10]);

        // 종목 수보다 구간이 많으면 뒤쪽 구간은 비어 있음
        assert_eq!(Partition { index: 4, total: 5 }.range(3), 3..3);
        assert!(!Partition { index: 2, total: 2 }.is_valid());
        assert!(!Partition { index: 0, total: 0 }.is_valid());
    }

    #[test]
    fn test_partition_paths() {
        let mut config = CollectorConfig::default();
        config.set_partition(Partition { index: 1, total: 4 });

        assert_eq!(
            config.output.snapshot_path,
            PathBuf::from("data/ticker_info_part_1.json")
        );
        assert_eq!(
            config.output.unresolved_path,
            PathBuf::from("data/unresolved_tickers_part_1.txt")
        );
        assert_eq!(config.output.error_log_path, PathBuf::from("log/error.log"));
    }

    #[test]
    fn test_env_var_parse_fallback() {
        assert_eq!(env_var_parse("TICKER_TEST_UNSET_VARIABLE", 7usize), 7);
        assert!(env_var_bool("TICKER_TEST_UNSET_VARIABLE", true));
    }
}
