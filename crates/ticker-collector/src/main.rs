//! Standalone ticker metadata collector CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 수집 (data/ticker_info.json, log/error.log)
//! ticker-collector run
//!
//! # 디버그: 앞의 100개 종목만, 동시 조회 4개
//! ticker-collector run --limit 100 --max-workers 4
//!
//! # 4개로 분할 실행 (data/ticker_info_part_{i}.json) 후 병합
//! ticker-collector run --part-index 0 --part-total 4
//! ticker-collector merge data/ticker_info_part_*.json
//!
//! # 저장된 스냅샷 검증
//! ticker-collector verify
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticker_collector::config::Partition;
use ticker_collector::modules::{
    collect_ticker_info, merge_snapshot_files, read_snapshot, verify_snapshot,
};
use ticker_collector::{CollectorConfig, CollectorError};
use ticker_data::provider::YAHOO_BASE_URL;
use ticker_data::{NasdaqListingProvider, YahooMetadataProvider};

#[derive(Parser)]
#[command(name = "ticker-collector")]
#[command(about = "NASDAQ ticker sector/industry/ETF/price collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 수집 실행 (목록 → 메타데이터 → 스냅샷 저장)
    Run(RunArgs),

    /// 저장된 스냅샷 검증
    Verify {
        /// 스냅샷 경로 (기본: 설정의 출력 경로)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// 분할 스냅샷 병합 (섹터/산업이 확인된 레코드 우선)
    Merge {
        /// 병합할 스냅샷 파일들
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 병합 결과 경로 (기본: 설정의 출력 경로)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// 테스트 종목 포함
    #[arg(long)]
    include_test_issues: bool,

    /// 재무 결손(D) 종목 포함
    #[arg(long)]
    include_financial_distressed: bool,

    /// 특수문자($, ., / 등) 포함 심볼 포함
    #[arg(long)]
    include_nonstandard: bool,

    /// 앞에서부터 N개 종목만 처리 (디버그용, 0 = 전체)
    #[arg(long)]
    limit: Option<usize>,

    /// 동시 조회 수
    #[arg(long)]
    max_workers: Option<usize>,

    /// 스냅샷 출력 경로
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 조회 실패 로그 경로
    #[arg(long)]
    error_log: Option<PathBuf>,

    /// 미확인 종목 목록 경로
    #[arg(long)]
    unresolved_output: Option<PathBuf>,

    /// 분할 실행 구간 번호 (0부터)
    #[arg(long, requires = "part_total")]
    part_index: Option<usize>,

    /// 분할 실행 전체 구간 수
    #[arg(long, requires = "part_index")]
    part_total: Option<usize>,
}

impl RunArgs {
    /// CLI 인자로 설정 덮어쓰기
    fn apply(self, config: &mut CollectorConfig) {
        // 구간별 기본 출력 경로 설정 후 명시적 경로로 덮어씀
        if let (Some(index), Some(total)) = (self.part_index, self.part_total) {
            config.set_partition(Partition { index, total });
        }
        config.listing.include_test_issues |= self.include_test_issues;
        config.listing.include_financial_distressed |= self.include_financial_distressed;
        config.listing.include_nonstandard |= self.include_nonstandard;
        if let Some(limit) = self.limit {
            config.listing.limit = limit;
        }
        if let Some(max_workers) = self.max_workers {
            config.fetch.max_workers = max_workers;
        }
        if let Some(output) = self.output {
            config.output.snapshot_path = output;
        }
        if let Some(error_log) = self.error_log {
            config.output.error_log_path = error_log;
        }
        if let Some(unresolved) = self.unresolved_output {
            config.output.unresolved_path = unresolved;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ticker_collector={0},ticker_data={0}", cli.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = CollectorConfig::from_env();

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            args.apply(&mut config);
            tracing::debug!(?config, "설정 로드 완료");

            let lister = NasdaqListingProvider::with_url(&config.listing.url)
                .timeout(config.fetch.request_timeout());

            let fetcher = if config.fetch.yahoo_base_url == YAHOO_BASE_URL {
                YahooMetadataProvider::new()
            } else {
                YahooMetadataProvider::with_base_url(&config.fetch.yahoo_base_url)
            };
            let fetcher = fetcher
                .map_err(|e| CollectorError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?
                .timeout(config.fetch.request_timeout());

            match collect_ticker_info(&lister, &fetcher, &config).await {
                Ok(stats) => {
                    stats.log_summary("종목 메타데이터 수집");
                    println!("Output: {}", config.output.snapshot_path.display());
                    println!("Unresolved list: {}", config.output.unresolved_path.display());
                    println!("Errors logged: {}", config.output.error_log_path.display());
                }
                Err(e) => {
                    tracing::error!("수집 실패: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Verify { input } => {
            let path = input.unwrap_or_else(|| config.output.snapshot_path.clone());
            let snapshot = read_snapshot(&path).map_err(CollectorError::Persist)?;
            let report = verify_snapshot(&snapshot);
            report.log_summary();

            println!("=== Ticker Info Verification ===");
            println!("Total entries   : {}", report.total);
            println!("Resolved entries: {}", report.resolved);
            println!("Unresolved      : {}", report.unresolved.len());

            if !report.unresolved.is_empty() {
                println!("\nSample unresolved tickers:");
                println!("{}", report.unresolved_sample().join(", "));
            }

            println!("\nSector distribution (top {}):", report.top_sectors.len());
            for (sector, count) in &report.top_sectors {
                println!("  {}: {}", sector, count);
            }

            if !report.is_healthy() {
                tracing::error!("미확인 종목이 50%를 초과합니다");
                return Err("more than 50% of entries are unresolved".into());
            }
        }
        Commands::Merge { inputs, output } => {
            let output = output.unwrap_or_else(|| config.output.snapshot_path.clone());
            let summary =
                merge_snapshot_files(&inputs, &output).map_err(CollectorError::Persist)?;

            println!(
                "Merged {} files into {} ({} entries, {} upgraded)",
                summary.files,
                output.display(),
                summary.symbols,
                summary.upgraded
            );
        }
    }

    Ok(())
}
