//! 데이터 수집 모듈.

pub mod aggregate;
pub mod error_log;
pub mod merge;
pub mod metadata_fetch;
pub mod persist;
pub mod symbol_list;
pub mod ticker_collect;
pub mod verify;

pub use aggregate::SnapshotAggregator;
pub use error_log::ErrorLog;
pub use merge::{merge_snapshot_files, merge_snapshots, MergeSummary};
pub use metadata_fetch::{fetch_outcomes, fetch_with_retry, FetchOutcome};
pub use persist::{read_snapshot, write_snapshot, write_symbol_list};
pub use symbol_list::{filter_listing, list_symbols, SkipReason};
pub use ticker_collect::collect_ticker_info;
pub use verify::{verify_snapshot, VerifyReport};
