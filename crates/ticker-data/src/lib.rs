//! 종목 데이터 소스.
//!
//! 이 crate는 다음을 제공합니다:
//! - 종목 메타데이터 도메인 타입 (`TickerRecord`, `TickerSnapshot`)
//! - 종목 목록 Provider (NASDAQ Trader)
//! - 종목 메타데이터 Provider (Yahoo Finance)

pub mod error;
pub mod model;
pub mod provider;

pub use error::{ListingError, LookupCause, LookupError, Result};
pub use model::{ListedSymbol, TickerRecord, TickerSnapshot};

// Provider 재내보내기
pub use provider::{
    MetadataFetcher, NasdaqListingProvider, SymbolLister, YahooMetadataProvider,
};
