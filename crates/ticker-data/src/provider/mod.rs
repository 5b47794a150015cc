//! 데이터 Provider 모듈.
//!
//! 외부 소스에서 종목 목록과 종목별 메타데이터를 가져오는 Provider들을 정의합니다.
//!
//! ## 종목 목록
//! - `NasdaqListingProvider`: NASDAQ Trader `nasdaqtraded.txt` 종목 디렉토리
//!
//! ## 종목 메타데이터
//! - `YahooMetadataProvider`: Yahoo Finance quoteSummary (섹터, 산업, ETF 구분, 현재가)

pub mod nasdaq;
pub mod yahoo;

use async_trait::async_trait;

use crate::error::{ListingError, LookupError};
use crate::model::{ListedSymbol, TickerRecord};

pub use nasdaq::{parse_nasdaq_listing, NasdaqListingProvider, NASDAQ_LISTING_URL};
pub use yahoo::{parse_quote_summary, yahoo_symbol, YahooMetadataProvider, YAHOO_BASE_URL};

/// 종목 목록 Provider trait.
#[async_trait]
pub trait SymbolLister: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 거래소 전체 종목 목록 조회 (필터링 전).
    async fn fetch_listing(&self) -> Result<Vec<ListedSymbol>, ListingError>;
}

/// 종목 메타데이터 Provider trait.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 단일 종목의 섹터/산업/ETF 여부/현재가 조회.
    ///
    /// 개별 필드가 없으면 null로 채우고, 종목 자체를 조회할 수 없을 때만 오류를 반환합니다.
    async fn fetch_metadata(&self, listed: &ListedSymbol) -> Result<TickerRecord, LookupError>;
}
