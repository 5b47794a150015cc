//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 종목 목록(listing) 조회 오류.
///
/// 조회할 종목이 없으면 수집 자체가 의미가 없으므로 항상 치명적 오류로 취급됩니다.
#[derive(Debug, Error)]
pub enum ListingError {
    /// 종목 목록 소스에 접근할 수 없음
    #[error("Listing fetch error: {0}")]
    Fetch(String),

    /// 헤더에 필수 컬럼 없음
    #[error("Missing expected column '{0}' in listing header")]
    MissingColumn(String),

    /// 빈 목록 (필터링 후 포함)
    #[error("Listing is empty")]
    Empty,
}

impl From<reqwest::Error> for ListingError {
    fn from(err: reqwest::Error) -> Self {
        ListingError::Fetch(err.to_string())
    }
}

/// 단일 종목 조회 실패 원인.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupCause {
    /// 존재하지 않는 심볼
    #[error("not found")]
    NotFound,

    /// 요청 한도 초과 (HTTP 429)
    #[error("rate limited")]
    RateLimited,

    /// 기타 HTTP 오류 상태
    #[error("http status {0}")]
    Http(u16),

    /// 네트워크/전송 오류
    #[error("network error: {0}")]
    Network(String),

    /// 응답 형식 불일치
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LookupCause {
    /// HTTP 상태 코드를 실패 원인으로 변환.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            429 => Self::RateLimited,
            other => Self::Http(other),
        }
    }

    /// 재시도하면 성공할 가능성이 있는 오류인지 여부.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Network(_) => true,
            Self::Http(status) => *status >= 500,
            Self::NotFound | Self::Malformed(_) => false,
        }
    }
}

/// 단일 종목 메타데이터 조회 오류.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{symbol}: {cause}")]
pub struct LookupError {
    /// 조회 대상 심볼
    pub symbol: String,
    /// 실패 원인
    pub cause: LookupCause,
}

impl LookupError {
    pub fn new(symbol: impl Into<String>, cause: LookupCause) -> Self {
        Self {
            symbol: symbol.into(),
            cause,
        }
    }

    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::new(symbol, LookupCause::NotFound)
    }

    pub fn malformed(symbol: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(symbol, LookupCause::Malformed(msg.into()))
    }

    /// reqwest 오류를 원인별로 분류.
    pub fn from_reqwest(symbol: impl Into<String>, err: reqwest::Error) -> Self {
        let cause = if err.is_decode() {
            LookupCause::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            LookupCause::from_status(status.as_u16())
        } else {
            LookupCause::Network(err.to_string())
        };
        Self::new(symbol, cause)
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;
