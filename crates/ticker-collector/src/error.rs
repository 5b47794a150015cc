//! 에러 타입 정의.

use std::fmt;
use std::path::PathBuf;

use ticker_data::ListingError;

/// Collector 에러 타입
///
/// 종목 목록 조회 실패와 스냅샷 저장 실패만 수집을 중단시킵니다.
/// 개별 종목 조회 실패(`LookupError`)는 오류 로그에 기록되고 여기로 전파되지 않습니다.
#[derive(Debug)]
pub enum CollectorError {
    /// 종목 목록 조회 실패
    Listing(ListingError),
    /// 스냅샷 저장 실패
    Persist(PersistError),
    /// 오류 로그 기록 실패
    ErrorLog(std::io::Error),
    /// 모든 종목 조회 실패 (이전 스냅샷 유지)
    NoResults { attempted: usize },
    /// 설정 에러
    Config(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing(e) => write!(f, "Listing error: {}", e),
            Self::Persist(e) => write!(f, "Persist error: {}", e),
            Self::ErrorLog(e) => write!(f, "Error log write failed: {}", e),
            Self::NoResults { attempted } => write!(
                f,
                "All {} lookups failed; previous snapshot kept",
                attempted
            ),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Listing(e) => Some(e),
            Self::Persist(e) => Some(e),
            Self::ErrorLog(e) => Some(e),
            Self::NoResults { .. } | Self::Config(_) => None,
        }
    }
}

impl From<ListingError> for CollectorError {
    fn from(err: ListingError) -> Self {
        Self::Listing(err)
    }
}

impl From<PersistError> for CollectorError {
    fn from(err: PersistError) -> Self {
        Self::Persist(err)
    }
}

/// 스냅샷 파일 저장 실패.
#[derive(Debug)]
pub struct PersistError {
    /// 대상 경로
    pub path: PathBuf,
    /// 원인
    pub kind: PersistErrorKind,
}

/// 저장 실패 원인
#[derive(Debug)]
pub enum PersistErrorKind {
    /// 파일시스템 오류 (디스크 부족, 권한 등)
    Io(std::io::Error),
    /// 직렬화 오류
    Serialize(serde_json::Error),
}

impl PersistError {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self {
            path: path.into(),
            kind: PersistErrorKind::Io(err),
        }
    }

    pub fn serialize(path: impl Into<PathBuf>, err: serde_json::Error) -> Self {
        Self {
            path: path.into(),
            kind: PersistErrorKind::Serialize(err),
        }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PersistErrorKind::Io(e) => write!(f, "{}: {}", self.path.display(), e),
            PersistErrorKind::Serialize(e) => {
                write!(f, "{}: serialization failed: {}", self.path.display(), e)
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            PersistErrorKind::Io(e) => Some(e),
            PersistErrorKind::Serialize(e) => Some(e),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
