//! Standalone ticker metadata collector.
//!
//! 이 crate는 종목 메타데이터 스냅샷을 생성하는 바이너리를 제공합니다:
//! - 종목 목록 조회 및 필터링 (NASDAQ Trader)
//! - 종목별 섹터/산업/ETF 여부/현재가 조회 (Yahoo Finance)
//! - JSON 스냅샷 원자적 저장 및 조회 실패 로그
//! - 저장된 스냅샷 검증

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, PersistError, Result};
pub use stats::CollectionStats;
