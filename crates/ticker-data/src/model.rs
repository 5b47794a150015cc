//! 종목 메타데이터 도메인 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 거래소 종목 목록의 한 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedSymbol {
    /// 티커 코드 (대문자, 예: AAPL)
    pub symbol: String,
    /// 목록상 ETF 여부 (ETF 컬럼 = Y)
    pub is_etf: bool,
    /// 테스트 종목 여부
    pub test_issue: bool,
    /// 재무 상태 코드 (N: 정상, D: 결손 등)
    pub financial_status: String,
}

impl ListedSymbol {
    /// 일반 종목 생성 (테스트/수동 목록용).
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            is_etf: false,
            test_issue: false,
            financial_status: "N".to_string(),
        }
    }

    /// ETF 종목 생성.
    pub fn etf(symbol: impl Into<String>) -> Self {
        Self {
            is_etf: true,
            ..Self::new(symbol)
        }
    }
}

/// 단일 종목 메타데이터.
///
/// 한 번의 수집에서 종목당 한 번 생성되며 이후 변경되지 않습니다.
/// `symbol`과 `fetched_at`은 스냅샷 파일에 기록되지 않습니다
/// (심볼은 JSON 키로, 수집 시각은 메모리에만 유지).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    #[serde(skip)]
    pub symbol: String,
    /// 섹터 (없으면 null)
    pub sector: Option<String>,
    /// 산업 (없으면 null)
    pub industry: Option<String>,
    /// ETF 여부 (판별 불가 시 false)
    pub is_etf: bool,
    /// 최근 체결가 (없으면 null)
    pub price: Option<f64>,
    #[serde(skip, default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl TickerRecord {
    /// 모든 필드가 비어 있는 레코드 생성.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            sector: None,
            industry: None,
            is_etf: false,
            price: None,
            fetched_at: Utc::now(),
        }
    }

    /// 섹터와 산업이 모두 확인되었는지 여부.
    pub fn is_resolved(&self) -> bool {
        self.sector.is_some() && self.industry.is_some()
    }
}

/// 한 번의 수집 결과 (심볼 → 메타데이터).
///
/// 키 정렬 순서로 직렬화되므로 동일한 입력은 항상 동일한 JSON을 생성합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerSnapshot {
    records: BTreeMap<String, TickerRecord>,
}

impl TickerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 추가. 이미 같은 심볼이 있으면 기존 레코드를 유지하고 `false` 반환.
    pub fn insert(&mut self, record: TickerRecord) -> bool {
        if self.records.contains_key(&record.symbol) {
            return false;
        }
        self.records.insert(record.symbol.clone(), record);
        true
    }

    /// 레코드 추가 또는 교체. 교체된 기존 레코드 반환.
    pub fn replace(&mut self, record: TickerRecord) -> Option<TickerRecord> {
        self.records.insert(record.symbol.clone(), record)
    }

    pub fn get(&self, symbol: &str) -> Option<&TickerRecord> {
        self.records.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.records.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 심볼 순으로 레코드 순회.
    pub fn iter(&self) -> impl Iterator<Item = &TickerRecord> {
        self.records.values()
    }

    /// JSON 문서에서 스냅샷 복원. 심볼은 키에서 채웁니다.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut snapshot: TickerSnapshot = serde_json::from_str(json)?;
        for (symbol, record) in snapshot.records.iter_mut() {
            record.symbol = symbol.clone();
        }
        Ok(snapshot)
    }

    /// 정렬된 키로 들여쓰기된 JSON 문서 생성.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
