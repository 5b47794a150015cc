//! Yahoo Finance 종목 메타데이터 Provider.
//!
//! quoteSummary API의 `assetProfile`, `price`, `quoteType` 모듈로
//! 섹터, 산업, ETF 여부, 현재가를 조회합니다.
//!
//! Yahoo는 쿠키와 crumb 토큰을 요구하므로 HTTP 클라이언트(쿠키 저장소 포함)와
//! crumb은 Provider 인스턴스에 한 번 생성되어 수집 기간 동안 재사용됩니다.
//! crumb 조회가 실패하면 캐시하지 않고 해당 요청을 일시적 오류로 돌려보내므로
//! 재시도나 다음 종목 조회에서 다시 발급을 시도합니다.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::MetadataFetcher;
use crate::error::{LookupCause, LookupError};
use crate::model::{ListedSymbol, TickerRecord};

/// Yahoo Finance API 기본 URL
pub const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// 쿠키 발급용 URL
const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";

const QUOTE_SUMMARY_MODULES: &str = "assetProfile,price,quoteType";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Yahoo Finance 메타데이터 Provider.
pub struct YahooMetadataProvider {
    client: reqwest::Client,
    base_url: String,
    cookie_url: Option<String>,
    timeout: Duration,
    /// 첫 성공 이후 재사용 (실패는 캐시하지 않음)
    crumb: OnceCell<String>,
}

impl YahooMetadataProvider {
    /// 기본 Yahoo Finance 엔드포인트로 생성.
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut provider = Self::with_base_url(YAHOO_BASE_URL)?;
        provider.cookie_url = Some(YAHOO_COOKIE_URL.to_string());
        Ok(provider)
    }

    /// 다른 엔드포인트 사용 (프록시, 테스트 서버 등). 쿠키 발급 요청은 생략됩니다.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie_url: None,
            timeout: Duration::from_secs(30),
            crumb: OnceCell::new(),
        })
    }

    /// 요청 타임아웃 설정.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// crumb 조회 (성공 시 캐시됨).
    async fn crumb(&self) -> Result<&str, reqwest::Error> {
        self.crumb
            .get_or_try_init(|| self.fetch_crumb())
            .await
            .map(String::as_str)
    }

    async fn fetch_crumb(&self) -> Result<String, reqwest::Error> {
        if let Some(cookie_url) = &self.cookie_url {
            // 응답 상태와 무관하게 쿠키만 받으면 됨
            if let Err(e) = self.client.get(cookie_url).timeout(self.timeout).send().await {
                tracing::debug!(error = %e, "Yahoo 쿠키 요청 실패");
            }
        }

        let crumb = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(crumb.trim().to_string())
    }
}

#[async_trait]
impl MetadataFetcher for YahooMetadataProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch_metadata(&self, listed: &ListedSymbol) -> Result<TickerRecord, LookupError> {
        let symbol = listed.symbol.as_str();
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url,
            yahoo_symbol(symbol)
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_SUMMARY_MODULES)])
            .timeout(self.timeout);

        let crumb = self.crumb().await.map_err(|e| {
            tracing::warn!(symbol, error = %e, "Yahoo crumb 조회 실패");
            LookupError::new(symbol, LookupCause::Network(format!("crumb unavailable: {}", e)))
        })?;
        if !crumb.is_empty() {
            request = request.query(&[("crumb", crumb)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::from_reqwest(symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::new(
                symbol,
                LookupCause::from_status(status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::from_reqwest(symbol, e))?;

        parse_quote_summary(listed, &body)
    }
}

/// Yahoo 심볼 형식으로 변환 (BRK.A → BRK-A).
pub fn yahoo_symbol(symbol: &str) -> String {
    symbol.replace('.', "-")
}

/// quoteSummary 응답을 `TickerRecord`로 변환.
///
/// 응답 구조가 예상과 다르면 `Malformed`, 결과가 비어 있으면 `NotFound`를 반환합니다.
pub fn parse_quote_summary(listed: &ListedSymbol, body: &str) -> Result<TickerRecord, LookupError> {
    let symbol = listed.symbol.as_str();

    let envelope: QuoteSummaryEnvelope =
        serde_json::from_str(body).map_err(|e| LookupError::malformed(symbol, e.to_string()))?;

    let summary = envelope.quote_summary;
    let result = match summary.result {
        Some(results) => match results.into_iter().next() {
            Some(result) => result,
            None => return Err(LookupError::not_found(symbol)),
        },
        None => {
            return Err(match summary.error {
                Some(err) if err.code.as_deref() == Some("Not Found") => {
                    LookupError::not_found(symbol)
                }
                Some(err) => LookupError::malformed(
                    symbol,
                    err.description
                        .or(err.code)
                        .unwrap_or_else(|| "unknown error".to_string()),
                ),
                None => LookupError::malformed(symbol, "missing quoteSummary result"),
            });
        }
    };

    let quote_type_etf = result
        .quote_type
        .and_then(|q| q.quote_type)
        .map(|t| t.eq_ignore_ascii_case("ETF"))
        .unwrap_or(false);
    let is_etf = listed.is_etf || quote_type_etf;

    let (sector, industry) = match (is_etf, result.asset_profile) {
        (false, Some(profile)) => (non_empty(profile.sector), non_empty(profile.industry)),
        _ => (None, None),
    };

    let price = result
        .price
        .and_then(|p| p.regular_market_price)
        .and_then(|v| v.raw)
        .filter(|p| p.is_finite())
        .map(round_price);

    Ok(TickerRecord {
        symbol: symbol.to_string(),
        sector,
        industry,
        is_etf,
        price,
        fetched_at: Utc::now(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 소수점 4자리 반올림
fn round_price(price: f64) -> f64 {
    (price * 10_000.0).round() / 10_000.0
}

// Yahoo Finance API 응답 구조

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    quote_type: Option<QuoteTypeModule>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    regular_market_price: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteTypeModule {
    #[serde(default)]
    quote_type: Option<String>,
}
