//! 수집 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 수집 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 목록에서 파싱된 종목 수 (필터링 전)
    pub listed: usize,
    /// 필터링으로 제외된 종목 수
    pub skipped: usize,
    /// 조회 시도 종목 수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수 (오류 로그에 기록됨)
    pub errors: usize,
    /// 재시도 횟수
    pub retries: usize,
    /// ETF 종목 수
    pub etfs: usize,
    /// 가격 없는 종목 수
    pub missing_price: usize,
    /// 섹터/산업 미확인 종목 수
    pub unresolved: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 실패한 종목 비율 (%)
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.errors as f64 / self.total as f64) * 100.0
        }
    }

    /// 실행 결과 요약 로그. 실패 종목이 있으면 경고를 함께 남깁니다.
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            listed = self.listed,
            skipped = self.skipped,
            total = self.total,
            success = self.success,
            errors = self.errors,
            retries = self.retries,
            etfs = self.etfs,
            missing_price = self.missing_price,
            unresolved = self.unresolved,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "{} 완료",
            operation
        );

        if self.errors > 0 {
            tracing::warn!(
                errors = self.errors,
                error_rate = format!("{:.1}%", self.error_rate()),
                "{}: 일부 종목 조회 실패",
                operation
            );
        }
    }
}
