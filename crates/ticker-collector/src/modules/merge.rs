//! 분할 스냅샷 병합 모듈.
//!
//! 분할 실행(`--part-index/--part-total`)으로 생성된 스냅샷들을 하나로 합칩니다.
//! 같은 심볼이 여러 파일에 있으면 섹터/산업이 모두 확인된 레코드를 우선하고,
//! 품질이 같으면 먼저 읽은 파일의 레코드를 유지합니다.

use std::path::{Path, PathBuf};

use ticker_data::{TickerRecord, TickerSnapshot};

use super::persist::{read_snapshot, write_snapshot};
use crate::error::PersistError;

/// 병합 결과
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeSummary {
    /// 읽은 파일 수
    pub files: usize,
    /// 병합된 종목 수
    pub symbols: usize,
    /// 더 나은 레코드로 교체된 종목 수
    pub upgraded: usize,
}

/// 스냅샷 병합
pub fn merge_snapshots<I>(parts: I) -> (TickerSnapshot, MergeSummary)
where
    I: IntoIterator<Item = TickerSnapshot>,
{
    let mut merged = TickerSnapshot::new();
    let mut summary = MergeSummary::default();

    for part in parts {
        summary.files += 1;
        for record in part.iter() {
            let better = match merged.get(&record.symbol) {
                Some(existing) => quality(record) > quality(existing),
                None => true,
            };
            if better && merged.replace(record.clone()).is_some() {
                summary.upgraded += 1;
            }
        }
    }

    summary.symbols = merged.len();
    (merged, summary)
}

/// 파일에서 읽어 병합 후 저장
pub fn merge_snapshot_files(
    inputs: &[PathBuf],
    output: &Path,
) -> Result<MergeSummary, PersistError> {
    let parts = inputs
        .iter()
        .map(|path| read_snapshot(path))
        .collect::<Result<Vec<_>, _>>()?;

    let (merged, summary) = merge_snapshots(parts);
    write_snapshot(&merged, output)?;

    tracing::info!(
        files = summary.files,
        symbols = summary.symbols,
        upgraded = summary.upgraded,
        output = %output.display(),
        "스냅샷 병합 완료"
    );
    Ok(summary)
}

fn quality(record: &TickerRecord) -> u8 {
    u8::from(record.is_resolved())
}
