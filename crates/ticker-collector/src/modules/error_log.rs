//! 조회 실패 로그 모듈.
//!
//! 실패한 종목마다 한 줄씩 추가합니다. 파일은 실행 간 누적되며
//! 이 모듈은 파일을 비우거나 순환(rotate)하지 않습니다.
//!
//! 형식: `YYYY-MM-DD HH:MM:SS UTC - {symbol}: {reason}`

use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 추가 전용 오류 로그
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    file: File,
    written: usize,
}

impl ErrorLog {
    /// 로그 파일을 추가 모드로 열기 (상위 디렉토리 자동 생성)
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// 실패 항목 기록
    pub fn append(&mut self, symbol: &str, reason: &str) -> io::Result<()> {
        let line = format_entry(Utc::now(), symbol, reason);
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.written += 1;
        Ok(())
    }

    /// 이번 실행에서 기록한 항목 수
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 로그 한 줄 생성 (개행 포함)
pub fn format_entry(timestamp: DateTime<Utc>, symbol: &str, reason: &str) -> String {
    format!(
        "{} UTC - {}: {}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        symbol,
        reason.replace('\n', " ")
    )
}
