//! 스냅샷 저장 모듈.
//!
//! 같은 디렉토리의 임시 파일에 기록하고 동기화한 뒤 대상 경로로 rename합니다.
//! 다른 프로세스는 이전 파일 또는 완성된 새 파일만 보게 되며,
//! 저장에 실패하면 이전 스냅샷은 그대로 남습니다.
//!
//! 기존 파일이 있으면 그 권한을 유지하고, 새 파일은 0644로 생성합니다.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use ticker_data::TickerSnapshot;

use crate::error::PersistError;

/// 스냅샷을 JSON으로 원자적 저장
pub fn write_snapshot(snapshot: &TickerSnapshot, path: &Path) -> Result<(), PersistError> {
    let json = snapshot
        .to_json_pretty()
        .map_err(|e| PersistError::serialize(path, e))?;

    write_atomic(path, |file| {
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")
    })
    .map_err(|e| PersistError::io(path, e))?;

    tracing::info!(path = %path.display(), count = snapshot.len(), "스냅샷 저장 완료");
    Ok(())
}

/// 미확인 종목 목록을 한 줄에 하나씩 원자적 저장
pub fn write_symbol_list(symbols: &[String], path: &Path) -> Result<(), PersistError> {
    write_atomic(path, |file| {
        for symbol in symbols {
            writeln!(file, "{}", symbol)?;
        }
        Ok(())
    })
    .map_err(|e| PersistError::io(path, e))?;

    tracing::info!(path = %path.display(), count = symbols.len(), "미확인 종목 목록 저장");
    Ok(())
}

/// 임시 파일에 기록 후 대상 경로로 rename.
///
/// `write`가 실패하면 임시 파일은 drop 시점에 삭제되고 대상 파일은 변경되지 않습니다.
fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let permissions = target_permissions(path)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    // NamedTempFile은 0600으로 생성됨
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// 기존 대상 파일의 권한, 없으면 기본 권한
fn target_permissions(path: &Path) -> io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// 저장된 스냅샷 읽기
pub fn read_snapshot(path: &Path) -> Result<TickerSnapshot, PersistError> {
    let json = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    TickerSnapshot::from_json(&json).map_err(|e| PersistError::serialize(path, e))
}
