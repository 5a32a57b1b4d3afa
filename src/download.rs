//! 結果ZIPの保存

use crate::error::{Result, SplitoraError};
use chrono::{DateTime, Local};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 保存するファイル名
pub const RESULT_FILENAME: &str = "splitora-result.zip";

/// 保存済みの結果
#[derive(Debug, Clone)]
pub struct SavedArchive {
    pub path: PathBuf,
    /// ZIP内のファイル名（ZIPとして読めなかった場合は空）
    pub entries: Vec<String>,
    pub saved_at: DateTime<Local>,
}

impl SavedArchive {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(RESULT_FILENAME)
    }

    pub fn folder(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// サーバーから受け取った内容を保存先フォルダに書き出す
pub fn save_archive(directory: &Path, bytes: &[u8]) -> Result<SavedArchive> {
    std::fs::create_dir_all(directory).map_err(|e| SplitoraError::io(directory, e))?;

    let filename = get_unique_filename(directory, RESULT_FILENAME);
    let path = directory.join(&filename);
    std::fs::write(&path, bytes).map_err(|e| SplitoraError::io(&path, e))?;

    let entries = match list_entries(bytes) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("結果をZIPとして読めません: {}", e);
            Vec::new()
        }
    };

    info!("結果を保存: {:?} ({} 件, {} bytes)", path, entries.len(), bytes.len());

    Ok(SavedArchive {
        path,
        entries,
        saved_at: Local::now(),
    })
}

/// ZIP内のファイル名一覧
fn list_entries(bytes: &[u8]) -> zip::result::ZipResult<Vec<String>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if !file.is_dir() {
            entries.push(file.name().to_string());
        }
    }
    Ok(entries)
}

/// ユニークなファイル名を取得（同名ファイルがある場合は連番を付与）
pub fn get_unique_filename(directory: &Path, filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("zip");

    let mut final_name = filename.to_string();
    let mut counter = 1;

    while directory.join(&final_name).exists() {
        final_name = format!("{}_{}.{}", stem, counter, ext);
        counter += 1;
    }

    final_name
}
