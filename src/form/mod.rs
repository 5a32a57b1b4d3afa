//! 入力フォーム - 処理モードと選択ファイルの検証

use crate::error::{Result, SplitoraError};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// 拡張子とメディアタイプの対応表
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("pdf", PDF_MEDIA_TYPE),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xls", "application/vnd.ms-excel"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("zip", "application/zip"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// 処理モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// PDFをページごとに分割
    #[default]
    Split,
    /// Excelの対応表に従ってリネーム
    Rename,
}

impl Mode {
    /// サーバーへ送る値
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Split => "split",
            Mode::Rename => "rename",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Split => "Split PDF",
            Mode::Rename => "Rename PDF",
        }
    }

    /// Excelファイルが必要か
    pub fn requires_excel(self) -> bool {
        self == Mode::Rename
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 選択されたファイル（内容はメモリに保持）
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    /// 名前と内容から作成（メディアタイプは拡張子から判定）
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let media_type = media_type_for_name(&name).to_string();
        Self {
            name,
            media_type,
            bytes,
        }
    }

    /// ディスク上のファイルを読み込む
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SplitoraError::io(path, e))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// PDFとして受け付けられるか（メディアタイプが完全一致）
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    /// Excelとして受け付けられるか（ファイル名の拡張子で判定）
    pub fn is_excel(&self) -> bool {
        is_excel_name(&self.name)
    }
}

/// ファイル名からメディアタイプを判定（大文字小文字は区別しない）
pub fn media_type_for_name(name: &str) -> &'static str {
    let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
        return OCTET_STREAM_MEDIA_TYPE;
    };
    MEDIA_TYPES
        .iter()
        .find(|(known, _)| ext.eq_ignore_ascii_case(known))
        .map(|(_, media_type)| *media_type)
        .unwrap_or(OCTET_STREAM_MEDIA_TYPE)
}

/// ファイル名が .xlsx / .xls で終わるか
pub fn is_excel_name(name: &str) -> bool {
    static EXCEL_NAME: OnceLock<Regex> = OnceLock::new();
    EXCEL_NAME
        .get_or_init(|| Regex::new(r"(?i)(\.xlsx|\.xls)$").expect("valid excel pattern"))
        .is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_wire_values() {
        assert_eq!(Mode::Split.as_str(), "split");
        assert_eq!(Mode::Rename.as_str(), "rename");
        assert_eq!(Mode::default(), Mode::Split);
        assert!(Mode::Rename.requires_excel());
        assert!(!Mode::Split.requires_excel());
    }

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(media_type_for_name("report.pdf"), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for_name("REPORT.PDF"), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for_name("scan.png"), "image/png");
        assert_eq!(media_type_for_name("notes"), OCTET_STREAM_MEDIA_TYPE);
        assert_eq!(media_type_for_name("report.pdf.exe"), OCTET_STREAM_MEDIA_TYPE);
    }

    #[test]
    fn pdf_check_uses_media_type() {
        assert!(SelectedFile::new("a.pdf", b"%PDF-1.4".to_vec()).is_pdf());
        assert!(!SelectedFile::new("a.docx", b"%PDF-1.4".to_vec()).is_pdf());
        assert!(!SelectedFile::new("pdf", Vec::new()).is_pdf());
    }

    #[test]
    fn excel_names() {
        for ok in ["map.xlsx", "map.xls", "MAP.XLSX", "a.b.Xls"] {
            assert!(is_excel_name(ok), "{ok}");
        }
        for bad in ["map.csv", "map.xlsx.bak", "xlsx", "map.xlsm", "map."] {
            assert!(!is_excel_name(bad), "{bad}");
        }
    }

    #[test]
    fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "input.pdf");
        assert_eq!(file.len(), 8);
        assert!(file.is_pdf());

        let missing = SelectedFile::from_path(dir.path().join("missing.pdf"));
        assert!(matches!(missing, Err(SplitoraError::Io { .. })));
    }
}
