//! PDFプレビュー - 選択したPDFの一時スナップショット
//!
//! プレビューは一時フォルダ内のコピーとして作成し、`PdfPreview` を破棄した
//! 時点で削除する。差し替え時・アプリ終了時に必ず解放される。

use crate::error::{Result, SplitoraError};
use crate::form::SelectedFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tracing::{debug, warn};

/// プレビューの置き場（一時フォルダごと管理）
pub struct PreviewStore {
    dir: TempDir,
    next_id: u64,
    live: Arc<AtomicUsize>,
}

impl PreviewStore {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("splitora_preview")
            .tempdir()
            .map_err(|e| SplitoraError::io(std::env::temp_dir(), e))?;
        Ok(Self {
            dir,
            next_id: 0,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// 解放されていないプレビューの数
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// プレビューを作成
    pub fn acquire(&mut self, file: &SelectedFile) -> Result<PdfPreview> {
        self.next_id += 1;
        let path = self.dir.path().join(format!("preview-{}.pdf", self.next_id));
        std::fs::write(&path, &file.bytes).map_err(|e| SplitoraError::io(&path, e))?;

        self.live.fetch_add(1, Ordering::SeqCst);
        debug!("プレビュー作成: {:?}", path);

        Ok(PdfPreview {
            path,
            file_name: file.name.clone(),
            size: file.len(),
            page_count: count_pages(&file.bytes),
            live: Arc::clone(&self.live),
        })
    }
}

/// 選択中PDFのプレビュー。破棄すると一時ファイルも消える
#[derive(Debug)]
pub struct PdfPreview {
    path: PathBuf,
    file_name: String,
    size: usize,
    page_count: Option<usize>,
    live: Arc<AtomicUsize>,
}

impl PdfPreview {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// ページ数（解析できなかった場合は None）
    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    /// 既定のPDFビューアで開く
    pub fn open_external(&self) -> Result<()> {
        open::that(&self.path).map_err(|e| SplitoraError::io(&self.path, e))
    }
}

impl Drop for PdfPreview {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("プレビューの削除に失敗: {:?}: {}", self.path, e);
            }
        }
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// PDFのページ数を数える
fn count_pages(bytes: &[u8]) -> Option<usize> {
    match lopdf::Document::load_mem(bytes) {
        Ok(doc) => Some(doc.get_pages().len()),
        Err(e) => {
            debug!("ページ数を取得できません: {}", e);
            None
        }
    }
}

/// ファイルサイズを表示用に整形
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Document, Object, dictionary};

    fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
                .into()
            })
            .collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn preview_reports_page_count() {
        let mut store = PreviewStore::new().unwrap();
        let preview = store
            .acquire(&SelectedFile::new("three.pdf", sample_pdf(3)))
            .unwrap();
        assert_eq!(preview.page_count(), Some(3));
        assert_eq!(preview.file_name(), "three.pdf");
        assert!(preview.path().exists());
    }

    #[test]
    fn unparsable_pdf_still_gets_a_preview() {
        let mut store = PreviewStore::new().unwrap();
        let preview = store
            .acquire(&SelectedFile::new("broken.pdf", b"not really a pdf".to_vec()))
            .unwrap();
        assert_eq!(preview.page_count(), None);
        assert_eq!(preview.size(), 16);
    }

    #[test]
    fn dropping_preview_releases_it() {
        let mut store = PreviewStore::new().unwrap();
        let file = SelectedFile::new("a.pdf", b"%PDF-1.4".to_vec());

        let mut current = Some(store.acquire(&file).unwrap());
        let first_path = current.as_ref().unwrap().path().to_path_buf();

        for _ in 0..5 {
            current = Some(store.acquire(&file).unwrap());
            assert_eq!(store.live_count(), 1);
        }
        assert!(!first_path.exists());

        drop(current);
        assert_eq!(store.live_count(), 0);
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
    }

    #[test]
    fn dropping_store_removes_directory() {
        let store = PreviewStore::new().unwrap();
        let dir = store.dir().to_path_buf();
        assert!(dir.exists());
        drop(store);
        assert!(!dir.exists());
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
