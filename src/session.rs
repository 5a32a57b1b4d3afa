//! 画面の状態管理 - ファイル選択・送信・結果表示

use crate::api::{ProcessClient, ProcessRequest};
use crate::download::{save_archive, SavedArchive};
use crate::error::{Result, SplitoraError};
use crate::form::{Mode, SelectedFile};
use crate::pdf::{PdfPreview, PreviewStore};
use crate::status::StatusBoard;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 処理成功時の表示文言
pub const SUCCESS_MESSAGE: &str = "Proses berhasil. File berhasil diunduh.";

/// 送信処理の結果（保存済みZIP またはエラー）
pub type SubmitOutcome = Result<SavedArchive>;

/// 1画面分の一時的な状態
pub struct UploadSession {
    mode: Mode,
    pdf: Option<SelectedFile>,
    preview: Option<PdfPreview>,
    excel: Option<SelectedFile>,
    loading: bool,
    status: StatusBoard,
    last_archive: Option<SavedArchive>,
    previews: PreviewStore,
}

impl UploadSession {
    pub fn new(dismiss_after: Duration) -> Result<Self> {
        Ok(Self::with_store(dismiss_after, PreviewStore::new()?))
    }

    pub fn with_store(dismiss_after: Duration, previews: PreviewStore) -> Self {
        Self {
            mode: Mode::default(),
            pdf: None,
            preview: None,
            excel: None,
            loading: false,
            status: StatusBoard::new(dismiss_after),
            last_archive: None,
            previews,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pdf(&self) -> Option<&SelectedFile> {
        self.pdf.as_ref()
    }

    pub fn preview(&self) -> Option<&PdfPreview> {
        self.preview.as_ref()
    }

    pub fn excel(&self) -> Option<&SelectedFile> {
        self.excel.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn last_archive(&self) -> Option<&SavedArchive> {
        self.last_archive.as_ref()
    }

    /// 解放されていないプレビューの数
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    /// モード切替（Excelは保持したまま、rename の時だけ送る）
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// PDFを選択
    pub fn select_pdf(&mut self, file: SelectedFile, now: Instant) {
        self.status.clear();

        if !file.is_pdf() {
            warn!("PDF以外が選択されました: {} ({})", file.name, file.media_type);
            let err = SplitoraError::InvalidPdf {
                file_name: file.name,
                media_type: file.media_type,
            };
            self.status.post_error(err.user_message(), now);
            self.pdf = None;
            self.preview = None;
            return;
        }

        // 古いプレビューはここで解放される
        self.preview = match self.previews.acquire(&file) {
            Ok(preview) => Some(preview),
            Err(e) => {
                warn!("プレビューを作成できません: {}", e);
                None
            }
        };
        info!("PDF選択: {} ({} bytes)", file.name, file.len());
        self.pdf = Some(file);
    }

    /// Excelファイルを選択
    pub fn select_excel(&mut self, file: SelectedFile, now: Instant) {
        self.status.clear();

        if !file.is_excel() {
            warn!("Excel以外が選択されました: {}", file.name);
            let err = SplitoraError::InvalidExcel {
                file_name: file.name,
            };
            self.status.post_error(err.user_message(), now);
            self.excel = None;
            return;
        }

        info!("Excel選択: {}", file.name);
        self.excel = Some(file);
    }

    /// PDF・プレビュー・Excel をまとめて外す
    pub fn eject(&mut self) {
        self.pdf = None;
        self.preview = None;
        self.excel = None;
    }

    /// 画面側で起きたエラーを表示
    pub fn report_error(&mut self, err: &SplitoraError, now: Instant) {
        warn!("{}", err);
        self.status.post_error(err.user_message(), now);
    }

    /// 送信開始。入力が揃っていなければエラーを表示して通信しない
    pub fn begin_submit(&mut self, now: Instant) -> Result<ProcessRequest> {
        if self.loading {
            return Err(SplitoraError::Busy);
        }

        self.status.clear();

        let request = match self.validated_request() {
            Ok(request) => request,
            Err(err) => {
                self.report_error(&err, now);
                return Err(err);
            }
        };

        self.loading = true;
        Ok(request)
    }

    fn validated_request(&self) -> Result<ProcessRequest> {
        let pdf = self.pdf.clone().ok_or(SplitoraError::MissingPdf)?;
        let excel = if self.mode.requires_excel() {
            Some(self.excel.clone().ok_or(SplitoraError::MissingExcel)?)
        } else {
            None
        };
        Ok(ProcessRequest {
            mode: self.mode,
            pdf,
            excel,
        })
    }

    /// 送信完了。結果に応じてメッセージを出し、処理中フラグは必ず下ろす
    pub fn complete_submit(&mut self, outcome: SubmitOutcome, now: Instant) {
        match outcome {
            Ok(archive) => {
                info!("処理完了: {:?}", archive.path);
                self.last_archive = Some(archive);
                self.status.post_success(SUCCESS_MESSAGE, now);
            }
            Err(err) => self.report_error(&err, now),
        }
        self.loading = false;
    }

    /// メッセージの自動消去。消えた場合は true
    pub fn tick(&mut self, now: Instant) -> bool {
        self.status.tick(now)
    }
}

/// 送信して結果を保存する（バックグラウンドタスクで実行）
pub async fn execute_submission(
    client: &ProcessClient,
    request: &ProcessRequest,
    download_dir: &Path,
) -> SubmitOutcome {
    let bytes = client.process(request).await?;
    save_archive(download_dir, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GENERIC_FAILURE_MESSAGE, WRONG_FILE_MESSAGE};
    use std::path::PathBuf;

    const DELAY: Duration = Duration::from_secs(5);

    fn session() -> UploadSession {
        UploadSession::new(DELAY).unwrap()
    }

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(name, b"%PDF-1.4".to_vec())
    }

    fn archive() -> SavedArchive {
        SavedArchive {
            path: PathBuf::from("/tmp/splitora-result.zip"),
            entries: vec!["a.pdf".into()],
            saved_at: chrono::Local::now(),
        }
    }

    #[test]
    fn non_pdf_selection_leaves_slot_empty() {
        let now = Instant::now();
        let mut s = session();
        for name in ["photo.png", "doc.docx", "noext", "pdf.txt"] {
            s.select_pdf(SelectedFile::new(name, vec![1, 2, 3]), now);
            assert!(s.pdf().is_none(), "{name}");
            assert!(s.preview().is_none());
            assert_eq!(s.status().error(), Some(WRONG_FILE_MESSAGE));
        }
    }

    #[test]
    fn invalid_pdf_clears_previous_selection() {
        let now = Instant::now();
        let mut s = session();
        s.select_pdf(pdf("ok.pdf"), now);
        assert!(s.preview().is_some());

        s.select_pdf(SelectedFile::new("bad.doc", vec![0]), now);
        assert!(s.pdf().is_none());
        assert!(s.preview().is_none());
        assert_eq!(s.live_previews(), 0);
    }

    #[test]
    fn valid_selection_clears_error() {
        let now = Instant::now();
        let mut s = session();
        s.select_pdf(SelectedFile::new("bad.doc", vec![0]), now);
        s.select_pdf(pdf("ok.pdf"), now);
        assert!(s.status().current().is_none());
        assert_eq!(s.pdf().map(|f| f.name.as_str()), Some("ok.pdf"));
    }

    #[test]
    fn replacing_pdf_releases_previous_preview() {
        let now = Instant::now();
        let mut s = session();
        for i in 0..10 {
            s.select_pdf(pdf(&format!("doc{i}.pdf")), now);
            assert_eq!(s.live_previews(), 1);
        }
        s.eject();
        assert_eq!(s.live_previews(), 0);
    }

    #[test]
    fn excel_selection_checks_extension() {
        let now = Instant::now();
        let mut s = session();
        s.select_excel(SelectedFile::new("map.XLSX", vec![0]), now);
        assert_eq!(s.excel().map(|f| f.name.as_str()), Some("map.XLSX"));

        s.select_excel(SelectedFile::new("map.csv", vec![0]), now);
        assert!(s.excel().is_none());
        assert_eq!(s.status().error(), Some(WRONG_FILE_MESSAGE));
    }

    #[test]
    fn submit_without_pdf_fails_fast() {
        let now = Instant::now();
        let mut s = session();
        let err = s.begin_submit(now).unwrap_err();
        assert!(matches!(err, SplitoraError::MissingPdf));
        assert!(!s.is_loading());
        assert_eq!(s.status().error(), Some(WRONG_FILE_MESSAGE));
    }

    #[test]
    fn rename_without_excel_fails_fast() {
        let now = Instant::now();
        let mut s = session();
        s.set_mode(Mode::Rename);
        s.select_pdf(pdf("ok.pdf"), now);

        let err = s.begin_submit(now).unwrap_err();
        assert!(matches!(err, SplitoraError::MissingExcel));
        assert!(!s.is_loading());
    }

    #[test]
    fn split_request_omits_stored_excel() {
        let now = Instant::now();
        let mut s = session();
        s.set_mode(Mode::Rename);
        s.select_excel(SelectedFile::new("map.xls", vec![0]), now);
        s.set_mode(Mode::Split);
        s.select_pdf(pdf("ok.pdf"), now);

        let request = s.begin_submit(now).unwrap();
        assert_eq!(request.mode, Mode::Split);
        assert!(request.excel.is_none());
        assert!(s.is_loading());
        // Excel は保持されている
        assert!(s.excel().is_some());
    }

    #[test]
    fn rename_request_includes_excel() {
        let now = Instant::now();
        let mut s = session();
        s.set_mode(Mode::Rename);
        s.select_pdf(pdf("ok.pdf"), now);
        s.select_excel(SelectedFile::new("map.xlsx", vec![0]), now);

        let request = s.begin_submit(now).unwrap();
        assert_eq!(request.excel.map(|f| f.name), Some("map.xlsx".to_string()));
    }

    #[test]
    fn second_submit_while_loading_is_refused() {
        let now = Instant::now();
        let mut s = session();
        s.select_pdf(pdf("ok.pdf"), now);
        s.begin_submit(now).unwrap();

        assert!(matches!(s.begin_submit(now), Err(SplitoraError::Busy)));
        assert!(s.is_loading());
    }

    #[test]
    fn success_posts_message_and_clears_loading() {
        let now = Instant::now();
        let mut s = session();
        s.select_pdf(pdf("ok.pdf"), now);
        s.begin_submit(now).unwrap();

        s.complete_submit(Ok(archive()), now);
        assert!(!s.is_loading());
        assert_eq!(s.status().success(), Some(SUCCESS_MESSAGE));
        assert_eq!(s.last_archive().map(|a| a.file_name()), Some("splitora-result.zip"));
    }

    #[test]
    fn failure_posts_server_or_generic_message() {
        let now = Instant::now();
        let mut s = session();
        s.select_pdf(pdf("ok.pdf"), now);

        s.begin_submit(now).unwrap();
        s.complete_submit(
            Err(SplitoraError::Server {
                status: 400,
                message: "bad file".into(),
            }),
            now,
        );
        assert_eq!(s.status().error(), Some("bad file"));
        assert!(!s.is_loading());

        s.begin_submit(now).unwrap();
        s.complete_submit(
            Err(SplitoraError::io(
                "/nowhere",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            )),
            now,
        );
        assert_eq!(s.status().error(), Some(GENERIC_FAILURE_MESSAGE));
        assert!(!s.is_loading());
    }

    #[test]
    fn messages_auto_dismiss() {
        let start = Instant::now();
        let mut s = session();
        s.select_pdf(SelectedFile::new("bad.doc", vec![0]), start);

        assert!(!s.tick(start + Duration::from_secs(1)));
        assert!(s.status().error().is_some());
        assert!(s.tick(start + DELAY));
        assert!(s.status().current().is_none());
    }

    #[test]
    fn eject_clears_everything() {
        let now = Instant::now();
        let mut s = session();
        s.set_mode(Mode::Rename);
        s.select_pdf(pdf("ok.pdf"), now);
        s.select_excel(SelectedFile::new("map.xlsx", vec![0]), now);

        s.eject();
        assert!(s.pdf().is_none());
        assert!(s.preview().is_none());
        assert!(s.excel().is_none());
        assert_eq!(s.mode(), Mode::Rename);
    }
}
