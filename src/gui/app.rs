//! メインアプリケーションウィンドウ

use crate::api::ProcessClient;
use crate::config::AppConfig;
use crate::form::{is_excel_name, Mode, SelectedFile};
use crate::pdf::format_size;
use crate::session::{execute_submission, SubmitOutcome, UploadSession};
use crate::status::StatusKind;
use anyhow::{Context, Result};
use eframe::egui;
use egui::{CentralPanel, RichText, Vec2};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::warn;

use super::theme::{dark_theme, Colors};

const APP_TITLE: &str = "Splitora";

/// ワークフローの説明カード
const WORKFLOW_STEPS: &[(&str, &str, &str)] = &[
    ("01", "Ingest", "Upload PDF source ke dalam engine enkripsi."),
    ("02", "Logic", "Pilih mode split atau integrasi pemetaan Excel."),
    ("03", "Deploy", "Eksekusi proses dan unduh hasil paket ZIP."),
];

/// どの欄にファイルを入れるか
#[derive(Clone, Copy)]
enum Slot {
    Pdf,
    Excel,
}

/// アプリケーション状態
pub struct SplitoraApp {
    config: AppConfig,
    /// 処理サーバークライアント
    client: Arc<ProcessClient>,
    /// Tokioランタイム
    runtime: Runtime,
    /// 画面の状態
    session: UploadSession,
    /// 結果受信チャンネル
    outcome_rx: Receiver<SubmitOutcome>,
    /// 結果送信チャンネル
    outcome_tx: Sender<SubmitOutcome>,
}

impl SplitoraApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        let (outcome_tx, outcome_rx) = channel();
        let runtime = Runtime::new().context("Tokioランタイムの作成に失敗")?;
        let session = UploadSession::new(config.dismiss_after).context("プレビュー領域の作成に失敗")?;
        let client = Arc::new(ProcessClient::new(config.endpoint.clone()));

        Ok(Self {
            config,
            client,
            runtime,
            session,
            outcome_rx,
            outcome_tx,
        })
    }

    /// ファイルを読み込んで欄に入れる
    fn load_into(&mut self, slot: Slot, path: PathBuf) {
        let now = Instant::now();
        match SelectedFile::from_path(&path) {
            Ok(file) => match slot {
                Slot::Pdf => self.session.select_pdf(file, now),
                Slot::Excel => self.session.select_excel(file, now),
            },
            Err(e) => self.session.report_error(&e, now),
        }
    }

    fn pick_pdf(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF files", &["pdf"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.load_into(Slot::Pdf, path);
        }
    }

    fn pick_excel(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Excel files", &["xlsx", "xls"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            self.load_into(Slot::Excel, path);
        }
    }

    /// ドロップされたファイルを振り分け（.xlsx/.xls はExcel欄、それ以外はPDF欄）
    fn handle_dropped(&mut self, files: Vec<PathBuf>) {
        for path in files {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let slot = if is_excel_name(&name) {
                Slot::Excel
            } else {
                Slot::Pdf
            };
            self.load_into(slot, path);
        }
    }

    /// 送信
    fn submit(&mut self, ctx: &egui::Context) {
        let Ok(request) = self.session.begin_submit(Instant::now()) else {
            return;
        };

        let client = Arc::clone(&self.client);
        let outcome_tx = self.outcome_tx.clone();
        let download_dir = self.config.download_dir.clone();
        let ctx = ctx.clone();

        // バックグラウンドで処理
        self.runtime.spawn(async move {
            let outcome = execute_submission(&client, &request, &download_dir).await;
            let _ = outcome_tx.send(outcome);
            ctx.request_repaint();
        });
    }

    /// 結果を受信
    fn receive_outcome(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.session.complete_submit(outcome, Instant::now());
        }
    }

    fn open_result_folder(&mut self) {
        let Some(folder) = self.session.last_archive().and_then(|a| a.folder()) else {
            return;
        };
        if let Err(e) = open::that(folder) {
            warn!("フォルダを開けません: {:?}: {}", folder, e);
        }
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("SPLITORA")
                .size(28.0)
                .strong()
                .color(Colors::TEXT_PRIMARY));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(
                    self.session.last_archive().is_some(),
                    egui::Button::new("📁 Buka Folder"),
                ).clicked() {
                    self.open_result_folder();
                }
            });
        });

        ui.label(RichText::new("Automate your PDF Workflow.")
            .size(20.0)
            .italics()
            .color(Colors::ACCENT));

        ui.label(RichText::new(
            "Pengolah dokumen berbasis AI yang presisi. Pisahkan, namai ulang, dan kelola aset digital dengan keamanan tingkat tinggi.",
        )
        .size(13.0)
        .color(Colors::TEXT_SECONDARY));

        ui.add_space(6.0);

        ui.columns(WORKFLOW_STEPS.len(), |columns| {
            for (column, (id, title, desc)) in columns.iter_mut().zip(WORKFLOW_STEPS) {
                egui::Frame::new()
                    .fill(Colors::BG_CARD)
                    .stroke(egui::Stroke::new(1.0, Colors::BORDER))
                    .corner_radius(16.0)
                    .inner_margin(12.0)
                    .show(column, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.label(RichText::new(*id).size(18.0).strong().color(Colors::TEXT_MUTED));
                        ui.label(RichText::new(title.to_uppercase()).size(13.0).strong().color(Colors::TEXT_PRIMARY));
                        ui.label(RichText::new(*desc).size(11.0).color(Colors::TEXT_SECONDARY));
                    });
            }
        });
    }

    fn mode_selector(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("MODE SELECTION")
            .size(11.0)
            .strong()
            .color(Colors::ACCENT));

        ui.columns(2, |columns| {
            for (column, mode) in columns.iter_mut().zip([Mode::Split, Mode::Rename]) {
                let selected = self.session.mode() == mode;
                let text = RichText::new(mode.label().to_uppercase())
                    .strong()
                    .color(if selected { Colors::ACCENT } else { Colors::TEXT_MUTED });
                let button = egui::Button::new(text)
                    .fill(if selected { Colors::BG_HOVER } else { Colors::BG_INSET })
                    .stroke(egui::Stroke::new(1.0, if selected { Colors::ACCENT } else { Colors::BORDER }))
                    .min_size(Vec2::new(column.available_width(), 40.0));
                if column.add(button).clicked() {
                    self.session.set_mode(mode);
                }
            }
        });
    }

    fn pdf_section(&mut self, ui: &mut egui::Ui) {
        let Some(preview) = self.session.preview() else {
            if self.session.pdf().is_none() {
                self.drop_zone(ui);
                return;
            }
            // プレビュー作成に失敗した場合もPDFは選択済み
            let name = self.session.pdf().map(|f| f.name.clone()).unwrap_or_default();
            self.preview_header(ui);
            ui.label(RichText::new(name).color(Colors::TEXT_PRIMARY));
            return;
        };

        let name = preview.file_name().to_string();
        let size = format_size(preview.size());
        let pages = preview
            .page_count()
            .map(|n| format!("{} halaman", n))
            .unwrap_or_else(|| "halaman tidak diketahui".to_string());

        self.preview_header(ui);

        let mut open_clicked = false;
        egui::Frame::new()
            .fill(Colors::BG_INSET)
            .stroke(egui::Stroke::new(1.0, Colors::BORDER))
            .corner_radius(24.0)
            .inner_margin(20.0)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new("📄").size(40.0));
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&name).size(15.0).strong().color(Colors::TEXT_PRIMARY));
                        ui.label(RichText::new(format!("{} · {}", size, pages))
                            .size(12.0)
                            .color(Colors::TEXT_SECONDARY));
                        open_clicked = ui.button("Buka Preview").clicked();
                    });
                });
            });

        if open_clicked {
            if let Some(preview) = self.session.preview() {
                if let Err(e) = preview.open_external() {
                    self.session.report_error(&e, Instant::now());
                }
            }
        }
    }

    fn preview_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("NEURAL PREVIEW")
                .size(11.0)
                .strong()
                .color(Colors::ACCENT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let eject = egui::Button::new(RichText::new("EJECT").strong().color(Colors::ERROR))
                    .frame(false);
                if ui.add(eject).clicked() {
                    self.session.eject();
                }
            });
        });
    }

    fn drop_zone(&mut self, ui: &mut egui::Ui) {
        let is_hovering = !ui.ctx().input(|i| i.raw.hovered_files.is_empty());

        let frame_color = if is_hovering {
            Colors::ACCENT
        } else {
            Colors::BORDER
        };

        let bg_color = if is_hovering {
            Colors::BG_HOVER
        } else {
            Colors::BG_CARD
        };

        let response = egui::Frame::new()
            .fill(bg_color)
            .stroke(egui::Stroke::new(2.0, frame_color))
            .corner_radius(24.0)
            .inner_margin(30.0)
            .show(ui, |ui| {
                ui.set_min_size(Vec2::new(ui.available_width(), 150.0));
                ui.vertical_centered(|ui| {
                    let icon = if is_hovering { "📥" } else { "＋" };
                    ui.label(RichText::new(icon).size(48.0).color(Colors::TEXT_SECONDARY));
                    ui.label(RichText::new("UPLOAD ASSET PDF")
                        .size(14.0)
                        .strong()
                        .color(Colors::TEXT_PRIMARY));
                    ui.label(RichText::new("Klik atau seret file PDF ke sini")
                        .size(12.0)
                        .color(Colors::TEXT_SECONDARY));
                });
            })
            .response
            .interact(egui::Sense::click());

        // クリックでファイル選択
        if response.clicked() {
            self.pick_pdf();
        }
    }

    fn excel_section(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("LOGIC MAPPING (EXCEL)")
            .size(11.0)
            .strong()
            .color(Colors::TEXT_MUTED));

        let label = self
            .session
            .excel()
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "Select Dataset (.xlsx)".to_string());

        let response = egui::Frame::new()
            .fill(Colors::BG_CARD)
            .stroke(egui::Stroke::new(1.0, Colors::BORDER))
            .corner_radius(16.0)
            .inner_margin(14.0)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new("📊").size(24.0).color(Colors::ACCENT));
                    ui.label(RichText::new(label).size(13.0).strong().color(Colors::TEXT_PRIMARY));
                });
            })
            .response
            .interact(egui::Sense::click());

        if response.clicked() {
            self.pick_excel();
        }
    }

    fn status_area(&self, ui: &mut egui::Ui) {
        let Some(message) = self.session.status().current() else {
            return;
        };

        let (icon, color) = match message.kind {
            StatusKind::Error => ("⚠", Colors::ERROR),
            StatusKind::Success => ("✓", Colors::SUCCESS),
        };

        egui::Frame::new()
            .fill(color.gamma_multiply(0.1))
            .stroke(egui::Stroke::new(1.0, color.gamma_multiply(0.4)))
            .corner_radius(12.0)
            .inner_margin(egui::Margin::symmetric(14, 10))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(icon).size(14.0).color(color));
                    ui.label(RichText::new(message.text.to_uppercase())
                        .size(12.0)
                        .strong()
                        .color(color));
                });
            });
    }

    fn submit_button(&mut self, ui: &mut egui::Ui) {
        let loading = self.session.is_loading();

        let text = if loading {
            "NODE PROCESSING..."
        } else {
            "RUN LOGIC ENGINE  →"
        };

        let button = egui::Button::new(RichText::new(text).size(14.0).strong().color(Colors::BG_DARK))
            .fill(Colors::ACCENT)
            .min_size(Vec2::new(ui.available_width(), 52.0));

        if ui.add_enabled(!loading, button).clicked() {
            let ctx = ui.ctx().clone();
            self.submit(&ctx);
        }

        if loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(format!("Mengirim ke {}", self.client.endpoint()))
                    .size(12.0)
                    .color(Colors::ACCENT));
            });
        }
    }

    fn result_section(&self, ui: &mut egui::Ui) {
        let Some(archive) = self.session.last_archive() else {
            return;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new(archive.file_name())
                .size(16.0)
                .color(Colors::TEXT_PRIMARY));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(format!(
                    "{} file · {}",
                    archive.entries.len(),
                    archive.saved_at.format("%H:%M:%S")
                ))
                .size(13.0)
                .color(Colors::TEXT_SECONDARY));
            });
        });

        egui::Frame::new()
            .fill(Colors::BG_CARD)
            .corner_radius(12.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                if archive.entries.is_empty() {
                    ui.label(RichText::new(archive.path.display().to_string())
                        .size(12.0)
                        .color(Colors::TEXT_SECONDARY));
                }
                for entry in &archive.entries {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("✓").size(13.0).color(Colors::SUCCESS));
                        ui.label(RichText::new(entry).size(13.0).color(Colors::TEXT_PRIMARY));
                    });
                }
            });
    }
}

impl eframe::App for SplitoraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 結果を受信
        self.receive_outcome();

        let now = Instant::now();
        self.session.tick(now);

        // ドロップされたファイルを処理
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            let files: Vec<PathBuf> = ctx.input(|i| {
                i.raw.dropped_files
                    .iter()
                    .filter_map(|f| f.path.clone())
                    .collect()
            });

            if !files.is_empty() {
                self.handle_dropped(files);
            }
        }

        // 処理中は再描画を要求、メッセージは消去時刻に再描画
        if self.session.is_loading() {
            ctx.request_repaint();
        } else if let Some(remaining) = self.session.status().remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(8.0, 12.0);

                    self.header(ui);

                    ui.add_space(10.0);

                    egui::Frame::new()
                        .fill(Colors::BG_CARD)
                        .stroke(egui::Stroke::new(1.0, Colors::BORDER))
                        .corner_radius(32.0)
                        .inner_margin(28.0)
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            self.mode_selector(ui);
                            ui.add_space(8.0);
                            self.pdf_section(ui);

                            if self.session.mode() == Mode::Rename {
                                ui.add_space(4.0);
                                self.excel_section(ui);
                            }

                            ui.add_space(8.0);
                            self.status_area(ui);
                            self.submit_button(ui);
                        });

                    ui.add_space(10.0);

                    self.result_section(ui);
                });

            // ステータスバー
            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                ui.label(RichText::new(format!("© 2026 SPLITORA · {}", self.config.download_dir.display()))
                    .size(11.0)
                    .color(Colors::TEXT_MUTED));
            });
        });
    }
}

/// アプリケーションを起動
pub fn run(config: AppConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 860.0])
            .with_min_inner_size([600.0, 640.0])
            .with_title(APP_TITLE)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let app = SplitoraApp::new(config)?;

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            // ダークテーマを設定
            cc.egui_ctx.set_style(dark_theme());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("アプリケーションエラー: {}", e))
}
