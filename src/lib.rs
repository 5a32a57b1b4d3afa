//! Splitora - PDFの分割・リネームを処理サーバーに依頼するデスクトップクライアント
//!
//! # 機能
//! - 処理モード（split / rename）の選択
//! - PDF・Excel（対応表）の選択と形式チェック、PDFプレビュー
//! - multipart でサーバーへ送信し、結果ZIPをダウンロードフォルダへ保存
//! - エラー/成功メッセージの自動消去
//! - ドラッグ＆ドロップ対応GUI

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod form;
pub mod gui;
pub mod pdf;
pub mod session;
pub mod status;

pub use config::AppConfig;
pub use error::{Result, SplitoraError};
pub use form::{Mode, SelectedFile};
pub use session::UploadSession;
