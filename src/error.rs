//! エラー型とユーザー向けメッセージ

use std::path::PathBuf;
use thiserror::Error;

/// ファイル種別が違う・必須ファイルが無い場合の表示文言
pub const WRONG_FILE_MESSAGE: &str = "File Yang kamu Upload Salah atau tidak Sama!";

/// 原因を表示できない失敗の表示文言
pub const GENERIC_FAILURE_MESSAGE: &str = "Terjadi kegagalan sistem. Coba lagi nanti.";

/// サーバーがエラーメッセージを返さなかった場合の文言
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

pub type Result<T> = std::result::Result<T, SplitoraError>;

#[derive(Debug, Error)]
pub enum SplitoraError {
    /// PDF以外のファイルがPDF欄に選択された
    #[error("{msg} (pdf: {file_name}, type: {media_type})", msg = WRONG_FILE_MESSAGE)]
    InvalidPdf { file_name: String, media_type: String },

    /// .xlsx / .xls 以外のファイルがExcel欄に選択された
    #[error("{msg} (excel: {file_name})", msg = WRONG_FILE_MESSAGE)]
    InvalidExcel { file_name: String },

    #[error("{msg} (pdf missing)", msg = WRONG_FILE_MESSAGE)]
    MissingPdf,

    #[error("{msg} (excel missing for rename)", msg = WRONG_FILE_MESSAGE)]
    MissingExcel,

    /// 送信中に再送信しようとした
    #[error("a submission is already in progress")]
    Busy,

    /// サーバーが2xx以外を返した
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("通信エラー: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ファイル入出力エラー {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定エラー: {0}")]
    Config(String),
}

impl SplitoraError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 入力チェックで弾かれたエラーかどうか（通信前に確定する）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidPdf { .. } | Self::InvalidExcel { .. } | Self::MissingPdf | Self::MissingExcel
        )
    }

    /// 画面に表示する文言
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPdf { .. }
            | Self::InvalidExcel { .. }
            | Self::MissingPdf
            | Self::MissingExcel => WRONG_FILE_MESSAGE.to_string(),
            Self::Server { message, .. } if !message.is_empty() => message.clone(),
            Self::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            Self::Busy | Self::Transport(_) | Self::Io { .. } | Self::Config(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}
