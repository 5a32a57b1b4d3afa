//! 設定 - 環境変数（.env 対応）から読み込む

use crate::error::{Result, SplitoraError};
use std::path::PathBuf;
use std::time::Duration;

/// 処理サーバーのエンドポイント（既定値）
pub const DEFAULT_ENDPOINT: &str = "https://splitorabe.onrender.com/api/process";

/// メッセージの自動消去までの秒数（既定値）
pub const DEFAULT_DISMISS_SECS: u64 = 5;

pub const ENV_ENDPOINT: &str = "SPLITORA_ENDPOINT";
pub const ENV_DISMISS_SECS: &str = "SPLITORA_DISMISS_SECS";
pub const ENV_DOWNLOAD_DIR: &str = "SPLITORA_DOWNLOAD_DIR";

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// POST先URL
    pub endpoint: String,
    /// エラー/成功メッセージを自動で消すまでの時間
    pub dismiss_after: Duration,
    /// 結果ZIPの保存先
    pub download_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            dismiss_after: Duration::from_secs(DEFAULT_DISMISS_SECS),
            download_dir: default_download_dir(),
        }
    }
}

impl AppConfig {
    /// プロセス環境変数から設定を作成
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を作成（未設定の項目は既定値）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = non_empty(lookup(ENV_ENDPOINT)) {
            config.endpoint = parse_endpoint(&endpoint)?;
        }

        if let Some(secs) = non_empty(lookup(ENV_DISMISS_SECS)) {
            let secs: u64 = secs.parse().map_err(|_| {
                SplitoraError::Config(format!("{ENV_DISMISS_SECS} は正の整数で指定してください: {secs:?}"))
            })?;
            if secs == 0 {
                return Err(SplitoraError::Config(format!(
                    "{ENV_DISMISS_SECS} は 1 以上で指定してください"
                )));
            }
            config.dismiss_after = Duration::from_secs(secs);
        }

        if let Some(dir) = non_empty(lookup(ENV_DOWNLOAD_DIR)) {
            config.download_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_endpoint(raw: &str) -> Result<String> {
    let url = reqwest::Url::parse(raw)
        .map_err(|e| SplitoraError::Config(format!("{ENV_ENDPOINT} が不正です ({raw}): {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(SplitoraError::Config(format!(
            "{ENV_ENDPOINT} は http/https のみ対応です: {other}"
        ))),
    }
}

/// ダウンロードフォルダ（取得できなければカレントディレクトリ）
fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
