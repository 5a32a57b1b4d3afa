//! Splitora - メインエントリポイント

use anyhow::{Context, Result};
use splitora::AppConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // 環境変数の読み込み
    dotenvy::dotenv().ok();

    // ロギング初期化
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("設定の読み込みに失敗")?;
    tracing::info!("エンドポイント: {}", config.endpoint);

    // GUIアプリケーション起動
    splitora::gui::run(config)
}
