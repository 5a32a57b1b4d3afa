//! 処理サーバー クライアント

use crate::error::{Result, SplitoraError, SERVER_ERROR_MESSAGE};
use crate::form::{Mode, SelectedFile};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// 1回分の送信内容
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub mode: Mode,
    pub pdf: SelectedFile,
    pub excel: Option<SelectedFile>,
}

/// 処理サーバーのクライアント
pub struct ProcessClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl ProcessClient {
    /// 新しいクライアントを作成
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// PDF（とExcel）を送信し、結果のZIPを受け取る
    pub async fn process(&self, request: &ProcessRequest) -> Result<Vec<u8>> {
        let form = build_form(request)?;

        info!(
            "送信: mode={} pdf={} ({} bytes) -> {}",
            request.mode,
            request.pdf.name,
            request.pdf.len(),
            self.endpoint
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = error_message_from_body(&body);
            warn!("サーバーエラー: {} {}", status, message);
            return Err(SplitoraError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        debug!("受信: {} bytes", body.len());
        Ok(body.to_vec())
    }
}

/// multipart フォームを組み立てる（excel は rename の時だけ）
fn build_form(request: &ProcessRequest) -> Result<Form> {
    let mut form = Form::new()
        .text("mode", request.mode.as_str())
        .part("pdf", file_part(&request.pdf)?);

    if request.mode == Mode::Rename {
        if let Some(ref excel) = request.excel {
            form = form.part("excel", file_part(excel)?);
        }
    }

    Ok(form)
}

fn file_part(file: &SelectedFile) -> Result<Part> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.media_type)?;
    Ok(part)
}

/// エラーレスポンス `{ "error": "..." }`
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// エラーレスポンスからメッセージを取り出す（取れなければ "Server error"）
fn error_message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string())
}
