//! ステータス表示 - エラー/成功メッセージと自動消去

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub posted_at: Instant,
}

/// 表示中のメッセージ（エラーと成功は同時に出ない）
#[derive(Debug, Clone)]
pub struct StatusBoard {
    current: Option<StatusMessage>,
    dismiss_after: Duration,
}

impl StatusBoard {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            current: None,
            dismiss_after,
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.text_of(StatusKind::Error)
    }

    pub fn success(&self) -> Option<&str> {
        self.text_of(StatusKind::Success)
    }

    fn text_of(&self, kind: StatusKind) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|m| m.kind == kind)
            .map(|m| m.text.as_str())
    }

    /// エラーを表示（既存のメッセージとタイマーは置き換え）
    pub fn post_error(&mut self, text: impl Into<String>, now: Instant) {
        self.post(StatusKind::Error, text.into(), now);
    }

    pub fn post_success(&mut self, text: impl Into<String>, now: Instant) {
        self.post(StatusKind::Success, text.into(), now);
    }

    fn post(&mut self, kind: StatusKind, text: String, now: Instant) {
        self.current = Some(StatusMessage {
            kind,
            text,
            posted_at: now,
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// 期限切れのメッセージを消す。消した場合は true
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|m| now.saturating_duration_since(m.posted_at) >= self.dismiss_after);
        if expired {
            self.current = None;
        }
        expired
    }

    /// 自動消去までの残り時間
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.current.as_ref().map(|m| {
            self.dismiss_after
                .saturating_sub(now.saturating_duration_since(m.posted_at))
        })
    }
}
