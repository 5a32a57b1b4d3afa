//! 処理サーバーとの通信

mod client;

pub use client::{ProcessClient, ProcessRequest};
