//! チャットボットAPIのメッセージレコード定義
//!
//! # 責務
//!
//! デモチャットボットAPI（`/api/v0/chatbot/...`）が送受信するメッセージ型
//! [`ChatItem`] と、その属性enum（[`ChatRole`] / [`ChatItemKind`]）を提供する。
//!
//! # ワイヤー形式
//!
//! ```json
//! {"role": "assistant", "content": "こんにちは！", "type": "text"}
//! ```
//!
//! `type` はRustの予約語のためフィールド名は `kind` とし、serdeのrenameで
//! ワイヤー名に合わせています。

use serde::{Deserialize, Serialize};

/// チャットの1メッセージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatItem {
    /// 発話者
    pub role: ChatRole,

    /// メッセージ本文（`kind` が `image` の場合はURL）
    pub content: String,

    /// メッセージの種別
    #[serde(rename = "type")]
    pub kind: ChatItemKind,
}

/// チャットの発話者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// 利用者
    User,
    /// チャットボット
    Assistant,
}

/// チャットメッセージの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatItemKind {
    /// 通常のテキスト
    Text,
    /// 生成画像（content はURL）
    Image,
    /// コードブロック
    Code,
    /// サーバー側で発生したエラーの通知
    Error,
}
