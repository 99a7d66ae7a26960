//! TOML デシリアライズ用の DTO (Data Transfer Object)
//!
//! # 責務
//!
//! このモジュールは、接続プロファイル（TOML ファイル）からのデータ読み込み
//! 専用の構造体を提供します。DTO はバリデーション前の「生データ」を表現し、
//! ドメインモデルとは分離されています。
//!
//! ## 設計思想
//!
//! - **単一責務**: TOML のデシリアライズのみを担当
//! - **TOML 構造への密結合**: TOML の構造変更に柔軟に対応
//! - **バリデーション前の状態**: 不正なデータも一旦受け入れる
//! - **カプセル化**: config モジュール内部のみで使用（外部非公開）
//!
//! ## 変換フロー
//!
//! ```text
//! TOML ファイル
//!   ↓ (デシリアライズ)
//! ProfileDto
//!   ↓ (TryFrom でバリデーション)
//! Profile (ドメインモデル)
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::profile::LogLevel;

/// 接続プロファイル DTO
///
/// TOML の `[server]` セクションと `[log]` セクションを
/// デシリアライズ/シリアライズします。どちらも省略可能で、
/// 省略されたフィールドには変換時に既定値が補われます。
///
/// **注**: この構造体は config モジュール内部の実装詳細です。
/// 外部からは [`Profile`](super::profile::Profile) を使用してください。
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ProfileDto {
    /// トラッキングサーバーへの接続設定
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) server: Option<ServerDto>,

    /// ログ出力の設定
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) log: Option<LogDto>,
}

/// `[server]` セクション DTO
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ServerDto {
    /// ベースURL（例: `http://localhost:7241`）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) base_url: Option<String>,

    /// リクエストタイムアウト（秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) timeout_secs: Option<u64>,
}

/// `[log]` セクション DTO
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct LogDto {
    /// ログレベル（error/warn/info/debug/trace）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) level: Option<LogLevel>,

    /// ログの出力先ファイル（省略時は標準エラー出力）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) file: Option<PathBuf>,

    /// JSON Lines 形式で出力するかどうか
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) json: Option<bool>,
}
