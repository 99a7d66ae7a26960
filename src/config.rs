//! 接続プロファイルの管理
//!
//! # 責務
//!
//! - TOML プロファイルの読み込み・保存（[`profile`]）
//! - デシリアライズ専用 DTO の管理（[`dto`]、モジュール内部限定）
//!
//! # 設計方針
//!
//! TOML の構造（DTO）とバリデーション済みのドメインモデルを分離します。
//! 外部には [`Profile`] / [`Connection`] / [`LogSettings`] のみを公開し、
//! 不正な設定値がドメインモデルに入らないことを保証します。

mod dto;
pub mod profile;

// 公開APIの再エクスポート
pub use profile::{
    Connection, LogLevel, LogSettings, Profile, DEFAULT_BASE_URL, DEFAULT_PROFILE_FILE,
    DEFAULT_TIMEOUT_SECS,
};
