//! トラッキングサーバーAPIへのアクセス層
//!
//! # 責務
//!
//! - エンドポイント呼び出しの抽象インターフェース（[`TrackerApi`]）の定義
//! - HTTP実装（[`http::HttpTrackerClient`]）の提供
//! - エンドポイントパスの一元管理（[`routes`]）
//!
//! # 設計方針
//!
//! 上位レイヤー（CLI、監視、レポート）はトレイト [`TrackerApi`] にのみ
//! 依存します。テストではモック実装を差し込み、実行時は
//! [`create_client`] が生成するHTTP実装を使います。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use melted_trail::api::create_client;
//! use melted_trail::config::Connection;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Connection::new("http://localhost:7241", Duration::from_secs(30))?;
//!     let client = create_client(&connection)?;
//!
//!     let projects = client.projects().await?;
//!     println!("{}件のプロジェクト", projects.len());
//!     Ok(())
//! }
//! ```

pub mod http;
pub mod routes;
pub mod traits;

// 公開APIの再エクスポート
pub use http::HttpTrackerClient;
pub use traits::TrackerApi;

use crate::config::Connection;
use crate::error::ApiError;

/// 接続設定からAPIクライアントを生成するファクトリ関数
///
/// # 引数
///
/// - `connection`: バリデーション済みの接続設定
///
/// # 戻り値
///
/// トレイトオブジェクトとしてボックス化されたクライアント
///
/// # エラー
///
/// - [`ApiError::Transport`] - 内部クライアントの構築に失敗した場合
pub fn create_client(connection: &Connection) -> Result<Box<dyn TrackerApi>, ApiError> {
    let client = HttpTrackerClient::new(connection)?;
    Ok(Box::new(client))
}
