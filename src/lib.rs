//! melted-trail - LLMアプリケーションのトラッキングサーバーを操作するクライアント
//!
//! # 責務
//!
//! - トラッキングサーバーのREST APIに対する型付きクライアント（[`api`]）
//! - プロジェクト・アプリケーション・ステップ・チャットのデータモデル（[`model`]）
//! - 接続プロファイルの読み込みと検証（[`config`]）
//! - ステップログの集計レポート（[`report`]）と完了までの監視（[`watch`]）
//! - 上記を束ねるCLI（[`cli`]）
//!
//! # 使用例
//!
//! ```no_run
//! use melted_trail::api::{create_client, TrackerApi};
//! use melted_trail::config::Profile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = Profile::default_profile()?;
//! let client = create_client(profile.connection())?;
//!
//! for project in client.projects().await? {
//!     println!("{}: {}件", project.name, project.num_apps);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 設計思想
//!
//! サーバーとの通信は [`api::TrackerApi`] トレイトの背後に隠蔽し、
//! 集計・監視・CLIはトレイト経由でのみサーバーに触れる。
//! テストではモック実装を差し込むことで、HTTPなしで全ロジックを検証できる。

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod telemetry;
pub mod watch;

// 公開APIの再エクスポート
pub use api::{create_client, HttpTrackerClient, TrackerApi};
pub use config::{Connection, Profile};
pub use error::{ApiError, ConfigError};
pub use model::{ApplicationSummary, ChatItem, Project, Step, StepState};
pub use report::ApplicationReport;
pub use watch::{StepWatcher, WatchOutcome};
