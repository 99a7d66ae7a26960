//! トラッキングサーバーAPIの共通インターフェース定義
//!
//! # 責務
//!
//! - トラッキングサーバーの全エンドポイントを1メソッドずつ写し取った
//!   トレイト [`TrackerApi`] を定義
//! - HTTP実装（[`HttpTrackerClient`](super::http::HttpTrackerClient)）と
//!   テスト用モックを同じ型で差し替え可能にする
//!
//! # エンドポイント対応表
//!
//! | メソッド | エンドポイント |
//! |---|---|
//! | [`ready`](TrackerApi::ready) | `GET /api/v0/ready` |
//! | [`projects`](TrackerApi::projects) | `GET /api/v0/projects` |
//! | [`applications`](TrackerApi::applications) | `GET /api/v0/{project_id}/apps` |
//! | [`steps`](TrackerApi::steps) | `GET /api/v0/{project_id}/{app_id}/apps` |
//! | [`chat_create`](TrackerApi::chat_create) | `POST /api/v0/chatbot/{project_id}/{app_id}/create` |
//! | [`chat_response`](TrackerApi::chat_response) | `POST /api/v0/chatbot/{project_id}/{app_id}/response` |
//! | [`chat_history`](TrackerApi::chat_history) | `GET /api/v0/chatbot/{project_id}/{app_id}/history` |
//! | [`ui_page`](TrackerApi::ui_page) | `GET /{rest_of_path}` |
//!
//! # 使用例
//!
//! ```rust,no_run
//! use melted_trail::api::TrackerApi;
//!
//! async fn example(api: Box<dyn TrackerApi>) {
//!     let projects = api.projects().await.unwrap();
//!     for project in &projects {
//!         println!("{} ({} apps)", project.name, project.num_apps);
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{ApplicationSummary, ChatItem, Project, Step};

/// トラッキングサーバーAPIの共通インターフェース
///
/// スペック上の全エンドポイントを1メソッドずつ提供します。
/// 本番では HTTP 実装を、テストではモックを注入してください。
///
/// # 実装要件
///
/// - `Send + Sync`: マルチスレッド環境で安全に使用可能
/// - 非同期実行対応（`async_trait` を使用）
/// - 全エンドポイント共通で、`422` は [`ApiError::Validation`] として返すこと
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// 死活確認（`GET /api/v0/ready`）
    ///
    /// # 戻り値
    ///
    /// - `Ok(bool)`: サーバーが返した準備状態（JSONの真偽値）
    /// - `Err(ApiError)`: 通信失敗またはエラーレスポンス
    async fn ready(&self) -> Result<bool, ApiError>;

    /// 可視プロジェクトの一覧を取得（`GET /api/v0/projects`）
    async fn projects(&self) -> Result<Vec<Project>, ApiError>;

    /// プロジェクト配下のアプリケーション一覧を取得
    /// （`GET /api/v0/{project_id}/apps`）
    ///
    /// # 引数
    ///
    /// - `project_id`: プロジェクトID（エンコード前の生の値を渡すこと。
    ///   パスへの埋め込みは実装側の責務）
    async fn applications(&self, project_id: &str) -> Result<Vec<ApplicationSummary>, ApiError>;

    /// アプリケーションの全ステップログを取得
    /// （`GET /api/v0/{project_id}/{app_id}/apps`）
    ///
    /// 返されるステップの順序はサーバー実装依存です。順序が必要な場合は
    /// `step_sequence_id` でソートしてください。
    async fn steps(&self, project_id: &str, app_id: &str) -> Result<Vec<Step>, ApiError>;

    /// チャットボットアプリケーションを新規作成
    /// （`POST /api/v0/chatbot/{project_id}/{app_id}/create`）
    ///
    /// # 戻り値
    ///
    /// - `Ok(String)`: 作成されたアプリケーションのID（JSON文字列ボディ）
    async fn chat_create(&self, project_id: &str, app_id: &str) -> Result<String, ApiError>;

    /// プロンプトを送信し、生成されたチャットメッセージ群を受け取る
    /// （`POST /api/v0/chatbot/{project_id}/{app_id}/response`）
    ///
    /// プロンプトはリクエストボディではなく `prompt` クエリパラメーターで
    /// 送信されます。パラメーターを欠くと、サーバーは `422` を返します。
    async fn chat_response(
        &self,
        project_id: &str,
        app_id: &str,
        prompt: &str,
    ) -> Result<Vec<ChatItem>, ApiError>;

    /// チャット履歴の全体を取得
    /// （`GET /api/v0/chatbot/{project_id}/{app_id}/history`）
    async fn chat_history(&self, project_id: &str, app_id: &str) -> Result<Vec<ChatItem>, ApiError>;

    /// 同梱のシングルページUIのドキュメントを取得（`GET /{rest_of_path}`）
    ///
    /// # 引数
    ///
    /// - `rest_of_path`: UI内のパス（`"" `でサーバールート）。`/` 区切りは
    ///   そのままパス構造として解釈されます。
    ///
    /// # 戻り値
    ///
    /// - `Ok(String)`: レスポンスボディのテキスト（通常はHTML）
    async fn ui_page(&self, rest_of_path: &str) -> Result<String, ApiError>;
}
