//! トラッキングサーバーのHTTPクライアント実装
//!
//! # 責務
//!
//! - [`TrackerApi`] トレイトの reqwest ベース実装 [`HttpTrackerClient`] を提供
//! - ベースURLとセグメント列からのエンドポイントURL構築
//!   （セグメント単位のパーセントエンコード）
//! - レスポンスの共通処理: 2xx はJSONデコード、非2xxはステータスとボディを
//!   そのままエラー化、`422` のみバリデーションエラーとして構造化
//!
//! # エラー契約
//!
//! サーバーのエラー契約は「ステータス + ボディ」のみです（リトライや
//! 部分失敗のセマンティクスは定義されていません）。このクライアントも
//! リトライせず、1回のリクエストの結果をそのまま返します。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use melted_trail::api::http::HttpTrackerClient;
//! use melted_trail::api::TrackerApi;
//! use melted_trail::config::Connection;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Connection::new("http://localhost:7241", Duration::from_secs(30))?;
//!     let client = HttpTrackerClient::new(&connection)?;
//!
//!     if client.ready().await? {
//!         for project in client.projects().await? {
//!             println!("{}", project.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::routes;
use super::traits::TrackerApi;
use crate::config::Connection;
use crate::error::ApiError;
use crate::model::{ApplicationSummary, ChatItem, HttpValidationError, Project, Step};

/// バリデーションエラーに予約されたステータスコード
const VALIDATION_STATUS: u16 = 422;

/// トラッキングサーバーのHTTPクライアント
///
/// 接続設定（[`Connection`]）からベースURLとタイムアウトを受け取り、
/// 全エンドポイントをタイプセーフに呼び出します。
pub struct HttpTrackerClient {
    /// 内部のreqwestクライアント（タイムアウト設定済み）
    client: Client,

    /// エンドポイント構築の起点となるベースURL
    base_url: Url,
}

impl HttpTrackerClient {
    /// 新しいクライアントを生成
    ///
    /// 接続設定のタイムアウトはリクエスト全体（接続 + 読み込み）に
    /// 適用されます。
    ///
    /// # 引数
    ///
    /// - `connection`: バリデーション済みの接続設定
    ///
    /// # エラー
    ///
    /// - [`ApiError::Transport`] - 内部クライアントの構築に失敗
    pub fn new(connection: &Connection) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(connection.timeout()).build()?;

        Ok(Self {
            client,
            base_url: connection.base_url().clone(),
        })
    }

    /// セグメント列からエンドポイントURLを構築
    ///
    /// 各セグメントはパーセントエンコードされるため、`/` や `%` を含むIDも
    /// パス構造を壊しません。ベースURLにパスプレフィックス
    /// （例: `http://host/trail/`）がある場合は保持されます。
    ///
    /// # エラー
    ///
    /// - [`ApiError::InvalidBaseUrl`] - ベースURLがパスセグメントを持てない
    ///   形式の場合（接続設定のバリデーションを通っていれば発生しません）
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// GETリクエストを送信し、JSONボディをデコード
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET リクエストを送信します");

        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl TrackerApi for HttpTrackerClient {
    async fn ready(&self) -> Result<bool, ApiError> {
        self.get_json(&routes::ready()).await
    }

    async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json(&routes::projects()).await
    }

    async fn applications(&self, project_id: &str) -> Result<Vec<ApplicationSummary>, ApiError> {
        self.get_json(&routes::applications(project_id)).await
    }

    async fn steps(&self, project_id: &str, app_id: &str) -> Result<Vec<Step>, ApiError> {
        self.get_json(&routes::steps(project_id, app_id)).await
    }

    async fn chat_create(&self, project_id: &str, app_id: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&routes::chat_create(project_id, app_id))?;
        debug!(url = %url, "POST リクエストを送信します");

        let response = self.client.post(url).send().await?;
        decode(response).await
    }

    async fn chat_response(
        &self,
        project_id: &str,
        app_id: &str,
        prompt: &str,
    ) -> Result<Vec<ChatItem>, ApiError> {
        let url = self.endpoint(&routes::chat_response(project_id, app_id))?;
        debug!(url = %url, prompt_chars = prompt.chars().count(), "プロンプトを送信します");

        // プロンプトはボディではなくクエリパラメーターで送る（サーバー契約）
        let response = self
            .client
            .post(url)
            .query(&[("prompt", prompt)])
            .send()
            .await?;
        decode(response).await
    }

    async fn chat_history(&self, project_id: &str, app_id: &str) -> Result<Vec<ChatItem>, ApiError> {
        self.get_json(&routes::chat_history(project_id, app_id)).await
    }

    async fn ui_page(&self, rest_of_path: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&routes::ui(rest_of_path))?;
        debug!(url = %url, "UIドキュメントを取得します");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "エラーレスポンスを受信しました");
            return Err(classify_status(status.as_u16(), body));
        }
        Ok(body)
    }
}

/// レスポンスを共通処理してJSONデコード
///
/// # 処理フロー
///
/// 1. 非2xx → ボディを読み、[`classify_status`] でエラー化
/// 2. 2xx → JSONデコード。失敗時は [`ApiError::InvalidResponse`]
///    （ボディを添えて返す）
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "エラーレスポンスを受信しました");
        return Err(classify_status(status.as_u16(), body));
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
        ApiError::InvalidResponse(format!(
            "JSONのデコードに失敗しました: {e}. ボディ: {body}"
        ))
    })
}

/// 非2xxレスポンスをエラーに分類
///
/// `422` のみ [`HttpValidationError`] としての構造化を試み、成功したら
/// [`ApiError::Validation`] を返します。それ以外（および構造化に失敗した
/// `422`）はステータスとボディをそのまま保持する [`ApiError::Status`] です。
fn classify_status(status: u16, body: String) -> ApiError {
    if status == VALIDATION_STATUS {
        if let Ok(validation) = serde_json::from_str::<HttpValidationError>(&body) {
            return ApiError::Validation(validation);
        }
    }
    ApiError::Status { status, body }
}
