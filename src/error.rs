//! エラー型の定義
//!
//! このモジュールは、Melted Trail 全体で使用されるエラー型を定義します。
//!
//! # エラーの分類
//!
//! - [`ConfigError`] - 接続プロファイル（TOML）の読み込み・検証エラー
//! - [`ApiError`] - トラッキングサーバーとのHTTP通信エラー
//!
//! トラッキングサーバーのエラー契約は単純で、HTTPステータスとボディが
//! そのままエラー情報になります。唯一の例外は `422` で、これはリクエストの
//! バリデーション失敗専用に予約されています（[`ApiError::Validation`]）。

use thiserror::Error;

use crate::model::HttpValidationError;

/// 設定関連のエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ファイルの読み込みに失敗
    #[error("設定ファイルの読み込みに失敗しました: {0}")]
    FileRead(#[from] std::io::Error),

    /// TOML のデシリアライズに失敗
    #[error("TOML のデシリアライズに失敗しました: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    /// TOML のシリアライズに失敗
    #[error("TOML のシリアライズに失敗しました: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// バリデーションエラー
    #[error("設定のバリデーションに失敗しました: {0}")]
    Validation(String),
}

/// トラッキングサーバーAPIのエラー
///
/// サーバーはステータスとボディ以上のエラー情報を定義していないため、
/// 非2xxレスポンスは原則 [`ApiError::Status`] に落ちます。
/// `422` のみバリデーションエラーとして構造化され、
/// [`ApiError::Validation`] に分類されます。
///
/// # エラー種別
///
/// - [`ApiError::Transport`] - 接続失敗・タイムアウト等の通信レイヤーのエラー
/// - [`ApiError::Status`] - 非2xxレスポンス（ステータスとボディを保持）
/// - [`ApiError::Validation`] - `422` バリデーションエラー（構造化済み）
/// - [`ApiError::InvalidResponse`] - 2xxだがボディがスキーマに一致しない
/// - [`ApiError::InvalidBaseUrl`] - エンドポイントを構築できないベースURL
#[derive(Debug, Error)]
pub enum ApiError {
    /// 通信レイヤーのエラー（接続失敗・タイムアウト・TLS等）
    #[error("トラッキングサーバーとの通信に失敗しました: {0}")]
    Transport(#[from] reqwest::Error),

    /// 非2xxレスポンス
    #[error("トラッキングサーバーがエラーを返しました (HTTP {status}): {body}")]
    Status {
        /// HTTPステータスコード
        status: u16,
        /// レスポンスボディ（そのまま保持）
        body: String,
    },

    /// リクエストのバリデーション失敗（HTTP 422）
    #[error("リクエストがバリデーションに失敗しました: {0}")]
    Validation(HttpValidationError),

    /// 2xxレスポンスのボディが期待するスキーマに一致しない
    #[error("サーバーレスポンスの解釈に失敗しました: {0}")]
    InvalidResponse(String),

    /// ベースURLからエンドポイントURLを構築できない
    #[error("ベースURLが不正です: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTPステータスコードを返す
    ///
    /// サーバーがステータスを返したエラーの場合のみ `Some` になります。
    /// 通信レイヤーで失敗した場合（接続拒否等）は `None` です。
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Validation(_) => Some(422),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// バリデーションエラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpValidationError, LocSegment, ValidationIssue};

    #[test]
    fn test_config_error_validation_message() {
        let err = ConfigError::Validation("timeout_secs は 1 以上が必要です".to_string());
        assert_eq!(
            err.to_string(),
            "設定のバリデーションに失敗しました: timeout_secs は 1 以上が必要です"
        );
    }

    #[test]
    fn test_api_error_status_message() {
        let err = ApiError::Status {
            status: 500,
            body: "internal server error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "トラッキングサーバーがエラーを返しました (HTTP 500): internal server error"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_api_error_validation_status_is_422() {
        let err = ApiError::Validation(HttpValidationError {
            detail: vec![ValidationIssue {
                loc: vec![
                    LocSegment::Key("query".to_string()),
                    LocSegment::Key("prompt".to_string()),
                ],
                msg: "Field required".to_string(),
                kind: "missing".to_string(),
            }],
        });

        assert_eq!(err.status(), Some(422));
        assert!(err.is_validation());
    }

    #[test]
    fn test_api_error_invalid_base_url_has_no_status() {
        let err = ApiError::InvalidBaseUrl("data:text/plain,x".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_validation());
    }
}
