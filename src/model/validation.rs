//! バリデーションエラー（HTTP 422）のペイロード定義
//!
//! # 責務
//!
//! トラッキングサーバーが `422` で返すバリデーションエラーのボディを
//! 写し取る型を提供する。全エンドポイントがこの形式を共有します。
//!
//! # ワイヤー形式
//!
//! ```json
//! {
//!   "detail": [
//!     {"loc": ["query", "prompt"], "msg": "Field required", "type": "missing"}
//!   ]
//! }
//! ```
//!
//! `loc` はリクエスト内の位置をルート（`query` / `path` / `body`）から
//! たどるパスで、配列要素を指す場合は整数が混ざります
//! （例: `["body", 0, "name"]`）。

use std::fmt;

use serde::{Deserialize, Serialize};

/// `422` レスポンスのボディ全体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpValidationError {
    /// 個々のバリデーション違反
    #[serde(default)]
    pub detail: Vec<ValidationIssue>,
}

impl HttpValidationError {
    /// 違反の件数
    pub fn len(&self) -> usize {
        self.detail.len()
    }

    /// 違反が1件もないかどうか
    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }
}

/// エラーメッセージは「件数 + 先頭の違反」を1行に要約します。
/// 全違反の列挙は表示側（CLI）の責務です。
impl fmt::Display for HttpValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail.first() {
            Some(first) => write!(
                f,
                "{}件のバリデーション違反 (先頭: {} - {})",
                self.detail.len(),
                first.location(),
                first.msg
            ),
            None => write!(f, "バリデーション違反 (詳細なし)"),
        }
    }
}

/// 個々のバリデーション違反
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// リクエスト内の位置（ルートからのパス）
    #[serde(default)]
    pub loc: Vec<LocSegment>,

    /// 人間向けメッセージ
    pub msg: String,

    /// 違反の種別コード（例: `missing`, `string_type`）
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    /// `loc` をドット区切りの文字列に整形する
    ///
    /// # 例
    ///
    /// ```rust
    /// use melted_trail::model::{LocSegment, ValidationIssue};
    ///
    /// let issue = ValidationIssue {
    ///     loc: vec![
    ///         LocSegment::Key("body".to_string()),
    ///         LocSegment::Index(0),
    ///         LocSegment::Key("name".to_string()),
    ///     ],
    ///     msg: "Field required".to_string(),
    ///     kind: "missing".to_string(),
    /// };
    /// assert_eq!(issue.location(), "body.0.name");
    /// ```
    pub fn location(&self) -> String {
        if self.loc.is_empty() {
            return "(不明)".to_string();
        }
        self.loc
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// `loc` パスの1要素
///
/// フィールド名（文字列）か配列インデックス（整数）のどちらかです。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    /// フィールド名
    Key(String),
    /// 配列インデックス
    Index(u64),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Key(key) => write!(f, "{key}"),
            LocSegment::Index(index) => write!(f, "{index}"),
        }
    }
}
