//! トラッキングサーバーのワイヤーモデル（DTO）
//!
//! # 責務
//!
//! - トラッキングサーバーのJSONペイロードをそのまま写し取るレコード型を提供
//! - プロジェクト → アプリケーション → ステップ の階層を型として表現
//! - チャットボットAPIのメッセージ型とバリデーションエラー型を提供
//!
//! これらの型は外部サービスのスキーマの写像であり、デシリアライズされた
//! 状態以上の不変条件やライフサイクルを持ちません。未知のJSONフィールドは
//! 無視されます（サーバー側のスキーマ追加に耐えるため）。
//!
//! # 階層
//!
//! ```text
//! Project（プロジェクト）
//!   └── ApplicationSummary（アプリケーション = 1回のトレース済み実行）
//!         └── Step（ステップ = 実行内の1単位。開始ログ + 終了ログ）
//! ```
//!
//! # モジュール構成
//!
//! - `project` - プロジェクト一覧のレコード
//! - `application` - アプリケーション概要とステップログのレコード
//! - `chat` - チャットボットAPIのメッセージレコード
//! - `validation` - `422` バリデーションエラーのペイロード
//!
//! # 使用例
//!
//! ```rust
//! use melted_trail::model::Step;
//!
//! let json = r#"{
//!     "step_start_log": {
//!         "start_time": "2024-06-01T10:00:00Z",
//!         "action": "generate_answer",
//!         "inputs": {},
//!         "sequence_id": 0
//!     },
//!     "step_end_log": null,
//!     "step_sequence_id": 0
//! }"#;
//!
//! let step: Step = serde_json::from_str(json).unwrap();
//! assert_eq!(step.action(), "generate_answer");
//! ```

pub mod application;
pub mod chat;
pub mod project;
pub mod validation;

// 公開APIの再エクスポート
pub use application::{ApplicationSummary, BeginEntry, EndEntry, Step, StepState};
pub use chat::{ChatItem, ChatItemKind, ChatRole};
pub use project::Project;
pub use validation::{HttpValidationError, LocSegment, ValidationIssue};

/// ISO-8601 日時のシリアライズ/デシリアライズヘルパー
///
/// サーバーはISO-8601形式の日時を返しますが、UTCオフセットの有無は
/// 実装依存です（`2024-06-01T10:00:00Z` と `2024-06-01T10:00:00.123456` の
/// 両方が観測されます）。読み込みは両形式を受け付け、オフセットなしの
/// 日時はUTCとして解釈します。書き込みは常にRFC 3339（UTC）で出力します。
///
/// `#[serde(with = "crate::model::datetime")]` で使用します。
pub(crate) mod datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// ISO-8601 文字列をUTC日時として解釈する
    ///
    /// 1. RFC 3339（オフセット付き）として解釈
    /// 2. 失敗したらオフセットなしの日時として解釈し、UTCとみなす
    pub(crate) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = raw.parse::<NaiveDateTime>() {
            return Ok(naive.and_utc());
        }
        Err(format!("ISO-8601 日時として解釈できません: {raw}"))
    }
}
