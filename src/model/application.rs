//! アプリケーションとステップログのレコード定義
//!
//! # 責務
//!
//! - アプリケーション一覧（`GET /api/v0/{project_id}/apps`）の要素
//!   [`ApplicationSummary`] を提供
//! - ステップログ（`GET /api/v0/{project_id}/{app_id}/apps`）の要素 [`Step`] と、
//!   その開始/終了エントリー [`BeginEntry`] / [`EndEntry`] を提供
//! - 開始/終了エントリーの組から導出されるステップ状態 [`StepState`] を提供
//!
//! # ステップのライフサイクル
//!
//! サーバーはステップ開始時に `step_start_log` を記録し、完了時に
//! `step_end_log` を追記します。したがって:
//!
//! - 終了ログなし → 実行中（[`StepState::Running`]）
//! - 終了ログに `exception` あり → 失敗（[`StepState::Failed`]）
//! - それ以外 → 完了（[`StepState::Completed`]）
//!
//! # 使用例
//!
//! ```rust
//! use melted_trail::model::{Step, StepState};
//!
//! let json = r#"{
//!     "step_start_log": {
//!         "start_time": "2024-06-01T10:00:00Z",
//!         "action": "fetch_context",
//!         "inputs": {"query": "hello"},
//!         "sequence_id": 2
//!     },
//!     "step_end_log": {
//!         "end_time": "2024-06-01T10:00:03Z",
//!         "action": "fetch_context",
//!         "result": {"documents": 4},
//!         "exception": null,
//!         "state": {"chat_history": []},
//!         "sequence_id": 2
//!     },
//!     "step_sequence_id": 2
//! }"#;
//!
//! let step: Step = serde_json::from_str(json).unwrap();
//! assert_eq!(step.state(), StepState::Completed);
//! assert_eq!(step.duration().unwrap().as_secs(), 3);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// アプリケーション概要
///
/// 1回のトレース済み実行を表します。ステップの中身は含まず、
/// 一覧表示に必要なメタデータのみを持ちます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSummary {
    /// アプリケーションID（APIのパスパラメーターとして使用）
    pub app_id: String,

    /// 最初の書き込み日時（実行開始）
    #[serde(with = "crate::model::datetime")]
    pub first_written: DateTime<Utc>,

    /// 最後の書き込み日時
    #[serde(with = "crate::model::datetime")]
    pub last_written: DateTime<Utc>,

    /// 記録済みステップ数
    pub num_steps: u64,

    /// アプリケーションに付与されたタグ
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// ステップ
///
/// アプリケーション実行内の1単位。開始ログと（完了していれば）終了ログの
/// 組で構成されます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// 開始エントリー（必ず存在する）
    pub step_start_log: BeginEntry,

    /// 終了エントリー（実行中のステップでは `null`）
    pub step_end_log: Option<EndEntry>,

    /// ステップの連番（0始まり、アプリケーション内で単調増加）
    pub step_sequence_id: u64,
}

impl Step {
    /// ステップが実行したアクション名
    pub fn action(&self) -> &str {
        &self.step_start_log.action
    }

    /// 開始/終了エントリーから導出されるステップ状態
    ///
    /// # 判定
    ///
    /// 1. 終了ログがない → [`StepState::Running`]
    /// 2. 終了ログの `exception` が `Some` → [`StepState::Failed`]
    /// 3. それ以外 → [`StepState::Completed`]
    ///
    /// 失敗したステップにも `result` が入っていることがありますが、
    /// `exception` の有無が優先されます。
    pub fn state(&self) -> StepState {
        match &self.step_end_log {
            None => StepState::Running,
            Some(end) if end.exception.is_some() => StepState::Failed,
            Some(_) => StepState::Completed,
        }
    }

    /// ステップの実行時間
    ///
    /// 終了ログが存在し、かつ `end_time - start_time` が負でない場合のみ
    /// `Some` を返します。サーバーと時計のずれで負になった場合は `None`
    /// です（パニックしません）。
    pub fn duration(&self) -> Option<Duration> {
        let end = self.step_end_log.as_ref()?;
        (end.end_time - self.step_start_log.start_time)
            .to_std()
            .ok()
    }
}

/// ステップ開始エントリー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeginEntry {
    /// ステップ開始日時
    #[serde(with = "crate::model::datetime")]
    pub start_time: DateTime<Utc>,

    /// 実行するアクション名
    pub action: String,

    /// アクションへの入力
    #[serde(default)]
    pub inputs: Map<String, Value>,

    /// エントリーの連番
    pub sequence_id: u64,
}

/// ステップ終了エントリー
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndEntry {
    /// ステップ終了日時
    #[serde(with = "crate::model::datetime")]
    pub end_time: DateTime<Utc>,

    /// 実行したアクション名
    pub action: String,

    /// アクションの結果（失敗時は `null` のことがある）
    #[serde(default)]
    pub result: Option<Map<String, Value>>,

    /// 例外メッセージ（成功時は `null`）
    #[serde(default)]
    pub exception: Option<String>,

    /// ステップ完了後のアプリケーション状態
    #[serde(default)]
    pub state: Map<String, Value>,

    /// エントリーの連番
    pub sequence_id: u64,
}

/// ステップ状態
///
/// ワイヤー上には存在せず、[`Step`] の開始/終了エントリーから導出されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// 終了ログがまだない（実行中）
    Running,

    /// 正常に完了した
    Completed,

    /// 例外で終了した
    Failed,
}

impl StepState {
    /// 表示用のラベル
    pub fn label(&self) -> &'static str {
        match self {
            StepState::Running => "running",
            StepState::Completed => "completed",
            StepState::Failed => "failed",
        }
    }
}
