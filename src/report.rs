//! アプリケーション実行のサマリーレポート
//!
//! # 責務
//!
//! - ステップログの集計結果 [`ApplicationReport`] の型定義
//! - 状態別カウント・アクション別カウント・所要時間の算出
//!
//! # 主要な型
//!
//! - [`ApplicationReport`][]: 1つのアプリケーション（トレース実行）の
//!   ステップログ全体を集計したサマリー
//!
//! # 使用例
//!
//! ```rust,no_run
//! use melted_trail::model::Step;
//! use melted_trail::report::ApplicationReport;
//!
//! fn summarize(steps: &[Step]) {
//!     let report = ApplicationReport::from_steps("demo", "run-1", steps);
//!
//!     println!("ステップ数: {}", report.total_steps);
//!     println!("完了: {} / 失敗: {} / 実行中: {}", report.completed, report.failed, report.running);
//!
//!     if let Ok(json) = report.to_json() {
//!         println!("{}", json);
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Step, StepState};

/// アプリケーション実行のサマリーレポート
///
/// ステップログ全体から状態別・アクション別の集計と所要時間を算出した
/// 結果を表す型です。[`ApplicationReport::from_steps`] で構築します。
///
/// # 例
///
/// ```rust,no_run
/// use melted_trail::report::ApplicationReport;
///
/// fn analyze(report: &ApplicationReport) {
///     if report.has_failures() {
///         println!("{}件のステップが失敗しています", report.failed);
///     }
///
///     for (action, count) in &report.action_counts {
///         println!("  {action}: {count}回");
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationReport {
    /// プロジェクトID
    pub project_id: String,

    /// アプリケーションID
    pub app_id: String,

    /// 総ステップ数
    pub total_steps: usize,

    /// 完了したステップ数
    pub completed: usize,

    /// 例外で終了したステップ数
    pub failed: usize,

    /// 終了エントリーのないステップ数（実行中）
    pub running: usize,

    /// アクション名ごとの実行回数（名前順）
    pub action_counts: BTreeMap<String, u64>,

    /// 最初のステップの開始時刻
    pub first_started: Option<DateTime<Utc>>,

    /// 最後に終了したステップの終了時刻
    pub last_finished: Option<DateTime<Utc>>,

    /// 終了済みステップの所要時間の合計
    ///
    /// 時計の巻き戻り等で所要時間を算出できないステップは合計に
    /// 含まれません。1件も算出できない場合は `None` です。
    pub total_duration: Option<Duration>,
}

impl ApplicationReport {
    /// ステップログからレポートを構築する
    ///
    /// # 引数
    ///
    /// - `project_id`: プロジェクトID
    /// - `app_id`: アプリケーションID
    /// - `steps`: サーバーから取得したステップログ
    pub fn from_steps(project_id: &str, app_id: &str, steps: &[Step]) -> Self {
        let mut completed = 0;
        let mut failed = 0;
        let mut running = 0;
        let mut action_counts: BTreeMap<String, u64> = BTreeMap::new();

        let mut total = Duration::ZERO;
        let mut measured = false;

        for step in steps {
            match step.state() {
                StepState::Completed => completed += 1,
                StepState::Failed => failed += 1,
                StepState::Running => running += 1,
            }

            *action_counts.entry(step.action().to_string()).or_insert(0) += 1;

            if let Some(duration) = step.duration() {
                total += duration;
                measured = true;
            }
        }

        let first_started = steps.iter().map(|s| s.step_start_log.start_time).min();
        let last_finished = steps
            .iter()
            .filter_map(|s| s.step_end_log.as_ref().map(|e| e.end_time))
            .max();

        Self {
            project_id: project_id.to_string(),
            app_id: app_id.to_string(),
            total_steps: steps.len(),
            completed,
            failed,
            running,
            action_counts,
            first_started,
            last_finished,
            total_duration: if measured { Some(total) } else { None },
        }
    }

    /// 実行が落ち着いているかどうか
    ///
    /// # 戻り値
    ///
    /// - `true`: ステップが1件以上あり、実行中のステップがない
    /// - `false`: ステップが空、または実行中のステップがある
    pub fn is_settled(&self) -> bool {
        self.total_steps > 0 && self.running == 0
    }

    /// 失敗したステップがあるかどうか
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// レポートをJSON形式でシリアライズ
    ///
    /// # 戻り値
    ///
    /// - `Ok(String)`: JSON文字列
    /// - `Err(serde_json::Error)`: シリアライズ失敗
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
