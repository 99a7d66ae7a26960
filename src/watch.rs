//! ステップログのポーリング監視
//!
//! # 責務
//!
//! このモジュールは、実行中のアプリケーションのステップログを定期的に
//! 取得し、新しく現れたステップを順番に通知する [`StepWatcher`] を提供します。
//!
//! # 監視フロー
//!
//! 1. ステップログを取得
//! 2. 前回までに通知していないステップ（シーケンスIDが大きいもの）を
//!    シーケンス順に通知
//! 3. 「ステップが1件以上あり、実行中のステップがなく、規定回数の
//!    ポーリングで新着がない」状態になったら監視を終了
//! 4. それ以外はポーリング間隔だけ待機して 1. へ
//!
//! サーバーは実行の完了を示すイベントを提供しないため、終了判定は
//! ログの形（終了エントリーの有無）と新着の有無から行います。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use melted_trail::api::{create_client, TrackerApi};
//! use melted_trail::config::Connection;
//! use melted_trail::watch::StepWatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection = Connection::new("http://localhost:7241", Duration::from_secs(30))?;
//!     let client: Arc<dyn TrackerApi> = Arc::from(create_client(&connection)?);
//!
//!     let watcher = StepWatcher::new(client, "demo", "run-1")
//!         .with_interval(Duration::from_secs(1))
//!         .with_deadline(Duration::from_secs(300));
//!
//!     let outcome = watcher
//!         .follow(|step| println!("{}: {}", step.step_sequence_id, step.action()))
//!         .await?;
//!
//!     println!("{}回のポーリングで完了", outcome.polls);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::api::TrackerApi;
use crate::error::ApiError;
use crate::model::{Step, StepState};

/// 既定のポーリング間隔
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// 終了判定に必要な「新着なし」ポーリング回数
pub const DEFAULT_SETTLE_POLLS: u32 = 3;

/// ステップログの監視
///
/// 1つのアプリケーション（トレース実行）のステップログをポーリングし、
/// 新しいステップを順番に通知します。
///
/// # フィールド
///
/// - `client`: トラッキングサーバーへのクライアント
/// - `interval`: ポーリング間隔（既定値: 2秒）
/// - `deadline`: 監視全体の期限（省略時は無期限）
/// - `settle_polls`: 終了判定に必要な「新着なし」ポーリング回数（既定値: 3）
pub struct StepWatcher {
    client: Arc<dyn TrackerApi>,
    project_id: String,
    app_id: String,
    interval: Duration,
    deadline: Option<Duration>,
    settle_polls: u32,
}

impl StepWatcher {
    /// 新しい監視を生成
    ///
    /// # 引数
    ///
    /// - `client`: トラッキングサーバーへのクライアント
    /// - `project_id`: プロジェクトID
    /// - `app_id`: アプリケーションID
    pub fn new(client: Arc<dyn TrackerApi>, project_id: &str, app_id: &str) -> Self {
        Self {
            client,
            project_id: project_id.to_string(),
            app_id: app_id.to_string(),
            interval: DEFAULT_INTERVAL,
            deadline: None,
            settle_polls: DEFAULT_SETTLE_POLLS,
        }
    }

    /// ポーリング間隔を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 監視全体の期限を設定
    ///
    /// 期限を超えても実行が完了しない場合、[`WatchError::Deadline`] で
    /// 監視を打ち切ります。
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// 終了判定に必要な「新着なし」ポーリング回数を設定
    ///
    /// 終了エントリーが書き込まれた直後に次のステップが始まるケースを
    /// 取りこぼさないための猶予です。
    pub fn with_settle_polls(mut self, settle_polls: u32) -> Self {
        self.settle_polls = settle_polls;
        self
    }

    /// 監視を開始し、完了まで新しいステップを通知し続ける
    ///
    /// # 引数
    ///
    /// - `on_step`: 新しいステップごとに呼ばれるコールバック。
    ///   シーケンスIDの昇順で、1ステップにつき1回だけ呼ばれます
    ///   （後から終了エントリーが付いても再通知はしません）。
    ///
    /// # 戻り値
    ///
    /// - `Ok(WatchOutcome)`: 実行が落ち着いて監視を終了した場合
    /// - `Err(WatchError::Api)`: ポーリング中のAPI呼び出しが失敗した場合
    /// - `Err(WatchError::Deadline)`: 期限内に完了しなかった場合
    pub async fn follow<F>(&self, mut on_step: F) -> Result<WatchOutcome, WatchError>
    where
        F: FnMut(&Step),
    {
        let started = Instant::now();
        let mut seen: Option<u64> = None;
        let mut quiet_polls = 0u32;
        let mut polls = 0u32;

        loop {
            if let Some(deadline) = self.deadline {
                if started.elapsed() >= deadline {
                    return Err(WatchError::Deadline {
                        elapsed_secs: started.elapsed().as_secs(),
                    });
                }
            }

            let mut current = self.client.steps(&self.project_id, &self.app_id).await?;
            polls += 1;
            current.sort_by_key(|step| step.step_sequence_id);

            let mut new_steps = false;
            for step in &current {
                let unseen = match seen {
                    Some(last) => step.step_sequence_id > last,
                    None => true,
                };
                if unseen {
                    on_step(step);
                    seen = Some(step.step_sequence_id);
                    new_steps = true;
                }
            }

            if new_steps {
                quiet_polls = 0;
            } else {
                quiet_polls += 1;
            }

            let settled = !current.is_empty()
                && current
                    .iter()
                    .all(|step| step.state() != StepState::Running);

            debug!(
                polls,
                quiet_polls,
                settled,
                steps = current.len(),
                "ポーリング完了"
            );

            if settled && quiet_polls >= self.settle_polls {
                return Ok(WatchOutcome {
                    polls,
                    steps: current,
                });
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

/// 監視の結果
#[derive(Debug)]
pub struct WatchOutcome {
    /// 実行したポーリング回数
    pub polls: u32,

    /// 監視終了時点のステップログ（シーケンス順）
    pub steps: Vec<Step>,
}

/// 監視エラー
///
/// # エラー種別
///
/// - [`WatchError::Api`] - ポーリング中のAPI呼び出し失敗
/// - [`WatchError::Deadline`] - 期限内に実行が完了しなかった
#[derive(Debug, Error)]
pub enum WatchError {
    /// ポーリング中のAPI呼び出し失敗
    #[error("監視中のAPI呼び出しに失敗しました: {0}")]
    Api(#[from] ApiError),

    /// 期限内に実行が完了しなかった
    #[error("期限内に実行が完了しませんでした ({elapsed_secs}秒経過)")]
    Deadline {
        /// 監視開始からの経過時間（秒）
        elapsed_secs: u64,
    },
}
