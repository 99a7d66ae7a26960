//! コマンドラインインターフェース
//!
//! # 責務
//!
//! - コマンドライン引数の定義とパース（[`Cli`] / [`Commands`]）
//! - プロファイル解決・ログ初期化・クライアント生成を経た各コマンドの実行
//! - 人間向け出力と `--json` 出力の切り替え
//!
//! # コマンド一覧
//!
//! | コマンド | 操作 |
//! |----------|------|
//! | `ready` | サーバーの稼働確認 |
//! | `projects` | プロジェクト一覧 |
//! | `apps <PROJECT_ID>` | アプリケーション一覧 |
//! | `steps <PROJECT_ID> <APP_ID> [--report]` | ステップログ / 集計レポート |
//! | `watch <PROJECT_ID> <APP_ID>` | 実行を完了まで監視 |
//! | `chat create <PROJECT_ID> <APP_ID>` | チャットアプリケーションの作成 |
//! | `chat send <PROJECT_ID> <APP_ID> <PROMPT>` | プロンプトの送信 |
//! | `chat history <PROJECT_ID> <APP_ID>` | 会話履歴の表示 |
//! | `ui [PATH]` | UIドキュメントの取得 |
//! | `init [--force]` | 接続プロファイルの雛形生成 |
//!
//! # 使用例
//!
//! ```text
//! $ melted-trail projects
//! $ melted-trail --base-url http://10.0.0.5:7241 steps demo run-1 --report
//! $ melted-trail chat send demo chat-1 "こんにちは"
//! $ melted-trail watch demo run-1 --interval-secs 1 --deadline-secs 300
//! ```

pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use crate::api::{create_client, TrackerApi};
use crate::config::{Profile, DEFAULT_PROFILE_FILE};
use crate::error::{ApiError, ConfigError};
use crate::report::ApplicationReport;
use crate::telemetry::{self, TelemetryError};
use crate::watch::{StepWatcher, WatchError};

/// トラッキングサーバーを操作するCLI
#[derive(Parser, Debug)]
#[command(name = "melted-trail")]
#[command(about = "LLMアプリケーションのトラッキングサーバーを操作するコマンドラインツール")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 接続プロファイル（TOML）のパス
    #[arg(short, long, global = true, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// ベースURLを上書きする
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// 出力をJSON形式にする
    #[arg(long, global = true)]
    pub json: bool,

    /// 詳細ログを有効にする
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// サブコマンド
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// サーバーの稼働状態を確認
    Ready,

    /// プロジェクトの一覧を表示
    Projects,

    /// プロジェクト内のアプリケーション一覧を表示
    Apps {
        /// プロジェクトID
        #[arg(value_name = "PROJECT_ID")]
        project_id: String,
    },

    /// アプリケーションのステップログを表示
    Steps {
        /// プロジェクトID
        #[arg(value_name = "PROJECT_ID")]
        project_id: String,

        /// アプリケーションID
        #[arg(value_name = "APP_ID")]
        app_id: String,

        /// ステップログの代わりに集計レポートを表示
        #[arg(long)]
        report: bool,
    },

    /// 実行中のアプリケーションを完了まで監視
    Watch {
        /// プロジェクトID
        #[arg(value_name = "PROJECT_ID")]
        project_id: String,

        /// アプリケーションID
        #[arg(value_name = "APP_ID")]
        app_id: String,

        /// ポーリング間隔（秒）
        #[arg(
            long,
            value_name = "SECS",
            default_value_t = 2,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval_secs: u64,

        /// 監視の期限（秒、省略時は無期限）
        #[arg(long, value_name = "SECS")]
        deadline_secs: Option<u64>,
    },

    /// チャットボットアプリケーションの操作
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// UIドキュメントを取得して表示
    Ui {
        /// 取得するパス（省略時はルート）
        #[arg(value_name = "PATH", default_value = "")]
        path: String,
    },

    /// 接続プロファイルの雛形を生成
    Init {
        /// 既存ファイルを上書きする
        #[arg(long)]
        force: bool,
    },
}

/// チャットボット関連のサブコマンド
#[derive(Subcommand, Debug, Clone)]
pub enum ChatCommands {
    /// チャットアプリケーションを作成
    Create {
        /// プロジェクトID
        #[arg(value_name = "PROJECT_ID")]
        project_id: String,

        /// アプリケーションID
        #[arg(value_name = "APP_ID")]
        app_id: String,
    },

    /// プロンプトを送信して応答を表示
    Send {
        /// プロジェクトID
        #[arg(value_name = "PROJECT_ID")]
        project_id: String,

        /// アプリケーションID
        #[arg(value_name = "APP_ID")]
        app_id: String,

        /// 送信するプロンプト
        #[arg(value_name = "PROMPT")]
        prompt: String,
    },

    /// 会話履歴を表示
    History {
        /// プロジェクトID
        #[arg(value_name = "PROJECT_ID")]
        project_id: String,

        /// アプリケーションID
        #[arg(value_name = "APP_ID")]
        app_id: String,
    },
}

/// CLI 実行時のエラー
///
/// # エラー種別
///
/// - [`CliError::Config`] - プロファイルの読み込み・検証エラー
/// - [`CliError::Api`] - トラッキングサーバーとの通信エラー
/// - [`CliError::Watch`] - 監視の失敗（期限超過を含む）
/// - [`CliError::Telemetry`] - ログ出力の初期化失敗
/// - [`CliError::Json`] - `--json` 出力のシリアライズ失敗
/// - [`CliError::ProfileExists`] - `init` の書き込み先が既に存在する
/// - [`CliError::NotReady`] - `ready` がサーバーの準備未完了を検出した
#[derive(Debug, Error)]
pub enum CliError {
    /// プロファイルの読み込み・検証エラー
    #[error("設定エラー: {0}")]
    Config(#[from] ConfigError),

    /// トラッキングサーバーとの通信エラー
    #[error("APIエラー: {0}")]
    Api(#[from] ApiError),

    /// 監視の失敗
    #[error("監視エラー: {0}")]
    Watch(#[from] WatchError),

    /// ログ出力の初期化失敗
    #[error("ログ初期化エラー: {0}")]
    Telemetry(#[from] TelemetryError),

    /// `--json` 出力のシリアライズ失敗
    #[error("JSON出力に失敗しました: {0}")]
    Json(#[from] serde_json::Error),

    /// `init` の書き込み先が既に存在する
    #[error("プロファイルは既に存在します: {0} (--force で上書きできます)")]
    ProfileExists(String),

    /// `ready` がサーバーの準備未完了を検出した
    #[error("トラッキングサーバーは準備中です")]
    NotReady,
}

/// CLI のエントリーポイント
///
/// # 処理フロー
///
/// 1. `init` はプロファイルの雛形を書き出して終了（サーバー接続なし）
/// 2. プロファイルを解決し、`--base-url` の上書きを適用
/// 3. ログ出力を初期化
/// 4. APIクライアントを生成し、コマンドを実行
pub async fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Init { force } = &cli.command {
        let mut profile = Profile::default_profile()?;
        if let Some(base_url) = &cli.base_url {
            profile = profile.with_base_url(base_url)?;
        }
        let path = cli
            .profile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE_FILE));
        return init_profile(&profile, &path, *force);
    }

    let mut profile = Profile::resolve(cli.profile.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        profile = profile.with_base_url(base_url)?;
    }

    let _guard = telemetry::init(profile.log(), cli.verbose)?;
    info!(base_url = %profile.connection().base_url(), "トラッキングサーバーに接続します");

    let client: Arc<dyn TrackerApi> = Arc::from(create_client(profile.connection())?);
    dispatch(cli.command, client, cli.json).await
}

/// コマンドを対応するハンドラーへ振り分ける
async fn dispatch(
    command: Commands,
    client: Arc<dyn TrackerApi>,
    json: bool,
) -> Result<(), CliError> {
    match command {
        Commands::Ready => ready(client.as_ref(), json).await,
        Commands::Projects => projects(client.as_ref(), json).await,
        Commands::Apps { project_id } => applications(client.as_ref(), &project_id, json).await,
        Commands::Steps {
            project_id,
            app_id,
            report,
        } => steps(client.as_ref(), &project_id, &app_id, report, json).await,
        Commands::Watch {
            project_id,
            app_id,
            interval_secs,
            deadline_secs,
        } => watch(client, &project_id, &app_id, interval_secs, deadline_secs, json).await,
        Commands::Chat { command } => match command {
            ChatCommands::Create { project_id, app_id } => {
                chat_create(client.as_ref(), &project_id, &app_id, json).await
            }
            ChatCommands::Send {
                project_id,
                app_id,
                prompt,
            } => chat_send(client.as_ref(), &project_id, &app_id, &prompt, json).await,
            ChatCommands::History { project_id, app_id } => {
                chat_history(client.as_ref(), &project_id, &app_id, json).await
            }
        },
        Commands::Ui { path } => ui(client.as_ref(), &path).await,
        // init は run() が先に処理するためここには到達しない
        Commands::Init { .. } => Ok(()),
    }
}

async fn ready(client: &dyn TrackerApi, json: bool) -> Result<(), CliError> {
    let ready = client.ready().await?;

    if json {
        println!("{}", serde_json::json!({ "ready": ready }));
    } else if ready {
        println!("トラッキングサーバーは稼働中です");
    }

    // 準備未完了は終了コードで通知する（ヘルスチェック用途）
    if ready {
        Ok(())
    } else {
        Err(CliError::NotReady)
    }
}

async fn projects(client: &dyn TrackerApi, json: bool) -> Result<(), CliError> {
    let projects = client.projects().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else {
        println!("{}", output::render_projects(&projects));
    }
    Ok(())
}

async fn applications(client: &dyn TrackerApi, project_id: &str, json: bool) -> Result<(), CliError> {
    let apps = client.applications(project_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
    } else {
        println!("{}", output::render_applications(&apps));
    }
    Ok(())
}

async fn steps(
    client: &dyn TrackerApi,
    project_id: &str,
    app_id: &str,
    report: bool,
    json: bool,
) -> Result<(), CliError> {
    let mut steps = client.steps(project_id, app_id).await?;
    steps.sort_by_key(|step| step.step_sequence_id);

    if report {
        let report = ApplicationReport::from_steps(project_id, app_id, &steps);
        if json {
            println!("{}", report.to_json()?);
        } else {
            println!("{}", output::render_report(&report));
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
    } else {
        println!("{}", output::render_steps(&steps));
    }
    Ok(())
}

async fn watch(
    client: Arc<dyn TrackerApi>,
    project_id: &str,
    app_id: &str,
    interval_secs: u64,
    deadline_secs: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let mut watcher = StepWatcher::new(client, project_id, app_id)
        .with_interval(Duration::from_secs(interval_secs));
    if let Some(deadline) = deadline_secs {
        watcher = watcher.with_deadline(Duration::from_secs(deadline));
    }

    let outcome = watcher
        .follow(|step| println!("{}", output::render_step_line(step)))
        .await?;

    let report = ApplicationReport::from_steps(project_id, app_id, &outcome.steps);
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!();
        println!("{}", output::render_report(&report));
    }
    Ok(())
}

async fn chat_create(
    client: &dyn TrackerApi,
    project_id: &str,
    app_id: &str,
    json: bool,
) -> Result<(), CliError> {
    let created = client.chat_create(project_id, app_id).await?;

    if json {
        println!("{}", serde_json::json!({ "app_id": created }));
    } else {
        println!("チャットアプリケーションを作成しました: {created}");
    }
    Ok(())
}

async fn chat_send(
    client: &dyn TrackerApi,
    project_id: &str,
    app_id: &str,
    prompt: &str,
    json: bool,
) -> Result<(), CliError> {
    let items = client.chat_response(project_id, app_id, prompt).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{}", output::render_chat_items(&items));
    }
    Ok(())
}

async fn chat_history(
    client: &dyn TrackerApi,
    project_id: &str,
    app_id: &str,
    json: bool,
) -> Result<(), CliError> {
    let items = client.chat_history(project_id, app_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{}", output::render_chat_items(&items));
    }
    Ok(())
}

async fn ui(client: &dyn TrackerApi, path: &str) -> Result<(), CliError> {
    let body = client.ui_page(path).await?;
    println!("{body}");
    Ok(())
}

/// プロファイルの雛形をファイルに書き出す
fn init_profile(profile: &Profile, path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::ProfileExists(path.display().to_string()));
    }

    profile.to_file(path)?;
    println!("プロファイルを書き出しました: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApplicationSummary, ChatItem, ChatItemKind, ChatRole, Project, Step};
    use async_trait::async_trait;

    /// 全エンドポイントが成功する最小のモック
    struct StubTracker {
        ready: bool,
    }

    #[async_trait]
    impl TrackerApi for StubTracker {
        async fn ready(&self) -> Result<bool, ApiError> {
            Ok(self.ready)
        }

        async fn projects(&self) -> Result<Vec<Project>, ApiError> {
            Ok(Vec::new())
        }

        async fn applications(
            &self,
            _project_id: &str,
        ) -> Result<Vec<ApplicationSummary>, ApiError> {
            Ok(Vec::new())
        }

        async fn steps(&self, _project_id: &str, _app_id: &str) -> Result<Vec<Step>, ApiError> {
            Ok(Vec::new())
        }

        async fn chat_create(&self, _project_id: &str, _app_id: &str) -> Result<String, ApiError> {
            Ok("chat-1".to_string())
        }

        async fn chat_response(
            &self,
            _project_id: &str,
            _app_id: &str,
            prompt: &str,
        ) -> Result<Vec<ChatItem>, ApiError> {
            Ok(vec![ChatItem {
                role: ChatRole::Assistant,
                content: format!("echo: {prompt}"),
                kind: ChatItemKind::Text,
            }])
        }

        async fn chat_history(
            &self,
            _project_id: &str,
            _app_id: &str,
        ) -> Result<Vec<ChatItem>, ApiError> {
            Ok(Vec::new())
        }

        async fn ui_page(&self, _rest_of_path: &str) -> Result<String, ApiError> {
            Ok("<html></html>".to_string())
        }
    }

    #[test]
    fn test_cli_parses_steps_with_report() {
        let cli = Cli::try_parse_from(["melted-trail", "steps", "demo", "run-1", "--report"])
            .unwrap();

        match cli.command {
            Commands::Steps {
                project_id,
                app_id,
                report,
            } => {
                assert_eq!(project_id, "demo");
                assert_eq!(app_id, "run-1");
                assert!(report);
            }
            other => panic!("Steps になるはず: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_chat_send() {
        let cli = Cli::try_parse_from([
            "melted-trail",
            "chat",
            "send",
            "demo",
            "chat-1",
            "こんにちは",
        ])
        .unwrap();

        match cli.command {
            Commands::Chat {
                command: ChatCommands::Send { prompt, .. },
            } => assert_eq!(prompt, "こんにちは"),
            other => panic!("Chat Send になるはず: {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "melted-trail",
            "--json",
            "--verbose",
            "--base-url",
            "http://10.0.0.5:7241",
            "projects",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(cli.verbose);
        assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.5:7241"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["melted-trail"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_polling_interval() {
        let result = Cli::try_parse_from([
            "melted-trail",
            "watch",
            "demo",
            "run-1",
            "--interval-secs",
            "0",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_cli_watch_defaults() {
        let cli = Cli::try_parse_from(["melted-trail", "watch", "demo", "run-1"]).unwrap();

        match cli.command {
            Commands::Watch {
                interval_secs,
                deadline_secs,
                ..
            } => {
                assert_eq!(interval_secs, 2);
                assert_eq!(deadline_secs, None);
            }
            other => panic!("Watch になるはず: {other:?}"),
        }
    }

    #[test]
    fn test_init_profile_respects_existing_file() {
        let path = std::env::temp_dir().join(format!(
            "melted-trail-init-test-{}.toml",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let profile = Profile::default_profile().unwrap();

        // 新規作成は成功する
        init_profile(&profile, &path, false).unwrap();
        assert!(path.exists());

        // --force なしの上書きは拒否される
        let err = init_profile(&profile, &path, false).unwrap_err();
        assert!(matches!(err, CliError::ProfileExists(_)));

        // --force ありなら上書きできる
        init_profile(&profile, &path, true).unwrap();

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_dispatch_ready() {
        let client: Arc<dyn TrackerApi> = Arc::new(StubTracker { ready: true });
        let result = dispatch(Commands::Ready, client, false).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_dispatch_ready_not_ready_is_error() {
        // 準備未完了は終了コード用のエラーとして返る
        let client: Arc<dyn TrackerApi> = Arc::new(StubTracker { ready: false });
        let err = dispatch(Commands::Ready, client, false).await.unwrap_err();
        assert!(matches!(err, CliError::NotReady));
    }

    #[tokio::test]
    async fn test_dispatch_chat_send_json() {
        let client: Arc<dyn TrackerApi> = Arc::new(StubTracker { ready: true });
        let command = Commands::Chat {
            command: ChatCommands::Send {
                project_id: "demo".to_string(),
                app_id: "chat-1".to_string(),
                prompt: "hello".to_string(),
            },
        };

        let result = dispatch(command, client, true).await;
        assert!(result.is_ok());
    }
}
