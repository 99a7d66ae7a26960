//! ログ出力の初期化
//!
//! # 責務
//!
//! このモジュールは、接続プロファイルの [`LogSettings`] に従って
//! `tracing` のグローバルサブスクライバーを初期化します。
//!
//! ## 主な機能
//!
//! - **出力レベル**: プロファイルの `log.level` を下限に設定。
//!   `--verbose` 指定時は最低でも `debug` まで引き上げ
//! - **出力先**: 既定は標準エラー出力。`log.file` 指定時は
//!   非同期ライターでファイルに出力
//! - **形式**: 既定は人間向けテキスト。`log.json = true` で JSON Lines
//!
//! ## ガードの保持
//!
//! ファイル出力時は非同期ライターのフラッシュを保証するため、
//! [`TelemetryGuard`] をプログラム終了まで保持する必要があります。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use melted_trail::config::LogSettings;
//! use melted_trail::telemetry;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = LogSettings::default();
//!     let _guard = telemetry::init(&settings, false)?;
//!
//!     tracing::info!("初期化完了");
//!     Ok(())
//! }
//! ```

use std::path::Path;

use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::config::{LogLevel, LogSettings};

/// ログ出力の初期化エラー
///
/// # エラー種別
///
/// - [`TelemetryError::LogFile`] - ログファイルを開けない
/// - [`TelemetryError::AlreadyInitialized`] - グローバルサブスクライバーが設定済み
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// ログファイルを開けない
    #[error("ログファイルを開けません ({path}): {message}")]
    LogFile {
        /// 指定されたログファイルのパス
        path: String,
        /// 失敗の内容
        message: String,
    },

    /// グローバルサブスクライバーが設定済み
    #[error("ログ出力は既に初期化されています")]
    AlreadyInitialized,
}

/// ログ出力のライフタイムを管理するガード
///
/// ファイル出力時の非同期ライターを保持します。ドロップ時に
/// バッファー済みのログがフラッシュされるため、`main` の先頭で
/// 受け取りプログラム終了まで保持してください。
#[derive(Debug)]
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

/// ログ出力を初期化する
///
/// # 引数
///
/// - `settings`: プロファイルのログ設定
/// - `verbose`: `--verbose` 指定時は出力レベルを最低でも `debug` に引き上げ
///
/// # 戻り値
///
/// プログラム終了まで保持すべき [`TelemetryGuard`]
///
/// # エラー
///
/// - [`TelemetryError::LogFile`] - ログファイルを開けない場合
/// - [`TelemetryError::AlreadyInitialized`] - 既に初期化済みの場合
pub fn init(settings: &LogSettings, verbose: bool) -> Result<TelemetryGuard, TelemetryError> {
    let level = max_level(settings, verbose);

    let file_guard = match &settings.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            init_file(level, settings.json, writer)?;
            Some(guard)
        }
        None => {
            init_stderr(level, settings.json)?;
            None
        }
    };

    Ok(TelemetryGuard {
        _file_guard: file_guard,
    })
}

/// 設定と `--verbose` フラグから出力レベルの下限を決める
///
/// `--verbose` は引き上げのみを行い、`trace` 設定を降格させません。
fn max_level(settings: &LogSettings, verbose: bool) -> Level {
    let configured = tracing_level(settings.level);
    if verbose && configured < Level::DEBUG {
        Level::DEBUG
    } else {
        configured
    }
}

/// プロファイルのログレベルを `tracing` のレベルへ対応付ける
fn tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// 標準エラー出力へのサブスクライバーを設定
fn init_stderr(level: Level, json: bool) -> Result<(), TelemetryError> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|_| TelemetryError::AlreadyInitialized)
}

/// ファイルへのサブスクライバーを設定
fn init_file(level: Level, json: bool, writer: NonBlocking) -> Result<(), TelemetryError> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|_| TelemetryError::AlreadyInitialized)
}

/// ログファイルへの非同期ライターを用意する
///
/// パスをディレクトリとファイル名に分解し、ローテーションなしの
/// アペンダーを構築します。
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), TelemetryError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TelemetryError::LogFile {
            path: path.display().to_string(),
            message: "ファイル名がありません".to_string(),
        })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| TelemetryError::LogFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(tracing_appender::non_blocking(appender))
}
