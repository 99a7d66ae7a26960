//! 接続プロファイルの読み込みと管理を行うモジュール
//!
//! # 責務
//!
//! このモジュールは、トラッキングサーバーへの接続設定を TOML 形式で定義し、
//! それを Rust の型として扱うための機能を提供します。
//!
//! ## 主な機能
//!
//! - **TOML パース**: プロファイルファイルを読み込み、バリデーションを経て
//!   [`Profile`] 構造体に変換
//! - **接続設定**: ベースURLとタイムアウトを [`Connection`] として保持
//! - **ログ設定**: 出力レベル・出力先・形式を [`LogSettings`] として保持
//! - **既定値の補完**: セクションやフィールドの省略時は既定値で動作
//!
//! ## プロファイルの解決順序
//!
//! 1. `--profile` で明示されたパス（存在しなければエラー）
//! 2. カレントディレクトリの `melted-trail.toml`
//! 3. 組み込みの既定値（`http://localhost:7241`、タイムアウト30秒）
//!
//! ## 使用例
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:7241"
//! timeout_secs = 30
//!
//! [log]
//! level = "debug"
//! file = "melted-trail.log"
//! json = false
//! ```
//!
//! ## 関連モジュール
//!
//! - [`crate::api`]: [`Connection`] からAPIクライアントを構築
//! - [`crate::telemetry`]: [`LogSettings`] に従ってログ出力を初期化

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::dto::{LogDto, ProfileDto, ServerDto};
use crate::error::ConfigError;

/// トラッキングサーバーの既定ベースURL
pub const DEFAULT_BASE_URL: &str = "http://localhost:7241";

/// 既定のリクエストタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// カレントディレクトリから探すプロファイルファイル名
pub const DEFAULT_PROFILE_FILE: &str = "melted-trail.toml";

/// 接続プロファイル（ドメインモデル）
///
/// トラッキングサーバーへの接続とログ出力の設定全体を表す構造体です。
/// バリデーション済みの状態を保証します。
///
/// ## DTO との違い
///
/// - [`ProfileDto`]: TOML デシリアライズ専用、バリデーション前の生データ
/// - [`Profile`]: バリデーション済み、既定値の補完が済んだ状態
#[derive(Debug, Clone)]
pub struct Profile {
    /// トラッキングサーバーへの接続設定
    connection: Connection,

    /// ログ出力の設定
    log: LogSettings,
}

impl Profile {
    /// TOML ファイルからプロファイルを読み込む
    ///
    /// # 処理フロー
    ///
    /// 1. ファイル読み込み
    /// 2. TOML デシリアライズ → [`ProfileDto`]
    /// 3. バリデーション & 変換 → [`Profile`]
    ///
    /// # 引数
    ///
    /// * `path` - TOML ファイルのパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(Profile)` - 読み込みに成功した場合
    /// * `Err(ConfigError)` - ファイルの読み込みまたはパースに失敗した場合
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// TOML 文字列からプロファイルを読み込む
    ///
    /// セクションやフィールドが省略されている場合は既定値を補います。
    /// 空文字列を渡すと全項目が既定値のプロファイルになります。
    ///
    /// # 引数
    ///
    /// * `raw` - TOML 形式の文字列
    ///
    /// # 戻り値
    ///
    /// * `Ok(Profile)` - パースに成功した場合
    /// * `Err(ConfigError)` - パースまたはバリデーションに失敗した場合
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let dto: ProfileDto = toml::from_str(raw)?;
        Self::try_from(dto)
    }

    /// プロファイルを TOML 文字列に変換
    ///
    /// # 処理フロー
    ///
    /// 1. ドメインモデル → [`ProfileDto`] 変換
    /// 2. TOML シリアライズ
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - TOML 文字列
    /// * `Err(ConfigError)` - シリアライズに失敗した場合
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let dto = ProfileDto::from(self);
        Ok(toml::to_string_pretty(&dto)?)
    }

    /// プロファイルを TOML ファイルに保存
    ///
    /// # 引数
    ///
    /// * `path` - 保存先のファイルパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 保存に成功した場合
    /// * `Err(ConfigError)` - シリアライズまたは書き込みに失敗した場合
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let raw = self.to_toml_string()?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// プロファイルを解決する
    ///
    /// 解決順序:
    ///
    /// 1. `explicit` が指定されていればそのパス（存在しなければエラー）
    /// 2. カレントディレクトリの [`DEFAULT_PROFILE_FILE`]
    /// 3. 組み込みの既定値
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_PROFILE_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    Self::default_profile()
                }
            }
        }
    }

    /// 組み込みの既定プロファイルを構築
    ///
    /// ベースURL `http://localhost:7241`、タイムアウト30秒、
    /// ログは `info` レベルで標準エラー出力です。
    pub fn default_profile() -> Result<Self, ConfigError> {
        Ok(Self {
            connection: Connection::new(
                DEFAULT_BASE_URL,
                Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            )?,
            log: LogSettings::default(),
        })
    }

    /// ベースURLを差し替えたプロファイルを返す
    ///
    /// CLI の `--base-url` オプションによる上書きに使用します。
    /// タイムアウトとログ設定は保持されます。
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.connection = Connection::new(base_url, self.connection.timeout())?;
        Ok(self)
    }

    /// 接続設定への参照
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// ログ設定への参照
    pub fn log(&self) -> &LogSettings {
        &self.log
    }
}

/// DTO からドメインモデルへの変換（読み込み方向）
///
/// バリデーションを実施し、不正なデータの場合は [`ConfigError::Validation`] を返します。
///
/// # 処理フロー
///
/// 1. 省略されたセクション・フィールドへの既定値の補完
/// 2. 接続設定のバリデーション（URL形式・スキーム・タイムアウト）
/// 3. `Profile` の構築
impl TryFrom<ProfileDto> for Profile {
    type Error = ConfigError;

    fn try_from(dto: ProfileDto) -> Result<Self, Self::Error> {
        let (base_url, timeout_secs) = match dto.server {
            Some(server) => (
                server
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            None => (DEFAULT_BASE_URL.to_string(), DEFAULT_TIMEOUT_SECS),
        };
        let connection = Connection::new(&base_url, Duration::from_secs(timeout_secs))?;

        let log = match dto.log {
            Some(log) => LogSettings {
                level: log.level.unwrap_or_default(),
                file: log.file,
                json: log.json.unwrap_or(false),
            },
            None => LogSettings::default(),
        };

        Ok(Self { connection, log })
    }
}

/// ドメインモデルから DTO への変換（書き込み方向）
///
/// バリデーション済みのドメインモデルから DTO を生成するため、
/// この変換は失敗しません（`From` トレイトを使用）。
impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            server: Some(ServerDto {
                base_url: Some(profile.connection.base_url.to_string()),
                timeout_secs: Some(profile.connection.timeout.as_secs()),
            }),
            log: Some(LogDto {
                level: Some(profile.log.level),
                file: profile.log.file.clone(),
                json: Some(profile.log.json),
            }),
        }
    }
}

/// トラッキングサーバーへの接続設定
///
/// バリデーション済みのベースURLとタイムアウトを保持します。
/// 構築は [`Connection::new`] のみで、不正な値の状態は存在しません。
#[derive(Debug, Clone)]
pub struct Connection {
    /// エンドポイント構築の起点となるベースURL
    base_url: Url,

    /// リクエスト全体に適用するタイムアウト
    timeout: Duration,
}

impl Connection {
    /// 接続設定を構築する
    ///
    /// # バリデーション
    ///
    /// - `base_url` がURLとして解釈できること
    /// - スキームが `http` または `https` であること
    /// - `timeout` が1秒以上であること
    ///
    /// # エラー
    ///
    /// いずれかの条件を満たさない場合は [`ConfigError::Validation`]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "base_url をURLとして解釈できません ({base_url}): {e}"
            ))
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "base_url のスキームは http / https のみ対応です: {other}"
                )));
            }
        }

        if timeout < Duration::from_secs(1) {
            return Err(ConfigError::Validation(
                "timeout_secs は 1 以上を指定してください".to_string(),
            ));
        }

        Ok(Self {
            base_url: parsed,
            timeout,
        })
    }

    /// ベースURLへの参照
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// リクエストタイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// ログ出力の設定
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// 出力するログレベルの下限
    pub level: LogLevel,

    /// ログの出力先ファイル（`None` なら標準エラー出力）
    pub file: Option<PathBuf>,

    /// JSON Lines 形式で出力するかどうか
    pub json: bool,
}

/// ログレベル（error/warn/info/debug/trace）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// エラーのみ
    Error,
    /// 警告以上
    Warn,
    /// 通常の運用ログ（既定値）
    #[default]
    Info,
    /// リクエスト単位の詳細ログ
    Debug,
    /// 最も詳細なログ
    Trace,
}

impl LogLevel {
    /// TOML / 表示で使用するキーワード
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
