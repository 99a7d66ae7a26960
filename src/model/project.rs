//! プロジェクトのレコード定義
//!
//! # 責務
//!
//! `GET /api/v0/projects` が返すプロジェクト一覧の要素 [`Project`] を提供する。
//! プロジェクトは複数のアプリケーション（トレース済み実行）を束ねる単位です。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// プロジェクト
///
/// トラッキングサーバー上でアプリケーション群を束ねる最上位の単位。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// プロジェクトID（APIのパスパラメーターとして使用）
    pub id: String,

    /// 表示名
    pub name: String,

    /// プロジェクトの所在を示すURI（サーバー実装依存）
    pub uri: String,

    /// 最後に書き込みがあった日時
    #[serde(with = "crate::model::datetime")]
    pub last_written: DateTime<Utc>,

    /// プロジェクト配下のアプリケーション数
    pub num_apps: u64,
}
