//! CLI の表示整形
//!
//! # 責務
//!
//! - 各コマンドの人間向け出力文字列の組み立て
//! - エラー（バリデーション違反の明細を含む）の表示整形
//!
//! 整形関数はすべて純粋関数で、出力先への書き込みは行いません。
//! `--json` 指定時の出力はこのモジュールを通らず、モデルを直接
//! シリアライズします。

use std::time::Duration;

use crate::error::ApiError;
use crate::model::{ApplicationSummary, ChatItem, ChatItemKind, ChatRole, Project, Step, StepState};
use crate::report::ApplicationReport;

use super::CliError;

/// プロジェクト一覧の整形
pub fn render_projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "プロジェクトはありません".to_string();
    }

    let width = projects
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!("プロジェクト: {}件", projects.len())];
    for project in projects {
        lines.push(format!(
            "  {:<width$}  アプリ{}件  最終更新 {}",
            project.name,
            project.num_apps,
            project.last_written.to_rfc3339(),
        ));
    }
    lines.join("\n")
}

/// アプリケーション一覧の整形
pub fn render_applications(apps: &[ApplicationSummary]) -> String {
    if apps.is_empty() {
        return "アプリケーションはありません".to_string();
    }

    let width = apps
        .iter()
        .map(|a| a.app_id.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!("アプリケーション: {}件", apps.len())];
    for app in apps {
        let mut line = format!(
            "  {:<width$}  ステップ{}件  最終更新 {}",
            app.app_id,
            app.num_steps,
            app.last_written.to_rfc3339(),
        );

        if !app.tags.is_empty() {
            let mut tags: Vec<_> = app.tags.iter().collect();
            tags.sort();
            let joined = tags
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            line.push_str(&format!("  [{joined}]"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// ステップログ全体の整形
pub fn render_steps(steps: &[Step]) -> String {
    if steps.is_empty() {
        return "ステップはまだ記録されていません".to_string();
    }

    let mut lines = vec![format!("ステップ: {}件", steps.len())];
    for step in steps {
        lines.push(format!("  {}", render_step_line(step)));
    }
    lines.join("\n")
}

/// ステップ1件の整形（監視のストリーム表示と共用）
pub fn render_step_line(step: &Step) -> String {
    let state = step.state();
    let timing = match state {
        StepState::Running => "実行中".to_string(),
        _ => match step.duration() {
            Some(duration) => format_duration(duration),
            None => "-".to_string(),
        },
    };

    let mut line = format!(
        "[{:>4}] {:<9} {}  ({timing})",
        step.step_sequence_id,
        state.label(),
        step.action(),
    );

    if let Some(end) = &step.step_end_log {
        if let Some(exception) = &end.exception {
            // 例外メッセージは先頭行のみ表示する
            let first = exception.lines().next().unwrap_or("");
            line.push_str(&format!("\n         例外: {first}"));
        }
    }
    line
}

/// 集計レポートの整形
pub fn render_report(report: &ApplicationReport) -> String {
    let mut lines = vec![
        format!("プロジェクト: {}", report.project_id),
        format!("アプリケーション: {}", report.app_id),
        format!(
            "ステップ数: {} (完了{} / 失敗{} / 実行中{})",
            report.total_steps, report.completed, report.failed, report.running
        ),
    ];

    if !report.action_counts.is_empty() {
        let actions = report
            .action_counts
            .iter()
            .map(|(action, count)| format!("{action} {count}回"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("アクション別: {actions}"));
    }

    if let Some(first) = report.first_started {
        lines.push(format!("開始: {}", first.to_rfc3339()));
    }
    if let Some(last) = report.last_finished {
        lines.push(format!("最終終了: {}", last.to_rfc3339()));
    }
    if let Some(total) = report.total_duration {
        lines.push(format!("合計所要時間: {}", format_duration(total)));
    }

    lines.join("\n")
}

/// 会話履歴の整形
pub fn render_chat_items(items: &[ChatItem]) -> String {
    if items.is_empty() {
        return "会話履歴はありません".to_string();
    }

    let mut lines = Vec::new();
    for item in items {
        let role = match item.role {
            ChatRole::User => "ユーザー",
            ChatRole::Assistant => "アシスタント",
        };
        let marker = match item.kind {
            ChatItemKind::Text => "",
            ChatItemKind::Image => "[画像] ",
            ChatItemKind::Code => "[コード] ",
            ChatItemKind::Error => "[エラー] ",
        };
        lines.push(format!("{role}: {marker}{}", item.content));
    }
    lines.join("\n")
}

/// CLI エラーの表示整形
///
/// バリデーションエラー（HTTP 422）の場合は違反の明細を
/// 1件ずつ表示します。
pub fn render_cli_error(error: &CliError) -> String {
    let mut lines = vec![format!("エラー: {error}")];

    if let CliError::Api(ApiError::Validation(validation)) = error {
        for issue in &validation.detail {
            lines.push(format!("  - {}: {}", issue.location(), issue.msg));
        }
    }

    lines.join("\n")
}

/// 所要時間の表示整形（1秒未満はミリ秒）
pub(crate) fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ミリ秒", duration.as_millis())
    } else {
        format!("{:.1}秒", duration.as_secs_f64())
    }
}
