//! エンドポイントのパス構築
//!
//! # 責務
//!
//! - 各エンドポイントのパスを「セグメントの列」として返す純粋関数を提供
//! - パスパラメーター（プロジェクトID / アプリケーションID）の埋め込み位置を
//!   1箇所に集約
//!
//! # セグメント列にする理由
//!
//! パスを文字列連結で組み立てると、`/` や `%` を含むIDがパス構造を
//! 破壊できてしまいます。セグメント列のままクライアントに渡し、URL構築時に
//! セグメント単位でパーセントエンコードさせることで、任意のIDを安全に
//! 埋め込めます。
//!
//! # パス対応表
//!
//! | 関数 | パス |
//! |--------|------|
//! | [`ready`] | `/api/v0/ready` |
//! | [`projects`] | `/api/v0/projects` |
//! | [`applications`] | `/api/v0/{project_id}/apps` |
//! | [`steps`] | `/api/v0/{project_id}/{app_id}/apps` |
//! | [`chat_create`] | `/api/v0/chatbot/{project_id}/{app_id}/create` |
//! | [`chat_response`] | `/api/v0/chatbot/{project_id}/{app_id}/response` |
//! | [`chat_history`] | `/api/v0/chatbot/{project_id}/{app_id}/history` |
//! | [`ui`] | `/{rest_of_path}` |

// APIパスの共通プレフィックス
const API_ROOT: &str = "api";
const API_VERSION: &str = "v0";

// チャットボットAPIのプレフィックス
const CHATBOT: &str = "chatbot";

/// 死活確認のパス
pub fn ready() -> Vec<&'static str> {
    vec![API_ROOT, API_VERSION, "ready"]
}

/// プロジェクト一覧のパス
pub fn projects() -> Vec<&'static str> {
    vec![API_ROOT, API_VERSION, "projects"]
}

/// アプリケーション一覧のパス
pub fn applications(project_id: &str) -> Vec<&str> {
    vec![API_ROOT, API_VERSION, project_id, "apps"]
}

/// ステップログのパス
pub fn steps<'a>(project_id: &'a str, app_id: &'a str) -> Vec<&'a str> {
    vec![API_ROOT, API_VERSION, project_id, app_id, "apps"]
}

/// チャットボットアプリケーション作成のパス
pub fn chat_create<'a>(project_id: &'a str, app_id: &'a str) -> Vec<&'a str> {
    vec![API_ROOT, API_VERSION, CHATBOT, project_id, app_id, "create"]
}

/// プロンプト送信のパス
///
/// プロンプト本文はパスに含まれません（`prompt` クエリパラメーターで送信）。
pub fn chat_response<'a>(project_id: &'a str, app_id: &'a str) -> Vec<&'a str> {
    vec![API_ROOT, API_VERSION, CHATBOT, project_id, app_id, "response"]
}

/// チャット履歴のパス
pub fn chat_history<'a>(project_id: &'a str, app_id: &'a str) -> Vec<&'a str> {
    vec![API_ROOT, API_VERSION, CHATBOT, project_id, app_id, "history"]
}

/// 同梱UIのパス
///
/// `rest_of_path` を `/` で分割し、空セグメントを除いた列を返します。
/// 空文字列はサーバールートを指します。
pub fn ui(rest_of_path: &str) -> Vec<&str> {
    rest_of_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_routes() {
        assert_eq!(ready(), vec!["api", "v0", "ready"]);
        assert_eq!(projects(), vec!["api", "v0", "projects"]);
    }

    #[test]
    fn test_project_scoped_routes() {
        assert_eq!(
            applications("demo_chatbot"),
            vec!["api", "v0", "demo_chatbot", "apps"]
        );
        assert_eq!(
            steps("demo_chatbot", "run-1"),
            vec!["api", "v0", "demo_chatbot", "run-1", "apps"]
        );
    }

    #[test]
    fn test_chatbot_routes() {
        assert_eq!(
            chat_create("p", "a"),
            vec!["api", "v0", "chatbot", "p", "a", "create"]
        );
        assert_eq!(
            chat_response("p", "a"),
            vec!["api", "v0", "chatbot", "p", "a", "response"]
        );
        assert_eq!(
            chat_history("p", "a"),
            vec!["api", "v0", "chatbot", "p", "a", "history"]
        );
    }

    #[test]
    fn test_route_params_are_not_interpreted() {
        // IDはそのままセグメントとして返す（エンコードはURL構築側の責務）
        let segments = steps("my project", "run/1");
        assert_eq!(segments, vec!["api", "v0", "my project", "run/1", "apps"]);
    }

    #[test]
    fn test_ui_root() {
        assert!(ui("").is_empty());
        assert!(ui("/").is_empty());
    }

    #[test]
    fn test_ui_nested_path() {
        assert_eq!(
            ui("static/js/main.js"),
            vec!["static", "js", "main.js"]
        );
        // 先頭スラッシュと連続スラッシュは正規化される
        assert_eq!(ui("/static//css/app.css"), vec!["static", "css", "app.css"]);
    }
}
