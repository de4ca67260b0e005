//! Keyword heuristics for job categories and small attributes
//!
//! All matching is substring matching over lowercased text. Group order is
//! significant: technical and design signals are checked before anything
//! else, and sales only wins when no technical or design keyword appears.

use crate::transform::Attribute;

/// Label used when nothing more specific matches
pub const DEFAULT_LABEL: &str = "その他営業関連職";

const ENGINEER: &[&str] = &["エンジニア", "開発", "プログラマー", "se", "pg"];

const PRE_FILTER_LANGUAGES: &[&str] = &[
    "java", "php", "python", "javascript", "react", "vue", "angular", "go", "ruby", "c++", "c#",
    "swift", "kotlin",
];
const PRE_FILTER_TOOLS: &[&str] = &["docker", "kubernetes", "aws", "azure", "gcp", "git", "github"];
const PRE_FILTER_DESIGN: &[&str] = &["デザイナー", "ui", "ux"];

const LANGUAGES: &[&str] = &[
    "java", "php", "python", "javascript", "react", "vue", "angular", "go", "ruby", "c++", "c#",
];
const TECH: &[&str] = &[
    "プログラム",
    "コーディング",
    "プログラミング",
    "バックエンド",
    "フロントエンド",
    "サーバー",
    "インフラ",
    "ネットワーク",
    "データベース",
    "mysql",
    "sql",
    "api",
];
const DESIGN: &[&str] = &[
    "デザイナー",
    "デザイン",
    "ui",
    "ux",
    "グラフィック",
    "webデザイン",
    "figma",
    "photoshop",
    "illustrator",
    "アートディレクター",
];
const MARKETING: &[&str] = &[
    "マーケティング",
    "企画",
    "広告",
    "宣伝",
    "プロモーション",
    "商品企画",
    "事業企画",
    "経営企画",
    "webマーケティング",
    "デジタルマーケティング",
];
const HR: &[&str] = &[
    "人事",
    "採用",
    "hr",
    "リクルート",
    "キャリアアドバイザー",
    "キャリアコンサルタント",
];
const DIRECTOR: &[&str] = &["ディレクター", "プロデューサー", "pm", "プロジェクトマネージャー"];
const SALES: &[&str] = &["営業", "セールス", "法人営業", "個人営業"];

const SE_LABEL: &str = "Web・オープン系 SE【アプリケーション設計】";
const FRONTEND_LABEL: &str = "Webデザイナー、フロントエンドエンジニア、コーダー、フラッシャー";
const INFRA_LABEL: &str = "サーバ設計・サーバ構築";
const PG_LABEL: &str = "Web・オープン系 プログラマ【PG】";
const UX_LABEL: &str = "情報アーキテクト、UI/UXデザイナー";
const GRAPHIC_LABEL: &str = "グラフィックデザイナー";

fn any(content: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| content.contains(keyword))
}

/// Strong-signal matcher run before the oracle.
///
/// Returns a label only for unambiguous technical or design text.
pub fn pre_filter(text: &str) -> Option<&'static str> {
    let content = text.trim().to_lowercase();
    if content.is_empty() {
        return None;
    }

    let engineer = any(&content, ENGINEER);
    if engineer && (any(&content, PRE_FILTER_LANGUAGES) || any(&content, PRE_FILTER_TOOLS)) {
        let label = if any(&content, &["バックエンド", "backend", "サーバー", "api"]) {
            SE_LABEL
        } else if any(&content, &["フロントエンド", "frontend", "react", "vue"]) {
            FRONTEND_LABEL
        } else if any(&content, &["インフラ", "サーバー", "ネットワーク", "aws", "azure"]) {
            INFRA_LABEL
        } else {
            PG_LABEL
        };
        return Some(label);
    }

    if any(&content, PRE_FILTER_DESIGN) {
        let label = if any(&content, &["ui", "ux"]) {
            UX_LABEL
        } else if content.contains("web") {
            FRONTEND_LABEL
        } else {
            GRAPHIC_LABEL
        };
        return Some(label);
    }

    None
}

/// Full keyword classification; always produces a label
pub fn classify_minor(text: &str) -> &'static str {
    let content = text.trim().to_lowercase();
    if content.is_empty() {
        return DEFAULT_LABEL;
    }

    let engineer = any(&content, ENGINEER);
    let language = any(&content, LANGUAGES);
    let tech = any(&content, TECH);

    if engineer && (language || tech) {
        return if any(&content, &["バックエンド", "サーバー", "api", "java", "php", "python"]) {
            SE_LABEL
        } else if any(&content, &["フロントエンド", "react", "vue", "angular", "javascript"]) {
            FRONTEND_LABEL
        } else if any(&content, &["インフラ", "サーバー", "ネットワーク"]) {
            INFRA_LABEL
        } else {
            PG_LABEL
        };
    }

    let design = any(&content, DESIGN);
    if design {
        return if any(&content, &["ui", "ux", "webデザイン"]) {
            UX_LABEL
        } else if content.contains("web") {
            FRONTEND_LABEL
        } else {
            GRAPHIC_LABEL
        };
    }

    if any(&content, MARKETING) {
        return if content.contains("経営") {
            "経営企画"
        } else if any(&content, &["web", "デジタル"]) {
            "Webマーケティング、デジタルマーケティング"
        } else if content.contains("商品") {
            "商品企画、商品開発"
        } else {
            "販促企画、営業企画"
        };
    }

    if any(&content, HR) {
        return if any(&content, &["キャリア", "アドバイザー", "コンサルタント"]) {
            "キャリアカウンセラー、キャリアコンサルタント、人材派遣コーディネーター"
        } else {
            "人事、給与、労務、採用"
        };
    }

    if any(&content, DIRECTOR) {
        return if engineer {
            "Web・オープン系 プロジェクトマネージャー【PM】、リーダー【PL】"
        } else if content.contains("web") {
            "Webプロデューサー、Webディレクター、Webマスター、Web企画、Webプランナー"
        } else {
            "管理職【その他】"
        };
    }

    if any(&content, SALES) && !(engineer || language || tech || design) {
        return "企画営業【法人営業・個人営業】";
    }

    DEFAULT_LABEL
}

/// Whether the text carries any engineering or design keyword.
///
/// Drives the "never choose a sales label" block of the oracle prompt.
pub fn has_technical_signal(text: &str) -> bool {
    let content = text.to_lowercase();
    any(&content, ENGINEER)
        || any(&content, PRE_FILTER_LANGUAGES)
        || any(&content, TECH)
        || any(&content, DESIGN)
}

/// Match one categorical attribute. Blank text yields an empty string.
pub fn match_attribute(attribute: Attribute, text: &str) -> &'static str {
    if text.is_empty() {
        return "";
    }
    let content = text.to_lowercase();

    let (keywords, hit, miss): (&[&str], &str, &str) = match attribute {
        Attribute::Holiday => {
            if any(&content, &["土日", "週休2日", "完全週休"]) {
                return "土日休み";
            }
            (&["シフト", "交代", "24時間"], "シフト制", "その他")
        }
        Attribute::Transfer => (&["転勤", "異動"], "あり", "なし"),
        Attribute::Probation => (&["試用期間", "試用", "研修期間"], "あり", "なし"),
        Attribute::Bonus => (&["賞与", "ボーナス", "年２回", "年2回"], "あり", "なし"),
    };

    if any(&content, keywords) {
        hit
    } else {
        miss
    }
}
