//! Oracle prompt construction

use super::heuristic;
use std::fmt::Write;

/// System message sent with every classification request
pub const SYSTEM_MESSAGE: &str =
    "あなたは職種分類の専門家です。業務内容を分析して最適な職種分類を選択してください。";

const NO_SALES_BLOCK: &str = "【最優先判定ルール（営業系絶対除外）】
・「エンジニア」「開発」「プログラマー」「SE」「PG」+ プログラミング言語（Java/PHP/Python/JavaScript等）が含まれる場合
  → 営業系職種は絶対に選択禁止、必ずITエンジニア系を選択
・「デザイナー」「UI」「UX」「デザイン」が含まれる場合
  → 営業系職種は絶対に選択禁止、必ずクリエイティブ系またはWeb系を選択
";

const GENERAL_RULES: &str = "【通常の判定ルール】
・「マーケティング」「企画」が含まれる場合は企画・マーケティング系を選択
・「採用」「人事」「HR」が含まれる場合は事務・管理系の人事関連を選択
・「営業」「セールス」は技術系キーワードが一切ない場合のみ営業系を選択
";

/// Build the user message for one classification request
pub fn build_prompt(text: &str, options: &[String]) -> String {
    let mut prompt = String::from(
        "以下の求人タイトルに最も適した職種分類を、下記の選択肢から1つだけ選んでください。\n\n",
    );

    if heuristic::has_technical_signal(text) {
        prompt.push_str(NO_SALES_BLOCK);
        prompt.push('\n');
    }
    prompt.push_str(GENERAL_RULES);

    prompt.push_str("\n【求人タイトル】\n");
    prompt.push_str(text.trim());
    prompt.push_str("\n\n【職種分類の選択肢】\n");
    for (index, option) in options.iter().enumerate() {
        // writing to a String cannot fail
        let _ = writeln!(prompt, "{}. {}", index + 1, option);
    }

    prompt.push_str("\n回答は「番号: 職種名」の形式で、最も適切な1つだけを選択してください。\n");
    let example = options
        .first()
        .map(String::as_str)
        .unwrap_or(heuristic::DEFAULT_LABEL);
    let _ = write!(prompt, "例: 1: {}", example);

    prompt
}
