//! Classification oracle interface and answer parsing

use crate::Result;
use async_trait::async_trait;

/// External service that picks one label out of a constrained option list
#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    /// Send `prompt` and return the raw answer text
    async fn classify(&self, prompt: &str, options: &[String]) -> Result<String>;

    /// Short name used in log lines
    fn name(&self) -> &str {
        "oracle"
    }
}

/// Extract the chosen label from an answer in `番号: 職種名` form.
///
/// Lines are scanned in order and split on the first ASCII or full-width
/// colon. The first remainder that exactly matches an option wins.
pub fn parse_answer<'a>(answer: &str, options: &'a [String]) -> Option<&'a str> {
    answer.lines().find_map(|line| {
        let (_, label) = line.split_once(|c: char| c == ':' || c == '：')?;
        let label = label.trim();
        options
            .iter()
            .find(|option| option.as_str() == label)
            .map(String::as_str)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec![
            "企画営業【法人営業・個人営業】".to_string(),
            "経理".to_string(),
            "Web・オープン系 プログラマ【PG】".to_string(),
        ]
    }

    #[test]
    fn test_parse_simple_answer() {
        let options = options();
        assert_eq!(parse_answer("2: 経理", &options), Some("経理"));
        assert_eq!(parse_answer("2：経理", &options), Some("経理"));
    }

    #[test]
    fn test_parse_skips_invalid_lines() {
        let options = options();
        let answer = "回答:\n候補: 宇宙飛行士\n3: Web・オープン系 プログラマ【PG】\n2: 経理";
        assert_eq!(
            parse_answer(answer, &options),
            Some("Web・オープン系 プログラマ【PG】")
        );
    }

    #[test]
    fn test_parse_rejects_unknown_or_unformatted() {
        let options = options();
        assert_eq!(parse_answer("経理", &options), None);
        assert_eq!(parse_answer("", &options), None);
        assert_eq!(parse_answer("1: 総務", &options), None);
    }
}
