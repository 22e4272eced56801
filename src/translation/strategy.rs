//! 翻译策略
//!
//! 三种粒度：整段文本、逐词、逐字符。每种策略都是纯函数，
//! 共享同一条回退规则：查不到就保留原样。

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::translation::error::LocaliserError;
use crate::translation::lookup::LookupTable;

/// 翻译策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// 整个文本节点作为一个键
    #[default]
    #[serde(alias = "text", alias = "textNodes", alias = "text-nodes")]
    WholeText,
    /// 按空白切词，空白原样保留
    #[serde(alias = "words")]
    PerWord,
    /// 逐个字符（不按字素簇）
    #[serde(alias = "letters")]
    PerCharacter,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::WholeText, Strategy::PerWord, Strategy::PerCharacter];

    /// 由原文、语言和查找表计算显示文本
    pub fn apply(self, original: &str, locale: &str, lookup_table: &LookupTable) -> String {
        match self {
            Strategy::WholeText => translate_whole_text(original, locale, lookup_table),
            Strategy::PerWord => translate_words(original, locale, lookup_table),
            Strategy::PerCharacter => translate_characters(original, locale, lookup_table),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::WholeText => "whole-text",
            Strategy::PerWord => "per-word",
            Strategy::PerCharacter => "per-character",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = LocaliserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whole-text" | "whole_text" | "text" | "textnodes" | "text-nodes" => {
                Ok(Strategy::WholeText)
            }
            "per-word" | "per_word" | "words" => Ok(Strategy::PerWord),
            "per-character" | "per_character" | "letters" => Ok(Strategy::PerCharacter),
            other => Err(LocaliserError::InvalidInput(format!(
                "未知的翻译策略 '{}'，可选: whole-text, per-word, per-character",
                other
            ))),
        }
    }
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

fn translate_whole_text(original: &str, locale: &str, lookup_table: &LookupTable) -> String {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        return original.to_string();
    }

    lookup_table
        .lookup(locale, &trimmed.to_lowercase())
        .map(str::to_string)
        .unwrap_or_else(|| original.to_string())
}

fn translate_words(original: &str, locale: &str, lookup_table: &LookupTable) -> String {
    let mut translated = String::with_capacity(original.len());
    let mut last = 0;

    for separator in whitespace_regex().find_iter(original) {
        push_word(&mut translated, &original[last..separator.start()], locale, lookup_table);
        translated.push_str(separator.as_str());
        last = separator.end();
    }
    push_word(&mut translated, &original[last..], locale, lookup_table);

    translated
}

fn push_word(buf: &mut String, word: &str, locale: &str, lookup_table: &LookupTable) {
    if word.is_empty() {
        return;
    }

    match lookup_table.lookup(locale, &word.to_lowercase()) {
        Some(translation) => buf.push_str(translation),
        None => buf.push_str(word),
    }
}

fn translate_characters(original: &str, locale: &str, lookup_table: &LookupTable) -> String {
    let mut translated = String::with_capacity(original.len());

    for c in original.chars() {
        let key: String = c.to_lowercase().collect();
        match lookup_table.lookup(locale, &key) {
            Some(translation) => translated.push_str(translation),
            None => translated.push(c),
        }
    }

    translated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LookupTable {
        LookupTable::new()
            .with_entry("en", "hello", "Bonjour")
            .with_entry("en", "world", "monde")
            .with_entry("en", "hello world", "Bonjour le monde")
            .with_entry("en", "a", "1")
            .with_entry("en", "b", "2")
    }

    #[test]
    fn test_whole_text_trims_for_lookup() {
        assert_eq!(Strategy::WholeText.apply("  Hello World \n", "en", &table()), "Bonjour le monde");
    }

    #[test]
    fn test_whole_text_miss_keeps_untrimmed_original() {
        assert_eq!(Strategy::WholeText.apply("  Goodbye  ", "en", &table()), "  Goodbye  ");
    }

    #[test]
    fn test_whole_text_whitespace_only_unchanged() {
        assert_eq!(Strategy::WholeText.apply(" \n\t ", "en", &table()), " \n\t ");
        assert_eq!(Strategy::WholeText.apply("", "en", &table()), "");
    }

    #[test]
    fn test_per_word_preserves_whitespace_runs() {
        assert_eq!(Strategy::PerWord.apply("Hello   world", "en", &table()), "Bonjour   monde");
        assert_eq!(
            Strategy::PerWord.apply("\n Hello,\tworld \n", "en", &table()),
            "\n Hello,\tmonde \n"
        );
    }

    #[test]
    fn test_per_word_whitespace_only_is_identity() {
        assert_eq!(Strategy::PerWord.apply("   ", "en", &table()), "   ");
    }

    #[test]
    fn test_per_character() {
        assert_eq!(Strategy::PerCharacter.apply("AB", "en", &table()), "12");
        assert_eq!(Strategy::PerCharacter.apply("a-c", "en", &table()), "1-c");
    }

    #[test]
    fn test_missing_locale_is_identity_for_all_strategies() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.apply(" Hello world ", "xx", &table()), " Hello world ");
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("textNodes".parse::<Strategy>().unwrap(), Strategy::WholeText);
        assert_eq!("words".parse::<Strategy>().unwrap(), Strategy::PerWord);
        assert_eq!("Per-Character".parse::<Strategy>().unwrap(), Strategy::PerCharacter);
        assert!("sentences".parse::<Strategy>().is_err());

        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_serde_aliases() {
        let strategy: Strategy = serde_json::from_str("\"letters\"").unwrap();
        assert_eq!(strategy, Strategy::PerCharacter);
        assert_eq!(serde_json::to_string(&Strategy::PerWord).unwrap(), "\"per-word\"");
    }
}
