//! Word tokenisation and n-gram fragments over inner-text offsets.

use std::sync::LazyLock;

use regex::Regex;

use super::markup::ParsedContent;

/// Unicode-aware word characters (letters, marks, digits, connectors).
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// A single word with its inner-text span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// One or more consecutive words joined by single spaces, with the span from
/// the first word's start to the last word's end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// All word tokens in document order.
///
/// Words never span text leaves: markup boundaries always split a word.
pub fn word_tokens(parsed: &ParsedContent) -> Vec<Token> {
    let mut tokens = Vec::new();

    for leaf in parsed.text_leaves() {
        // Regex offsets are bytes; walk forward counting chars.
        let mut byte_pos = 0;
        let mut char_pos = leaf.start;

        for m in WORD.find_iter(leaf.text) {
            char_pos += leaf.text[byte_pos..m.start()].chars().count();
            let len = m.as_str().chars().count();
            tokens.push(Token {
                text: m.as_str().to_string(),
                start: char_pos,
                end: char_pos + len,
            });
            char_pos += len;
            byte_pos = m.end();
        }
    }

    tokens
}

/// Every n-gram of `1..=n_max` consecutive words.
///
/// Fragments are ordered by first word, then by length.
pub fn tokenize(parsed: &ParsedContent, n_max: usize) -> Vec<TextFragment> {
    ngrams(&word_tokens(parsed), n_max)
}

/// Build n-gram fragments from a token list.
pub fn ngrams(tokens: &[Token], n_max: usize) -> Vec<TextFragment> {
    let mut fragments = Vec::with_capacity(tokens.len().saturating_mul(n_max.min(tokens.len())));

    for i in 0..tokens.len() {
        let mut text = String::new();
        for (n, token) in tokens[i..].iter().take(n_max).enumerate() {
            if n > 0 {
                text.push(' ');
            }
            text.push_str(&token.text);
            fragments.push(TextFragment {
                text: text.clone(),
                start: tokens[i].start,
                end: token.end,
            });
        }
    }

    fragments
}
