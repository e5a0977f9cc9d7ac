//! Compiled regex patterns used on sample pages.
//!
//! All patterns are compiled once using `LazyLock`. Matching is
//! case-sensitive; the site prints these labels in a fixed casing.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// "12 mins read" style reading-time label.
pub static READ_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*mins\s*read").expect("READ_TIME regex"));

/// Labelled word count: "Word count : 2,500".
///
/// Digits are ASCII only, so every capture is a valid integer literal once
/// separators are removed.
pub static WORD_COUNT_LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Word\s*count\s*:\s*([0-9]+(?:,[0-9]+)?)").expect("WORD_COUNT_LABELLED regex")
});

/// Bare word count: "2500 words" or "1 word".
pub static WORD_COUNT_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:,[0-9]+)?)\s*(?:word|words)").expect("WORD_COUNT_BARE regex")
});

/// Word-count patterns in the order they are tried.
pub static WORD_COUNT_PATTERNS: LazyLock<[&'static Regex; 2]> =
    LazyLock::new(|| [&*WORD_COUNT_LABELLED, &*WORD_COUNT_BARE]);

/// `charset=` parameter inside a Content-Type value.
pub static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"';\s]+)"#).expect("CONTENT_TYPE_CHARSET regex")
});

/// `<meta charset="...">`.
pub static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>]+)"#).expect("META_CHARSET regex")
});
