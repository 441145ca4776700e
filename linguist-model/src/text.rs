//! Text helpers shared by the models and the file formats: word/character
//! counting, whitespace simplification, numeric character references and
//! XML protection.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

/// Word and character totals of a piece of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextCounts {
    pub words: usize,
    /// Characters excluding whitespace
    pub chars: usize,
    /// All characters
    pub chars_with_space: usize,
}

impl TextCounts {
    pub fn of(text: &str) -> Self {
        let mut counts = TextCounts::default();
        counts.add(text);
        counts
    }

    /// Accumulates the counts of `text`. A word is a maximal run of
    /// letters, digits and underscores.
    pub fn add(&mut self, text: &str) {
        let mut in_word = false;
        for c in text.chars() {
            self.chars_with_space += 1;
            if c.is_alphanumeric() || c == '_' {
                if !in_word {
                    self.words += 1;
                    in_word = true;
                }
            } else {
                in_word = false;
            }
            if !c.is_whitespace() {
                self.chars += 1;
            }
        }
    }
}

impl std::ops::AddAssign for TextCounts {
    fn add_assign(&mut self, other: Self) {
        self.words += other.words;
        self.chars += other.chars;
        self.chars_with_space += other.chars_with_space;
    }
}

/// Trims the text and collapses every inner whitespace run into one space.
pub fn simplified(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sort form of a source text: simplified, with accelerator markers removed.
pub fn sort_text(text: &str) -> String {
    simplified(text).replace('&', "")
}

fn ncr_regex() -> &'static Regex {
    static NCR: OnceLock<Regex> = OnceLock::new();
    NCR.get_or_init(|| {
        Regex::new(r"&#(x?)([0-9A-Za-z]+);").expect("numeric character reference pattern")
    })
}

/// Replaces `&#NNN;` and `&#xHHH;` references with the characters they
/// name. Malformed or out of range references are left untouched.
pub fn resolve_ncr(text: &str) -> Cow<'_, str> {
    if !text.contains("&#") {
        return Cow::Borrowed(text);
    }
    ncr_regex().replace_all(text, |caps: &Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

fn is_printable(c: char) -> bool {
    !(c.is_control()
        || matches!(
            c,
            '\u{ad}'
                | '\u{200b}'..='\u{200f}'
                | '\u{2028}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{feff}'
        ))
}

/// Makes invisible characters visible as `&#xHHH;` references.
pub fn show_ncr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_printable(c) && u32::from(c) > 0x20 {
            result.push_str(&format!("&#x{:x};", u32::from(c)));
        } else {
            result.push(c);
        }
    }
    result
}

pub fn adjust_ncr_visibility(text: &str, ncr_mode: bool) -> String {
    if ncr_mode {
        show_ncr(text)
    } else {
        resolve_ncr(text).into_owned()
    }
}

/// Escapes text for the XML based formats. The five markup characters get
/// named entities, control characters other than CR, LF and TAB get
/// numeric references.
pub fn protect(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 12 / 10);
    for c in text.chars() {
        match c {
            '"' => result.push_str("&quot;"),
            '&' => result.push_str("&amp;"),
            '>' => result.push_str("&gt;"),
            '<' => result.push_str("&lt;"),
            '\'' => result.push_str("&apos;"),
            c if u32::from(c) < 0x20 && !matches!(c, '\r' | '\n' | '\t') => {
                result.push_str(&format!("&#{};", u32::from(c)));
            }
            c => result.push(c),
        }
    }
    result
}
