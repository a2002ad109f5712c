//! Word-aware case conversion for file names.
//!
//! A name goes through three steps before `convert_case` applies the target
//! casing: Latin letters lose their accents, apostrophes are removed, and the
//! text is split into words. Runs of characters that are neither letters nor
//! digits separate words, and so do internal transitions (`fooBar`, `XMLHttp`,
//! `file2go`). Ordinals such as `1st` or `4th` stay one word.

use std::sync::OnceLock;

use convert_case::{Boundary, Case, Casing};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

fn separator_runs() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS
        .get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("separator pattern compiles"))
}

/// Combining diacritical marks, including the half marks and the marks for
/// symbols.
fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{300}'..='\u{36F}' | '\u{FE20}'..='\u{FE2F}' | '\u{20D0}'..='\u{20FF}')
}

/// Latin letters that canonical decomposition leaves alone.
fn latin_replacement(c: char) -> Option<&'static str> {
    let replacement = match c {
        'Æ' => "Ae",
        'æ' => "ae",
        'Ð' | 'Đ' => "D",
        'ð' | 'đ' => "d",
        'Ħ' => "H",
        'ħ' => "h",
        'ı' => "i",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'ĸ' => "k",
        'Ŀ' | 'Ł' => "L",
        'ŀ' | 'ł' => "l",
        'ŉ' => "'n",
        'Ŋ' => "N",
        'ŋ' => "n",
        'Ø' => "O",
        'ø' => "o",
        'Œ' => "Oe",
        'œ' => "oe",
        'ſ' => "s",
        'ß' => "ss",
        'Þ' => "Th",
        'þ' => "th",
        'Ŧ' => "T",
        'ŧ' => "t",
        _ => return None,
    };
    Some(replacement)
}

/// Strip accents from Latin-1 Supplement and Latin Extended-A letters and drop
/// stray combining marks. Other scripts pass through untouched.
fn deburr(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if let Some(replacement) = latin_replacement(c) {
            out.push_str(replacement);
        } else if ('\u{C0}'..='\u{17F}').contains(&c) {
            out.extend(std::iter::once(c).nfd().filter(|m| !is_combining_mark(*m)));
        } else if !is_combining_mark(c) {
            out.push(c);
        }
    }
    out
}

/// Whether the letters at `i` are an ordinal suffix for the digit before
/// them: `1st`, `2nd`, `3rd`, or `th` after any other digit. The suffix must
/// end the word, either at the end of the chunk or at a change of case.
fn is_ordinal_suffix(chars: &[char], i: usize) -> bool {
    let (Some(&a), Some(&b)) = (chars.get(i), chars.get(i + 1)) else {
        return false;
    };
    let after = chars.get(i + 2).copied();
    let lower = a.is_lowercase() && b.is_lowercase() && after.is_none_or(char::is_uppercase);
    let upper = a.is_uppercase() && b.is_uppercase() && after.is_none_or(char::is_lowercase);
    if !lower && !upper {
        return false;
    }

    let suffix = [a.to_ascii_lowercase(), b.to_ascii_lowercase()];
    match (chars[i - 1], suffix) {
        ('1', ['s', 't']) | ('2', ['n', 'd']) | ('3', ['r', 'd']) => true,
        (digit, ['t', 'h']) => digit.is_ascii_digit() && !matches!(digit, '1' | '2' | '3'),
        _ => false,
    }
}

fn starts_word(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let c = chars[i];
    if prev.is_numeric() && c.is_alphabetic() {
        return !is_ordinal_suffix(chars, i);
    }
    if prev.is_alphabetic() && c.is_numeric() {
        return true;
    }
    if prev.is_lowercase() && c.is_uppercase() {
        return true;
    }
    // `XMLHttp`: the last capital of a run opens the next word.
    prev.is_uppercase() && c.is_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_lowercase())
}

/// Split a name into words, keeping each word's original casing.
pub fn words(name: &str) -> Vec<String> {
    let without_apostrophes: String = deburr(name)
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .collect();

    let mut words = Vec::new();
    for chunk in separator_runs().split(&without_apostrophes) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && starts_word(&chars, i) {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn convert(name: &str, case: Case) -> String {
    let words = words(name);
    if words.is_empty() {
        return String::new();
    }
    words
        .join(" ")
        .with_boundaries(&[Boundary::Space])
        .to_case(case)
}

pub fn camel_case(name: &str) -> String {
    convert(name, Case::Camel)
}

/// camelCase with the first character uppercased.
pub fn pascal_case(name: &str) -> String {
    upper_first(&camel_case(name))
}

pub fn snake_case(name: &str) -> String {
    convert(name, Case::Snake)
}

pub fn kebab_case(name: &str) -> String {
    convert(name, Case::Kebab)
}

/// Dot case is defined on top of an already computed snake_case value.
pub fn lower_dot_case(snake: &str) -> String {
    snake.replace('_', ".")
}

/// Plain character uppercasing; word boundaries are ignored.
pub fn upper_case(name: &str) -> String {
    name.to_uppercase()
}

pub fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
