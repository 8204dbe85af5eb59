//! Bracket and quote aware tokenizing helpers.
//!
//! CIP values nest two kinds of brackets:
//! ```text
//! {1 Content={2854 Content={2853, 3031 Amount=40}}, 3 Content={3354}}
//! ```
//! Brackets and delimiters that appear inside a `"…"` span are plain text.

use crate::error::{CipError, Result};

/// An opening bracket and the closer that matches it.
pub type EnclosurePair = (char, char);

pub const CURLY: EnclosurePair = ('{', '}');
pub const PARENTHESIS: EnclosurePair = ('(', ')');

/// The bracket pairs recognised by the structural parser.
pub const DEFAULT_PAIRS: [EnclosurePair; 2] = [CURLY, PARENTHESIS];

pub const QUOTE: char = '"';

fn closer_for(open: char, pairs: &[EnclosurePair]) -> Option<char> {
    pairs.iter().find(|(o, _)| *o == open).map(|(_, c)| *c)
}

fn is_closer(ch: char, pairs: &[EnclosurePair]) -> bool {
    pairs.iter().any(|(_, c)| *c == ch)
}

/// Byte offset of the closer matching the opener at the start of `s`.
fn matching_close(s: &str, pairs: &[EnclosurePair]) -> Option<usize> {
    let mut expected: Vec<char> = Vec::new();
    let mut in_quote = false;

    for (pos, ch) in s.char_indices() {
        if ch == QUOTE {
            in_quote = !in_quote;
            continue;
        }
        if in_quote {
            continue;
        }
        if let Some(close) = closer_for(ch, pairs) {
            expected.push(close);
        } else if is_closer(ch, pairs) {
            if expected.pop() != Some(ch) {
                return None;
            }
            if expected.is_empty() {
                return Some(pos);
            }
        }
    }

    None
}

/// Remove one redundant outer bracket pair.
///
/// The pair is only removed when the first character opens it and the last
/// character is its own closer, so `(1,2),(3,4)` is returned unchanged.
pub fn strip_outer_enclosure<'a>(s: &'a str, pairs: &[EnclosurePair]) -> &'a str {
    let trimmed = s.trim();
    let Some(first) = trimmed.chars().next() else {
        return s;
    };
    let Some(close) = closer_for(first, pairs) else {
        return s;
    };
    if !trimmed.ends_with(close) {
        return s;
    }

    match matching_close(trimmed, pairs) {
        Some(end) if end + close.len_utf8() == trimmed.len() => &trimmed[first.len_utf8()..end],
        _ => s,
    }
}

struct Frame {
    closer: Option<char>,
    slot: usize,
    text: String,
}

/// Extract the text framed by every bracket pair, outer blocks first.
///
/// The first entry is the top level of `s` itself. Each later entry is the
/// inside of one bracket pair, emitted in the order its opening bracket was
/// seen (pre-order). Nested groups are cut out of the text of their parent,
/// so `a Content={b}` yields `["a Content=", "b"]`.
pub fn extract_enclosed_substrings(s: &str, pairs: &[EnclosurePair]) -> Result<Vec<String>> {
    let mut out = vec![String::new()];
    let mut stack = vec![Frame {
        closer: None,
        slot: 0,
        text: String::new(),
    }];
    let mut in_quote = false;

    for ch in s.chars() {
        if ch == QUOTE {
            in_quote = !in_quote;
        } else if !in_quote {
            if let Some(close) = closer_for(ch, pairs) {
                stack.push(Frame {
                    closer: Some(close),
                    slot: out.len(),
                    text: String::new(),
                });
                out.push(String::new());
                continue;
            }
            if is_closer(ch, pairs) {
                let top_closer = stack.last().and_then(|frame| frame.closer);
                if top_closer != Some(ch) {
                    return Err(CipError::UnbalancedEnclosure(format!(
                        "unexpected '{}' in {}",
                        ch, s
                    )));
                }
                if let Some(frame) = stack.pop() {
                    out[frame.slot] = frame.text;
                }
                continue;
            }
        }

        if let Some(frame) = stack.last_mut() {
            frame.text.push(ch);
        }
    }

    if in_quote {
        return Err(CipError::UnterminatedQuote(s.to_string()));
    }
    if stack.len() > 1 {
        return Err(CipError::UnbalancedEnclosure(format!(
            "{} unclosed bracket(s) in {}",
            stack.len() - 1,
            s
        )));
    }
    if let Some(root) = stack.pop() {
        out[root.slot] = root.text;
    }

    Ok(out)
}

fn split_outside_quotes(s: &str, is_delimiter: impl Fn(char) -> bool) -> Result<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quote = false;

    for (pos, ch) in s.char_indices() {
        if ch == QUOTE {
            in_quote = !in_quote;
        } else if !in_quote && is_delimiter(ch) {
            pieces.push(&s[start..pos]);
            start = pos + ch.len_utf8();
        }
    }

    if in_quote {
        return Err(CipError::UnterminatedQuote(s.to_string()));
    }
    pieces.push(&s[start..]);

    Ok(pieces)
}

/// Split on `delimiter`, leaving delimiters inside `"…"` alone. Pieces are trimmed.
pub fn split_respecting_quotes(s: &str, delimiter: char) -> Result<Vec<&str>> {
    Ok(split_outside_quotes(s, |ch| ch == delimiter)?
        .into_iter()
        .map(str::trim)
        .collect())
}

/// Split on runs of whitespace outside quotes, dropping empty tokens.
pub fn split_tokens(s: &str) -> Result<Vec<&str>> {
    Ok(split_outside_quotes(s, char::is_whitespace)?
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect())
}
