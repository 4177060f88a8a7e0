//! Placeholder substitution.
//!
//! Statements are written with positional `?` placeholders. Dialects whose drivers want
//! numbered placeholders (`PostgreSQL`'s `$1`) get them rewritten here, skipping quoted
//! strings, quoted identifiers, comments, and dollar-quoted blocks.

use std::borrow::Cow;

mod scanner;

use scanner::{
    State, is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    scan_digits, try_start_dollar_quote,
};

use crate::types::DriverKind;

/// Placeholder syntax a driver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (`MySQL`, `SQLite`).
    Positional,
    /// `$1`, `$2`, ... (`PostgreSQL`).
    Numbered,
}

impl PlaceholderStyle {
    #[must_use]
    pub fn for_driver(kind: DriverKind) -> Self {
        match kind {
            DriverKind::Postgresql => PlaceholderStyle::Numbered,
            DriverKind::Mysql | DriverKind::Sqlite => PlaceholderStyle::Positional,
        }
    }
}

/// Rewrite `?` placeholders for `target`.
///
/// With [`PlaceholderStyle::Numbered`], a bare `?` becomes `$k` where `k` counts bare
/// placeholders from 1, and an explicit `?N` becomes `$N`. `Positional` leaves the text alone.
///
/// Note: `PostgreSQL` JSON operators spelled `?`, `?|` and `?&` are indistinguishable from
/// placeholders here; write them as `jsonb_exists(..)` and friends instead.
///
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    if target == PlaceholderStyle::Positional {
        return Cow::Borrowed(sql);
    }

    let mut out: Option<String> = None;
    // start of the not-yet-copied tail of `sql`
    let mut copied_to = 0;
    let mut next_positional = 1usize;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    }
                }
                b'?' => {
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[copied_to..idx]);
                    buf.push('$');
                    if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                        buf.push_str(digits);
                        idx = digits_end - 1;
                    } else {
                        buf.push_str(&next_positional.to_string());
                        next_positional += 1;
                    }
                    copied_to = idx + 1;
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }

        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}
