//! Word-boundary aware scanning helpers over shader text.
//!
//! Identifiers coming out of the line patterns are plain `[A-Za-z_]\w*` words, so these
//! helpers work on bytes instead of compiling a regex per identifier.

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offsets where `word` occurs as a whole identifier.
pub fn word_positions<'a>(text: &'a str, word: &'a str) -> impl Iterator<Item = usize> + 'a {
    let bytes = text.as_bytes();
    text.match_indices(word).filter_map(move |(pos, _)| {
        let end = pos + word.len();
        let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
        let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
        (before_ok && after_ok).then_some(pos)
    })
}

pub fn contains_word(text: &str, word: &str) -> bool {
    word_positions(text, word).next().is_some()
}

/// Whether `name` takes part in an expression: followed by whitespace, a member access, an
/// arithmetic operator, `=` or `)`, or preceded by `(`.
pub fn is_used(text: &str, name: &str) -> bool {
    let bytes = text.as_bytes();
    word_positions(text, name).any(|pos| {
        let end = pos + name.len();
        let next = bytes.get(end).copied();
        let prev = pos.checked_sub(1).map(|p| bytes[p]);
        matches!(
            next,
            Some(b' ' | b'\t' | b'.' | b'+' | b'-' | b'*' | b'/' | b'=' | b')')
        ) || prev == Some(b'(')
    })
}

/// Whether `text` contains a plain assignment `name = ...` (not `==`).
pub fn is_assigned(text: &str, name: &str) -> bool {
    word_positions(text, name).any(|pos| assignment_op_at(text, pos + name.len(), false))
}

/// Whether `text` assigns to `name` with `=` or a compound operator.
pub fn is_assigned_any(text: &str, name: &str) -> bool {
    word_positions(text, name).any(|pos| assignment_op_at(text, pos + name.len(), true))
}

fn assignment_op_at(text: &str, from: usize, allow_compound: bool) -> bool {
    let rest = text[from..].trim_start_matches([' ', '\t']).as_bytes();
    let rest = match rest.first() {
        Some(b'+' | b'-' | b'*' | b'/') if allow_compound => &rest[1..],
        _ => rest,
    };
    rest.first() == Some(&b'=') && rest.get(1) != Some(&b'=')
}

/// Member names accessed on `name`, e.g. `["xy", "z"]` for `p.xy + p.z`.
pub fn member_accesses<'a>(text: &'a str, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let bytes = text.as_bytes();
    word_positions(text, name).filter_map(move |pos| {
        let dot = pos + name.len();
        if bytes.get(dot) != Some(&b'.') {
            return None;
        }
        let start = dot + 1;
        let len = bytes[start..]
            .iter()
            .take_while(|&&b| is_ident_byte(b))
            .count();
        (len > 0).then(|| &text[start..start + len])
    })
}

/// Identifier tokens in an expression, skipping numeric literals and member accesses.
pub fn identifier_tokens(expr: &str) -> Vec<&str> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !is_ident_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_ident_byte(bytes[i]) {
            i += 1;
        }
        let after_dot = start > 0 && bytes[start - 1] == b'.';
        if !bytes[start].is_ascii_digit() && !after_dot {
            tokens.push(&expr[start..i]);
        }
    }
    tokens
}

pub fn leading_indent(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Split a declaration statement on commas that are not nested in `()` or `[]`.
pub fn split_top_level_commas(stmt: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, c) in stmt.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&stmt[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&stmt[start..]);
    parts
}

/// Leading identifier of a declarator such as `a = 1.0` or `arr[3]`.
pub fn leading_identifier(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    if !bytes.first().is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') {
        return None;
    }
    let len = bytes.iter().take_while(|&&b| is_ident_byte(b)).count();
    Some(&s[..len])
}
