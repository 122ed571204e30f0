//! Comment stripping for shader text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentState {
    Normal,
    InBlockComment,
}

/// Remove `//` and `/* */` comments, line by line.
///
/// A line is kept when something other than whitespace survives, or when a block comment is
/// still open at its end (so the block's span keeps occupying lines). Every kept line is
/// terminated by `\n`. String literals are not recognised; shader code has none.
pub fn strip_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut state = CommentState::Normal;

    for line in code.split('\n') {
        let bytes = line.as_bytes();
        let mut kept = String::with_capacity(line.len());
        let mut copy_from = 0;
        let mut i = 0;

        while i < bytes.len() {
            let pair = (bytes[i], bytes.get(i + 1).copied());
            match state {
                CommentState::InBlockComment => {
                    if pair == (b'*', Some(b'/')) {
                        state = CommentState::Normal;
                        i += 2;
                        copy_from = i;
                    } else {
                        i += 1;
                    }
                }
                CommentState::Normal => match pair {
                    (b'/', Some(b'*')) => {
                        kept.push_str(&line[copy_from..i]);
                        state = CommentState::InBlockComment;
                        i += 2;
                    }
                    (b'/', Some(b'/')) => break,
                    _ => i += 1,
                },
            }
        }
        if state == CommentState::Normal {
            kept.push_str(&line[copy_from..i]);
        }

        if !kept.trim().is_empty() || state == CommentState::InBlockComment {
            out.push_str(&kept);
            out.push('\n');
        }
    }

    out
}
