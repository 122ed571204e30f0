//! Repairs raw control characters inside JSON string literals.
//!
//! Export tools frequently dump shader code into the container without escaping line breaks
//! or tabs, which makes the document invalid JSON. This pass rewrites those bytes into JSON
//! escapes while leaving everything outside string literals untouched.

/// Escape control bytes (< 0x20) that appear inside JSON string literals.
///
/// - A `"` toggles the in-string state only when preceded by an even number of backslashes.
/// - A backslash marks the following byte as escape-consumed; it is copied verbatim, except for
///   a control byte inside a string, which is turned into the escape letter so the pending
///   backslash completes a valid escape (`\` + LF becomes `\n`).
/// - Inside strings: LF -> `\n`, CR -> `\r`, TAB -> `\t`, other control bytes -> `\u00XX`.
///
/// Never fails. Unbalanced quoting simply keeps the last known state.
pub fn escape_control_chars_in_strings(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 16);
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &byte) in input.iter().enumerate() {
        if escape_next {
            escape_next = false;
            if in_string && byte < 0x20 {
                push_control_escape(&mut out, byte, false);
            } else {
                out.push(byte);
            }
            continue;
        }

        match byte {
            b'\\' => {
                out.push(byte);
                escape_next = true;
            }
            b'"' => {
                let backslashes = input[..i]
                    .iter()
                    .rev()
                    .take_while(|&&b| b == b'\\')
                    .count();
                if backslashes % 2 == 0 {
                    in_string = !in_string;
                }
                out.push(byte);
            }
            _ if in_string && byte < 0x20 => push_control_escape(&mut out, byte, true),
            _ => out.push(byte),
        }
    }

    out
}

fn push_control_escape(out: &mut Vec<u8>, byte: u8, with_backslash: bool) {
    if with_backslash {
        out.push(b'\\');
    }
    match byte {
        b'\n' => out.push(b'n'),
        b'\r' => out.push(b'r'),
        b'\t' => out.push(b't'),
        other => out.extend_from_slice(format!("u{other:04x}").as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(s: &str) -> String {
        String::from_utf8(escape_control_chars_in_strings(s.as_bytes())).unwrap()
    }

    #[test]
    fn escapes_line_breaks_inside_strings() {
        assert_eq!(
            escape("{\"code\": \"a\nb\r\tc\"}"),
            "{\"code\": \"a\\nb\\r\\tc\"}"
        );
    }

    #[test]
    fn leaves_whitespace_outside_strings_alone() {
        let src = "{\n\t\"a\": 1,\n\t\"b\": \"x\"\n}";
        assert_eq!(escape(src), src);
    }

    #[test]
    fn other_control_bytes_use_unicode_escape() {
        assert_eq!(escape("\"\x01\x1b\""), "\"\\u0001\\u001b\"");
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        // `\"` inside the string keeps us in-string, so the newline is still escaped.
        assert_eq!(escape("\"say \\\"hi\n\""), "\"say \\\"hi\\n\"");
    }

    #[test]
    fn double_backslash_before_quote_closes_string() {
        assert_eq!(escape("\"a\\\\\"\n"), "\"a\\\\\"\n");
    }

    #[test]
    fn backslash_line_break_becomes_escape() {
        assert_eq!(escape("\"a\\\nb\""), "\"a\\nb\"");
    }

    #[test]
    fn unbalanced_quote_degrades_gracefully() {
        assert_eq!(escape("\"open\nstill"), "\"open\\nstill");
    }
}
