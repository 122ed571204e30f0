//! Initializes repaired variables ahead of `for` loops that read them before any assignment.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::decls::ShaderIndex;
use super::text::{is_assigned, is_used, leading_indent};
use super::types::{RepairOptions, RepairReport, RepairState};

fn for_header_regex() -> &'static Regex {
    static FOR_HEADER: OnceLock<Regex> = OnceLock::new();
    FOR_HEADER.get_or_init(|| Regex::new(r"\bfor\s*\(").expect("Invalid for-loop regex"))
}

/// For each loop, insert `name = <zero>;` before the header for every recorded variable the
/// body references that nothing assigns earlier in the text and that is declared in the
/// header's scope. Loops are visited last to first so earlier offsets stay valid.
///
/// The pass only runs when the text contains a `for(` token. Headers written `for (` are still
/// visited once it runs.
pub fn preinitialize_loop_variables(
    code: &str,
    options: &RepairOptions,
    state: &RepairState,
    report: &mut RepairReport,
) -> String {
    if state.is_empty() || !code.contains("for(") {
        return code.to_string();
    }

    let lines: Vec<&str> = code.lines().collect();
    let index = ShaderIndex::build(&lines, &options.entry_point);
    let starts: Vec<usize> = for_header_regex().find_iter(code).map(|m| m.start()).collect();
    let mut out = code.to_string();

    for start in starts.into_iter().rev() {
        let Some(body) = loop_body(&out, start) else {
            continue;
        };
        let header_line = code[..start].matches('\n').count();
        let before = &out[..start];
        let body_text = &out[body];

        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let indent = leading_indent(&out[line_start..]).to_string();

        let mut prelude = String::new();
        for (name, ty) in state.iter() {
            if is_used(body_text, name)
                && !is_assigned(before, name)
                && index.declared_in_scope(name, header_line)
            {
                prelude.push_str(&format!("{name} = {};\n{indent}", ty.zero_value()));
                report.loop_inits_inserted += 1;
            }
        }
        if !prelude.is_empty() {
            out.insert_str(start, &prelude);
        }
    }

    out
}

/// Span of the loop body following the `for (...)` header that starts at `start`: the balanced
/// `{}` block, or the single statement through its `;`.
fn loop_body(code: &str, start: usize) -> Option<Range<usize>> {
    let bytes = code.as_bytes();
    let open_paren = start + code[start..].find('(')?;
    let close_paren = matching(bytes, open_paren, b'(', b')')?;

    let body_start = close_paren
        + 1
        + bytes[close_paren + 1..]
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
    match bytes.get(body_start) {
        Some(b'{') => matching(bytes, body_start, b'{', b'}').map(|end| body_start..end + 1),
        Some(_) => {
            let end = code[body_start..]
                .find(';')
                .map_or(code.len(), |i| body_start + i + 1);
            Some(body_start..end)
        }
        None => None,
    }
}

/// Index of the delimiter closing the one at `open`.
fn matching(bytes: &[u8], open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::types::GlslType;

    fn state(entries: &[(&str, GlslType)]) -> RepairState {
        let mut state = RepairState::default();
        for (name, ty) in entries {
            state.record(name, *ty);
        }
        state
    }

    fn run(code: &str, st: &RepairState) -> (String, RepairReport) {
        let mut report = RepairReport::default();
        let out = preinitialize_loop_variables(code, &RepairOptions::default(), st, &mut report);
        (out, report)
    }

    #[test]
    fn inserts_before_header_with_same_indent() {
        let code = "void f() {\n    float acc;\n    for(int i = 0; i < 4; i++) {\n        acc += 1.0;\n    }\n}";
        let (out, report) = run(code, &state(&[("acc", GlslType::Float)]));
        assert_eq!(
            out,
            "void f() {\n    float acc;\n    acc = 0.0;\n    for(int i = 0; i < 4; i++) {\n        acc += 1.0;\n    }\n}"
        );
        assert_eq!(report.loop_inits_inserted, 1);
    }

    #[test]
    fn already_assigned_variables_are_skipped() {
        let code = "float i = .2, a = 0.0;\nfor(int j=0;j<8;j++){ a += i; }";
        let (out, report) = run(code, &state(&[("a", GlslType::Float)]));
        assert_eq!(out, code);
        assert_eq!(report.loop_inits_inserted, 0);
    }

    #[test]
    fn each_loop_gets_its_own_init_in_state_order() {
        let code = "vec2 w;\nvec4 q;\nfor(int i=0;i<2;i++){ w += q * 2.0; }\nfor(int j=0;j<2;j++) w += 1.0;";
        let st = state(&[("w", GlslType::Vec2), ("q", GlslType::Vec4)]);
        let (out, report) = run(code, &st);
        assert_eq!(
            out,
            "vec2 w;\nvec4 q;\nq = vec4(0.0);\nw = vec2(0.0);\nfor(int i=0;i<2;i++){ w += q * 2.0; }\nw = vec2(0.0);\nfor(int j=0;j<2;j++) w += 1.0;"
        );
        assert_eq!(report.loop_inits_inserted, 3);
    }

    #[test]
    fn body_scope_is_the_balanced_block() {
        let code = "vec2 w;\nfor(int i=0;i<2;i++){ x += 1.0; }\nw += x;";
        let (out, _) = run(code, &state(&[("w", GlslType::Vec2)]));
        assert_eq!(out, code);
    }

    #[test]
    fn spaced_headers_alone_do_not_trigger_the_pass() {
        let code = "void f() {\n    vec2 w;\n    for (int i = 0; i < 4; i++) {\n        w += 1.0;\n    }\n}";
        let (out, report) = run(code, &state(&[("w", GlslType::Vec2)]));
        assert_eq!(out, code);
        assert_eq!(report.loop_inits_inserted, 0);
    }

    #[test]
    fn spaced_headers_are_visited_once_the_pass_runs() {
        let code = "vec2 w;\nfor (int i = 0; i < 4; i++) { w += 1.0; }\nfor(;;) { }";
        let (out, report) = run(code, &state(&[("w", GlslType::Vec2)]));
        assert_eq!(
            out,
            "vec2 w;\nw = vec2(0.0);\nfor (int i = 0; i < 4; i++) { w += 1.0; }\nfor(;;) { }"
        );
        assert_eq!(report.loop_inits_inserted, 1);
    }

    #[test]
    fn variables_of_other_functions_are_not_initialized() {
        let code = "\
float g(float k) {
    for(int i = 0; i < 2; i++) { k += w.x; }
    return k;
}
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 w;
    for(int i = 0; i < 2; i++) { w += fragCoord; }
    fragColor = vec4(w, 0.0, 1.0);
}";
        let (out, report) = run(code, &state(&[("w", GlslType::Vec2)]));
        assert_eq!(report.loop_inits_inserted, 1);
        assert!(out.contains("    vec2 w;\n    w = vec2(0.0);\n    for(int i = 0; i < 2; i++) { w += fragCoord; }"));
        assert!(out.starts_with("float g(float k) {\n    for(int i"));
    }

    #[test]
    fn no_loops_or_no_state_is_a_no_op() {
        let st = state(&[("a", GlslType::Float)]);
        assert_eq!(run("a += 1.0;", &st).0, "a += 1.0;");
        let (out, report) = run("for(;;){ a += 1.0; }", &RepairState::default());
        assert_eq!(out, "for(;;){ a += 1.0; }");
        assert_eq!(report.total(), 0);
    }
}
