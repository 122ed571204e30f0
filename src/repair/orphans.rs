//! Removal of assignments that reference names nothing declares.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::decls::ShaderIndex;
use super::text::{identifier_tokens, leading_identifier, split_top_level_commas};
use super::types::{RepairOptions, RepairReport};
use super::vocab::{builtin_kind, is_control_keyword};

fn assignment_regex() -> &'static Regex {
    static ASSIGNMENT: OnceLock<Regex> = OnceLock::new();
    ASSIGNMENT.get_or_init(|| {
        Regex::new(
            r"^\s*(?:const\s+)?(?:(vec[234]|mat[234]|float|int|bool)\s+)?([A-Za-z_]\w*)\s*=\s*([^;]+);",
        )
        .expect("Invalid assignment regex")
    })
}

/// Drop assignment lines whose right-hand side references a name that is neither declared
/// above the line, a parameter, nor a built-in.
///
/// Bare assignments are only inspected when their target is itself undeclared. Typed
/// declarations have every initializer inspected; earlier declarators of the same statement
/// count as declared.
pub fn remove_orphaned_assignments(
    lines: &[String],
    options: &RepairOptions,
    report: &mut RepairReport,
) -> Vec<String> {
    let index = ShaderIndex::build(lines, &options.entry_point);
    let mut out = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        if is_orphaned(&index, line, i) {
            debug!("removed orphaned assignment: {}", line.trim());
            report.orphans_removed += 1;
            continue;
        }
        out.push(line.clone());
    }

    out
}

fn is_orphaned(index: &ShaderIndex, line: &str, i: usize) -> bool {
    let Some(caps) = assignment_regex().captures(line) else {
        return false;
    };

    if let Some(ty) = caps.get(1) {
        let stmt = &line[ty.end()..];
        let stmt = stmt.split(';').next().unwrap_or(stmt);
        let mut locals: Vec<&str> = Vec::new();
        for declarator in split_top_level_commas(stmt) {
            let Some(target) = leading_identifier(declarator) else {
                continue;
            };
            locals.push(target);
            let Some((_, expr)) = declarator.split_once('=') else {
                continue;
            };
            if has_unresolved_token(index, expr, &locals, i) {
                return true;
            }
        }
        return false;
    }

    let target = &caps[2];
    if is_control_keyword(target)
        || caps[3].starts_with('=')
        || index.decls.is_continuation(i)
        || index.decls.declared_before(target, i)
    {
        return false;
    }
    has_unresolved_token(index, &caps[3], &[target], i)
}

fn has_unresolved_token(index: &ShaderIndex, expr: &str, locals: &[&str], line: usize) -> bool {
    identifier_tokens(expr).into_iter().any(|token| {
        !locals.contains(&token)
            && builtin_kind(token).is_none()
            && !index.types.is_type(token)
            && !index.decls.declared_before(token, line)
    })
}
