//! Uninitialized-variable repair: default initializers for declarations that lack one,
//! declarations for assignments that lack one, and a final sweep for stragglers.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::decls::{ShaderIndex, brace_delta};
use super::infer::infer_variable_type;
use super::text::{is_assigned, is_used, leading_indent};
use super::types::{GlslType, RepairOptions, RepairReport, RepairState};
use super::vocab::{BuiltinKind, builtin_kind, is_control_keyword, is_qualifier};

fn chain_tail_regex() -> &'static Regex {
    static CHAIN_TAIL: OnceLock<Regex> = OnceLock::new();
    CHAIN_TAIL.get_or_init(|| {
        Regex::new(r",\s+([A-Za-z_]\w*)\s*;").expect("Invalid chain declaration regex")
    })
}

fn standalone_regex() -> &'static Regex {
    static STANDALONE: OnceLock<Regex> = OnceLock::new();
    STANDALONE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_]\w*)\s*;").expect("Invalid standalone declaration regex")
    })
}

fn explicit_decl_regex() -> &'static Regex {
    static EXPLICIT_DECL: OnceLock<Regex> = OnceLock::new();
    EXPLICIT_DECL.get_or_init(|| {
        Regex::new(r"\b(vec[234]|mat[234]|float|int|bool)\s+([A-Za-z_]\w*)\s*;")
            .expect("Invalid explicit declaration regex")
    })
}

fn line_type_regex() -> &'static Regex {
    static LINE_TYPE: OnceLock<Regex> = OnceLock::new();
    LINE_TYPE.get_or_init(|| {
        Regex::new(r"\b(vec[234]|mat[234]|float|int|bool)\s+\w+")
            .expect("Invalid declaration type regex")
    })
}

fn bare_assignment_regex() -> &'static Regex {
    static BARE_ASSIGNMENT: OnceLock<Regex> = OnceLock::new();
    BARE_ASSIGNMENT.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_]\w*)\s*=\s*([^;]+);").expect("Invalid assignment regex")
    })
}

/// Give default initializers to the three declaration shapes that can reach the compiler
/// uninitialized: `, name;` chain tails, bare `name;` lines and `type name;` declarations.
pub fn initialize_declarations(
    lines: &[String],
    options: &RepairOptions,
    state: &mut RepairState,
    report: &mut RepairReport,
) -> Vec<String> {
    let index = ShaderIndex::build(lines, &options.entry_point);
    let code = lines.join("\n");
    let mut out = lines.to_vec();

    for i in 0..out.len() {
        if out[i].trim().is_empty() {
            continue;
        }

        if let Some(caps) = chain_tail_regex().captures(&out[i]) {
            let name = caps[1].to_string();
            let span = caps.get(0).map_or(0..0, |m| m.range());
            if is_assigned(&out[i], &name) {
                continue;
            }
            let ty = line_type_regex()
                .captures(&out[i])
                .and_then(|c| GlslType::from_keyword(&c[1]))
                .unwrap_or_else(|| infer_variable_type(&name, &code, &out, i).ty);
            out[i].replace_range(span, &format!(", {name} = {};", ty.zero_value()));
            state.record(&name, ty);
            report.chain_initialized += 1;
            continue;
        }

        if let Some(caps) = standalone_regex().captures(&out[i]) {
            let name = caps[1].to_string();
            let end = caps.get(0).map_or(0, |m| m.end());
            if is_control_keyword(&name) || index.belongs_to_other_scope(&name, i) {
                continue;
            }
            if is_used(&code, &name) {
                let inferred = infer_variable_type(&name, &code, &out, i);
                let rewritten = format!(
                    "{}{name} = {};{}",
                    leading_indent(&out[i]),
                    inferred.zero_value(),
                    &out[i][end..]
                );
                debug!("initialized `{name}` as {} ({:?})", inferred.ty, inferred.evidence);
                out[i] = rewritten;
                state.record(&name, inferred.ty);
                report.standalone_initialized += 1;
            }
            continue;
        }

        if let Some(caps) = explicit_decl_regex().captures(&out[i]) {
            let (Some(whole), Some(ty)) = (caps.get(0), GlslType::from_keyword(&caps[1])) else {
                continue;
            };
            let name = caps[2].to_string();
            if index.decls.in_struct(i)
                || has_qualifier_before(&out[i][..whole.start()])
                || index.belongs_to_other_scope(&name, i)
            {
                continue;
            }
            let span = whole.range();
            if lines[i + 1..].iter().any(|l| is_used(l, &name)) {
                out[i].replace_range(span, &format!("{ty} {name} = {};", ty.zero_value()));
                state.record(&name, ty);
                report.declarations_initialized += 1;
            }
        }
    }

    out
}

/// Handle bare `name = value;` lines whose target was never declared before them.
///
/// Inside a helper function, an assignment to a variable that belongs to the entry function is
/// dropped. Every other undeclared target gets a declaration typed from its value. When the
/// assignment sits in a nested block, a zero-initialized declaration is inserted at the top of
/// the function body instead and the assignment is kept. Blank lines are removed afterwards.
pub fn resolve_undeclared_assignments(
    lines: &[String],
    options: &RepairOptions,
    report: &mut RepairReport,
) -> Vec<String> {
    let index = ShaderIndex::build(lines, &options.entry_point);
    let mut out = lines.to_vec();
    // Declarations synthesized here, keyed by name, with the signature line of their scope.
    let mut synthesized: HashMap<String, Option<usize>> = HashMap::new();
    // Declarations to insert, keyed by the line they go before.
    let mut hoisted: Vec<(usize, String)> = Vec::new();

    for (i, line) in out.iter_mut().enumerate() {
        let Some(caps) = bare_assignment_regex().captures(line) else {
            continue;
        };
        let name = caps[1].to_string();
        let value = caps[2].to_string();
        let end = caps.get(0).map_or(0, |m| m.end());

        if is_control_keyword(&name)
            || value.starts_with('=')
            || index.decls.is_continuation(i)
            || index.declared_in_scope(&name, i)
            || builtin_kind(&name) == Some(BuiltinKind::Uniform)
        {
            continue;
        }
        let scope = index.scopes.locate(i).start;
        if synthesized.get(&name) == Some(&scope) {
            continue;
        }

        if index.owned_by_entry(&name, i) {
            debug!("dropped assignment to `{name}` outside the entry function");
            line.clear();
            report.assignments_dropped += 1;
            continue;
        }

        let ty = GlslType::from_initializer(&value);
        match nested_block_top(&index, lines, i) {
            Some((at, indent)) => {
                debug!("hoisted declaration of `{name}` out of a nested block");
                hoisted.push((at, format!("{indent}{ty} {name} = {};", ty.zero_value())));
            }
            None => {
                *line = format!("{}{ty} {name} = {value};{}", leading_indent(line), &line[end..]);
            }
        }
        synthesized.insert(name, scope);
        report.assignments_declared += 1;
    }

    for (at, declaration) in hoisted.into_iter().rev() {
        out.insert(at, declaration);
    }
    out.retain(|line| !line.trim().is_empty());
    out
}

/// For a line nested deeper than the body of its function, the line just after the body's
/// opening brace and the indentation of the body's first statement.
fn nested_block_top(index: &ShaderIndex, lines: &[String], line: usize) -> Option<(usize, String)> {
    let f = index.scopes.owner(line).filter(|f| f.body.contains(&line))?;
    let depth: i32 = lines[f.line..line].iter().map(|l| brace_delta(l)).sum();
    if depth <= 1 {
        return None;
    }
    let open = (f.line..line).find(|&j| lines[j].contains('{'))?;
    let indent = lines[open + 1..=line]
        .iter()
        .find(|l| !l.trim().is_empty())
        .map_or("    ", |l| leading_indent(l));
    Some((open + 1, indent.to_string()))
}

/// Second pass over bare `name;` lines that are still used but never assigned anywhere.
pub fn sweep_standalone(
    lines: &[String],
    options: &RepairOptions,
    state: &mut RepairState,
    report: &mut RepairReport,
) -> Vec<String> {
    let index = ShaderIndex::build(lines, &options.entry_point);
    let code = lines.join("\n");
    let mut out = lines.to_vec();

    for i in 0..out.len() {
        let Some(caps) = standalone_regex().captures(&out[i]) else {
            continue;
        };
        let name = caps[1].to_string();
        let end = caps.get(0).map_or(0, |m| m.end());

        if is_control_keyword(&name)
            || state.contains(&name)
            || index.belongs_to_other_scope(&name, i)
            || !is_used(&code, &name)
            || is_assigned(&code, &name)
        {
            continue;
        }

        let inferred = infer_variable_type(&name, &code, &out, i);
        out[i] = format!(
            "{}{name} = {};{}",
            leading_indent(&out[i]),
            inferred.zero_value(),
            &out[i][end..]
        );
        state.record(&name, inferred.ty);
        report.sweep_initialized += 1;
    }

    out
}

/// Whether the text before a declaration ends in a storage qualifier (`uniform float t;`).
fn has_qualifier_before(prefix: &str) -> bool {
    prefix
        .split_whitespace()
        .next_back()
        .is_some_and(is_qualifier)
}
