//! Per-line index of declared names.
//!
//! Covers typed declarations (including every declarator of a comma chain, across lines),
//! function parameters, function names, struct names and `#define` macros.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::scope::{FunctionScopes, signature_name};
use super::text::{leading_identifier, split_top_level_commas};
use super::vocab::{TypeNames, is_control_keyword, is_qualifier};

fn typed_pair_regex() -> &'static Regex {
    static TYPED_PAIR: OnceLock<Regex> = OnceLock::new();
    TYPED_PAIR.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_]\w*)\s+([A-Za-z_]\w*)\s*(?:[=;,)\[]|$)")
            .expect("Invalid typed declaration regex")
    })
}

fn define_regex() -> &'static Regex {
    static DEFINE: OnceLock<Regex> = OnceLock::new();
    DEFINE.get_or_init(|| {
        Regex::new(r"^\s*#\s*define\s+([A-Za-z_]\w*)").expect("Invalid #define regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainRole {
    #[default]
    None,
    /// Typed statement whose declarator list continues on the next line.
    Head,
    /// Line that carries further declarators of a chain started above.
    Continuation,
}

#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    declared: Vec<HashSet<String>>,
    roles: Vec<ChainRole>,
    struct_body: Vec<bool>,
}

impl DeclarationIndex {
    pub fn build<S: AsRef<str>>(lines: &[S], types: &TypeNames) -> Self {
        let mut declared = Vec::with_capacity(lines.len());
        let mut roles = Vec::with_capacity(lines.len());
        let mut struct_body = Vec::with_capacity(lines.len());

        let mut chain_open = false;
        // `(`/`[` nesting a declaration statement left open at the end of the previous line.
        let mut open_depth: i32 = 0;
        let mut struct_depth: Option<i32> = None;

        for line in lines {
            let line = line.as_ref();
            let trimmed = line.trim();
            let mut names = HashSet::new();

            // A struct body runs from `struct X {` to its matching `}`.
            let in_struct = struct_depth.is_some();
            if let Some(depth) = struct_depth.as_mut() {
                *depth += brace_delta(line);
                if *depth <= 0 {
                    struct_depth = None;
                }
            } else if trimmed.starts_with("struct ") || trimmed == "struct" {
                let depth = brace_delta(line);
                if depth > 0 {
                    struct_depth = Some(depth);
                }
            }
            struct_body.push(in_struct);

            if trimmed.is_empty() {
                // Blank lines neither open nor close a chain.
                roles.push(ChainRole::None);
                declared.push(names);
                continue;
            }

            if open_depth > 0 {
                // Wrapped call arguments of a declarator above. Only declarators that follow
                // once the nesting closes count.
                let stmt = statement(line);
                let (depth, closed_at) = nesting(stmt, open_depth);
                if let Some(end) = closed_at {
                    names.extend(declarator_names(
                        split_top_level_commas(&stmt[end..]).into_iter().skip(1),
                    ));
                }
                // A `;` ends the statement even when the brackets never balanced.
                open_depth = if stmt.len() < line.len() { 0 } else { depth };
                chain_open = open_depth == 0 && trimmed.ends_with(',');
                roles.push(ChainRole::None);
                declared.push(names);
                continue;
            }

            for caps in typed_pair_regex().captures_iter(line) {
                if types.is_type(&caps[1]) && !is_control_keyword(&caps[2]) {
                    names.insert(caps[2].to_string());
                }
            }
            if let Some(name) = signature_name(line, types) {
                names.insert(name.to_string());
            }
            if let Some(caps) = define_regex().captures(line) {
                names.insert(caps[1].to_string());
            }
            if let Some(name) = trimmed
                .split_whitespace()
                .skip_while(|w| *w != "struct")
                .nth(1)
                .and_then(leading_identifier)
            {
                names.insert(name.to_string());
            }

            let declaration = if chain_open {
                Some((ChainRole::Continuation, line))
            } else {
                typed_statement_rest(line, types).map(|rest| (ChainRole::Head, rest))
            };

            let role = match declaration {
                Some((role, rest)) => {
                    names.extend(declarators(rest));
                    open_depth = nesting(statement(rest), 0).0;
                    chain_open = open_depth == 0 && trimmed.ends_with(',');
                    match role {
                        ChainRole::Head if !chain_open => ChainRole::None,
                        role => role,
                    }
                }
                None => {
                    chain_open = false;
                    ChainRole::None
                }
            };

            roles.push(role);
            declared.push(names);
        }

        Self {
            declared,
            roles,
            struct_body,
        }
    }

    pub fn declares(&self, line: usize, name: &str) -> bool {
        self.declared.get(line).is_some_and(|set| set.contains(name))
    }

    /// Whether `name` is declared on any line inside `range`.
    pub fn declared_in(&self, name: &str, range: Range<usize>) -> bool {
        let end = range.end.min(self.declared.len());
        let start = range.start.min(end);
        self.declared[start..end].iter().any(|set| set.contains(name))
    }

    /// Whether `name` is declared on a line strictly before `line`.
    pub fn declared_before(&self, name: &str, line: usize) -> bool {
        self.declared_in(name, 0..line)
    }

    pub fn role(&self, line: usize) -> ChainRole {
        self.roles.get(line).copied().unwrap_or_default()
    }

    pub fn is_continuation(&self, line: usize) -> bool {
        self.role(line) == ChainRole::Continuation
    }

    pub fn in_struct(&self, line: usize) -> bool {
        self.struct_body.get(line).copied().unwrap_or(false)
    }
}

/// Type names, function scopes and declarations of one snapshot of the shader lines.
#[derive(Debug, Clone)]
pub struct ShaderIndex {
    pub types: TypeNames,
    pub scopes: FunctionScopes,
    pub decls: DeclarationIndex,
}

impl ShaderIndex {
    pub fn build<S: AsRef<str>>(lines: &[S], entry_point: &str) -> Self {
        let types = TypeNames::collect(lines);
        let scopes = FunctionScopes::build(lines, &types, entry_point);
        let decls = DeclarationIndex::build(lines, &types);
        Self {
            types,
            scopes,
            decls,
        }
    }

    /// Whether `name` on `line` refers to a variable owned by another scope: the line sits in a
    /// helper function while `name` is declared in the entry function or at file scope.
    pub fn belongs_to_other_scope(&self, name: &str, line: usize) -> bool {
        if !self.scopes.in_helper_function(line) {
            return false;
        }
        let in_entry = self
            .scopes
            .entry()
            .is_some_and(|entry| self.decls.declared_in(name, entry.body.clone()));
        let at_file_scope = self
            .scopes
            .first_function_line()
            .is_some_and(|first| self.decls.declared_in(name, 0..first));
        in_entry || at_file_scope
    }

    /// Whether `name` is visible at `line`: declared earlier in the function enclosing the line,
    /// or on a file-scope line above it. Function names count wherever they are defined above.
    pub fn declared_in_scope(&self, name: &str, line: usize) -> bool {
        if let Some(f) = self.scopes.owner(line).filter(|f| f.body.contains(&line)) {
            if self.decls.declared_in(name, f.line..line) {
                return true;
            }
        }
        let is_function = self
            .scopes
            .functions()
            .iter()
            .any(|f| f.line < line && f.name == name);
        is_function
            || (0..line).any(|l| !self.scopes.in_function_body(l) && self.decls.declares(l, name))
    }

    /// Whether `line` belongs to a helper function and `name` is declared in the entry function.
    pub fn owned_by_entry(&self, name: &str, line: usize) -> bool {
        self.scopes.in_helper_function(line)
            && self
                .scopes
                .entry()
                .is_some_and(|entry| self.decls.declared_in(name, entry.body.clone()))
    }
}

/// The text after the type of a typed statement such as `const float a = 1.0, b;`.
fn typed_statement_rest<'a>(line: &'a str, types: &TypeNames) -> Option<&'a str> {
    if signature_name(line, types).is_some() {
        return None;
    }
    let mut rest = line.trim_start();
    loop {
        let word = leading_identifier(rest)?;
        let after = rest[word.len()..].trim_start();
        if is_qualifier(word) || word == "precision" {
            rest = after;
        } else if types.is_type(word) {
            leading_identifier(after)?;
            return Some(after);
        } else {
            return None;
        }
    }
}

/// Leading identifiers of each declarator in a (partial) declaration list.
fn declarators(rest: &str) -> Vec<String> {
    declarator_names(split_top_level_commas(statement(rest)).into_iter())
}

fn declarator_names<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .filter_map(leading_identifier)
        .filter(|name| !is_control_keyword(name))
        .map(str::to_string)
        .collect()
}

/// The text up to the first `;`.
fn statement(text: &str) -> &str {
    text.split(';').next().unwrap_or(text)
}

/// `(`/`[` nesting depth at the end of `text` when it starts at `depth`, and the offset just
/// past the bracket that first brings the depth back to zero.
fn nesting(text: &str, mut depth: i32) -> (i32, Option<usize>) {
    let mut closed_at = None;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth == 0 && closed_at.is_none() {
                    closed_at = Some(i + 1);
                }
            }
            _ => {}
        }
    }
    (depth.max(0), closed_at)
}

pub(super) fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(src: &str) -> DeclarationIndex {
        let lines: Vec<&str> = src.lines().collect();
        DeclarationIndex::build(&lines, &TypeNames::collect(&lines))
    }

    #[test]
    fn chain_declarators_are_indexed_on_their_own_lines() {
        let idx = index("vec2 r = iResolution.xy,\n     u = r * 0.5,\n     w;\nw = u;");
        assert_eq!(idx.role(0), ChainRole::Head);
        assert!(idx.is_continuation(1));
        assert!(idx.is_continuation(2));
        assert!(!idx.is_continuation(3));
        assert!(idx.declares(0, "r"));
        assert!(idx.declares(1, "u"));
        assert!(idx.declares(2, "w"));
        assert!(idx.declared_before("w", 3));
        assert!(!idx.declared_before("w", 2));
    }

    #[test]
    fn single_line_chain_declares_every_name() {
        let idx = index("float i = .2, a, b = vec2(1., 2.).x;");
        for name in ["i", "a", "b"] {
            assert!(idx.declares(0, name), "{name}");
        }
    }

    #[test]
    fn parameters_and_function_names_are_declared_on_the_signature() {
        let idx = index("float map(in vec3 p, float k) {\n  return k;\n}");
        assert!(idx.declares(0, "map"));
        assert!(idx.declares(0, "p"));
        assert!(idx.declares(0, "k"));
        assert!(!idx.is_continuation(1));
    }

    #[test]
    fn structs_and_defines() {
        let idx = index("#define PI 3.14159\nstruct Ray {\n  vec3 o;\n};\nRay r;");
        assert!(idx.declares(0, "PI"));
        assert!(idx.declares(1, "Ray"));
        assert!(idx.in_struct(2));
        assert!(!idx.in_struct(4));
        assert!(idx.declares(4, "r"));
    }

    #[test]
    fn assignments_and_calls_declare_nothing() {
        let idx = index("col = vec3(1.0);\nreturn col;\nfoo(bar);");
        assert!(!idx.declared_in("col", 0..3));
        assert!(!idx.declared_in("bar", 0..3));
    }

    #[test]
    fn helper_lines_defer_to_entry_and_file_scope_names() {
        let src = "\
float g = 1.0;
float helper(float k) {
    g;
    acc;
    tmp;
    return k;
}
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 acc = vec2(0.0);
    fragColor = vec4(acc, g, 1.0);
}";
        let lines: Vec<&str> = src.lines().collect();
        let index = ShaderIndex::build(&lines, "mainImage");
        assert!(index.belongs_to_other_scope("g", 2));
        assert!(index.belongs_to_other_scope("acc", 3));
        assert!(!index.belongs_to_other_scope("tmp", 4));
        assert!(!index.belongs_to_other_scope("acc", 9));
        assert!(index.owned_by_entry("acc", 3));
        assert!(!index.owned_by_entry("g", 2));
    }

    #[test]
    fn scope_lookup_ignores_other_functions() {
        let src = "\
float k = 2.0;
float h(vec2 w) {
    return w.x * k;
}
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    w = vec2(0.0);
    fragColor = vec4(w, h(w), 1.0);
}";
        let lines: Vec<&str> = src.lines().collect();
        let index = ShaderIndex::build(&lines, "mainImage");
        assert!(index.decls.declared_before("w", 5));
        assert!(!index.declared_in_scope("w", 5));
        assert!(index.declared_in_scope("w", 2));
        assert!(index.declared_in_scope("k", 5));
        assert!(index.declared_in_scope("h", 5));
        assert!(index.declared_in_scope("fragCoord", 5));
    }

    #[test]
    fn wrapped_call_arguments_are_not_declarators() {
        let idx = index("vec3 c = mix(vec3(0.0),\n             tint, 0.5);\nvec3 d = tint * 2.0;");
        assert_eq!(idx.role(0), ChainRole::None);
        assert!(idx.declares(0, "c"));
        assert!(!idx.is_continuation(1));
        assert!(!idx.declared_in("tint", 0..2));
        assert!(idx.declares(2, "d"));
    }

    #[test]
    fn declarators_after_wrapped_arguments_continue_the_chain() {
        let idx = index("vec2 a = vec2(1.0,\n              2.0), b,\n     e;\ne = b;");
        assert!(idx.declares(0, "a"));
        assert!(idx.declares(1, "b"));
        assert!(!idx.declares(1, "2"));
        assert!(idx.is_continuation(2));
        assert!(idx.declares(2, "e"));
        assert!(!idx.is_continuation(3));
    }

    #[test]
    fn unbalanced_arguments_end_at_the_semicolon() {
        let idx = index("float k = f(a,\n   b;\nfloat m;");
        assert!(idx.declares(2, "m"));
    }

    #[test]
    fn wrapped_parameter_lists_are_not_chains() {
        let idx = index("void mainImage(out vec4 fragColor,\n               in vec2 fragCoord)\n{");
        assert!(!idx.is_continuation(1));
        assert!(idx.declares(0, "fragColor"));
        assert!(idx.declares(1, "fragCoord"));
    }
}
