//! Best-effort type inference for identifiers that reach the repair passes without a type.
//!
//! Ambiguous evidence resolves toward `vec2`, the usual accumulator type in fullscreen shaders.

use std::sync::OnceLock;

use regex::Regex;

use super::text::{is_assigned_any, is_used, member_accesses};
use super::types::GlslType;

/// How far back a declaration chain is followed.
const CHAIN_LOOKBACK: usize = 20;

fn chain_type_regex() -> &'static Regex {
    static CHAIN_TYPE: OnceLock<Regex> = OnceLock::new();
    CHAIN_TYPE.get_or_init(|| {
        Regex::new(r"\b(vec[234]|mat[234]|float|int|bool)\s+\w+\s*=")
            .expect("Invalid chain type regex")
    })
}

/// The rule that decided an inferred type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeEvidence {
    /// Explicit type at the head of a comma-continued declaration.
    DeclarationChain,
    /// A third or fourth component (`.z`, `.w`, `.b`, `.a`) is accessed.
    DepthComponent,
    /// A multi-component swizzle over the first two components.
    Swizzle,
    /// A single `.x`/`.y` access.
    PlanarComponent,
    Assignment,
    Usage,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredType {
    pub ty: GlslType,
    pub evidence: TypeEvidence,
}

impl InferredType {
    fn new(ty: GlslType, evidence: TypeEvidence) -> Self {
        Self { ty, evidence }
    }

    pub fn zero_value(&self) -> &'static str {
        self.ty.zero_value()
    }
}

/// Infer a type for `name`, requested at `line_index` of `lines`. `code` is the full text the
/// usage rules look at.
pub fn infer_variable_type<S: AsRef<str>>(
    name: &str,
    code: &str,
    lines: &[S],
    line_index: usize,
) -> InferredType {
    if let Some(ty) = chain_type(lines, line_index) {
        return InferredType::new(ty, TypeEvidence::DeclarationChain);
    }

    let swizzles: Vec<&str> = member_accesses(code, name)
        .filter(|m| is_swizzle(m))
        .collect();
    if swizzles
        .iter()
        .any(|m| m.chars().any(|c| matches!(c, 'z' | 'w' | 'b' | 'a')))
    {
        return InferredType::new(GlslType::Vec4, TypeEvidence::DepthComponent);
    }
    if swizzles.iter().any(|m| m.len() >= 2) {
        return InferredType::new(GlslType::Vec2, TypeEvidence::Swizzle);
    }
    if !swizzles.is_empty() {
        return InferredType::new(GlslType::Vec2, TypeEvidence::PlanarComponent);
    }

    if is_assigned_any(code, name) {
        return InferredType::new(GlslType::Vec2, TypeEvidence::Assignment);
    }
    if is_used(code, name) {
        return InferredType::new(GlslType::Vec2, TypeEvidence::Usage);
    }
    InferredType::new(GlslType::Vec2, TypeEvidence::Fallback)
}

/// Walk back through a comma-continued declaration looking for its explicit type.
fn chain_type<S: AsRef<str>>(lines: &[S], line_index: usize) -> Option<GlslType> {
    let start = line_index.min(lines.len());
    for line in lines[..start].iter().rev().take(CHAIN_LOOKBACK) {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = chain_type_regex().captures(line) {
            return GlslType::from_keyword(&caps[1]);
        }
        if !line.ends_with(',') {
            break;
        }
    }
    None
}

/// 1–4 components drawn from a single component set.
fn is_swizzle(member: &str) -> bool {
    (1..=4).contains(&member.len())
        && (member.chars().all(|c| matches!(c, 'x' | 'y' | 'z' | 'w'))
            || member.chars().all(|c| matches!(c, 'r' | 'g' | 'b' | 'a')))
}
