//! Static vocabulary shared by every repair pass: keywords, built-in names and type names.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use super::types::GlslType;

/// Statement keywords that can look like `<ident>;` or `<ident> = ...;` to a line scanner.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "return", "break", "continue", "discard", "switch",
    "case", "default",
];

pub fn is_control_keyword(word: &str) -> bool {
    CONTROL_KEYWORDS.contains(&word)
}

/// Storage and precision qualifiers that may precede a declaration.
const QUALIFIERS: &[&str] = &[
    "const", "uniform", "in", "out", "inout", "varying", "attribute", "highp", "mediump", "lowp",
    "flat", "smooth",
];

pub fn is_qualifier(word: &str) -> bool {
    QUALIFIERS.contains(&word)
}

/// Built-in types beyond the ones [`GlslType`] carries zero values for.
const OTHER_TYPES: &[&str] = &[
    "uint", "ivec2", "ivec3", "ivec4", "uvec2", "uvec3", "uvec4", "bvec2", "bvec3", "bvec4",
    "sampler2D", "sampler3D", "samplerCube",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// Type names, also usable as constructors.
    Type,
    Function,
    /// Uniforms and variables provided by the template or the GL pipeline.
    Uniform,
    Literal,
    /// Component names that appear as bare tokens in swizzle-heavy code.
    Swizzle,
    /// Helper names this shader family defines in shared snippets.
    CorpusHelper,
}

const BUILTINS: &[(&str, BuiltinKind)] = &[
    ("void", BuiltinKind::Type),
    ("float", BuiltinKind::Type),
    ("int", BuiltinKind::Type),
    ("bool", BuiltinKind::Type),
    ("vec2", BuiltinKind::Type),
    ("vec3", BuiltinKind::Type),
    ("vec4", BuiltinKind::Type),
    ("mat2", BuiltinKind::Type),
    ("mat3", BuiltinKind::Type),
    ("mat4", BuiltinKind::Type),
    ("uint", BuiltinKind::Type),
    ("ivec2", BuiltinKind::Type),
    ("ivec3", BuiltinKind::Type),
    ("ivec4", BuiltinKind::Type),
    ("bvec2", BuiltinKind::Type),
    ("bvec3", BuiltinKind::Type),
    ("bvec4", BuiltinKind::Type),
    ("uvec2", BuiltinKind::Type),
    ("uvec3", BuiltinKind::Type),
    ("uvec4", BuiltinKind::Type),
    ("radians", BuiltinKind::Function),
    ("degrees", BuiltinKind::Function),
    ("sin", BuiltinKind::Function),
    ("cos", BuiltinKind::Function),
    ("tan", BuiltinKind::Function),
    ("asin", BuiltinKind::Function),
    ("acos", BuiltinKind::Function),
    ("atan", BuiltinKind::Function),
    ("sinh", BuiltinKind::Function),
    ("cosh", BuiltinKind::Function),
    ("tanh", BuiltinKind::Function),
    ("pow", BuiltinKind::Function),
    ("exp", BuiltinKind::Function),
    ("log", BuiltinKind::Function),
    ("exp2", BuiltinKind::Function),
    ("log2", BuiltinKind::Function),
    ("sqrt", BuiltinKind::Function),
    ("inversesqrt", BuiltinKind::Function),
    ("abs", BuiltinKind::Function),
    ("sign", BuiltinKind::Function),
    ("floor", BuiltinKind::Function),
    ("ceil", BuiltinKind::Function),
    ("trunc", BuiltinKind::Function),
    ("round", BuiltinKind::Function),
    ("fract", BuiltinKind::Function),
    ("mod", BuiltinKind::Function),
    ("min", BuiltinKind::Function),
    ("max", BuiltinKind::Function),
    ("clamp", BuiltinKind::Function),
    ("mix", BuiltinKind::Function),
    ("step", BuiltinKind::Function),
    ("smoothstep", BuiltinKind::Function),
    ("length", BuiltinKind::Function),
    ("distance", BuiltinKind::Function),
    ("dot", BuiltinKind::Function),
    ("cross", BuiltinKind::Function),
    ("normalize", BuiltinKind::Function),
    ("reflect", BuiltinKind::Function),
    ("refract", BuiltinKind::Function),
    ("faceforward", BuiltinKind::Function),
    ("transpose", BuiltinKind::Function),
    ("inverse", BuiltinKind::Function),
    ("determinant", BuiltinKind::Function),
    ("texture", BuiltinKind::Function),
    ("textureLod", BuiltinKind::Function),
    ("texelFetch", BuiltinKind::Function),
    ("textureGrad", BuiltinKind::Function),
    ("textureProj", BuiltinKind::Function),
    ("textureSize", BuiltinKind::Function),
    ("texture2D", BuiltinKind::Function),
    ("textureCube", BuiltinKind::Function),
    ("lessThan", BuiltinKind::Function),
    ("lessThanEqual", BuiltinKind::Function),
    ("greaterThan", BuiltinKind::Function),
    ("greaterThanEqual", BuiltinKind::Function),
    ("equal", BuiltinKind::Function),
    ("notEqual", BuiltinKind::Function),
    ("any", BuiltinKind::Function),
    ("all", BuiltinKind::Function),
    ("not", BuiltinKind::Function),
    ("matrixCompMult", BuiltinKind::Function),
    ("outerProduct", BuiltinKind::Function),
    ("modf", BuiltinKind::Function),
    ("roundEven", BuiltinKind::Function),
    ("isnan", BuiltinKind::Function),
    ("isinf", BuiltinKind::Function),
    ("floatBitsToInt", BuiltinKind::Function),
    ("floatBitsToUint", BuiltinKind::Function),
    ("intBitsToFloat", BuiltinKind::Function),
    ("uintBitsToFloat", BuiltinKind::Function),
    ("packHalf2x16", BuiltinKind::Function),
    ("unpackHalf2x16", BuiltinKind::Function),
    ("dFdx", BuiltinKind::Function),
    ("dFdy", BuiltinKind::Function),
    ("fwidth", BuiltinKind::Function),
    ("iTime", BuiltinKind::Uniform),
    ("iResolution", BuiltinKind::Uniform),
    ("iTimeDelta", BuiltinKind::Uniform),
    ("iFrame", BuiltinKind::Uniform),
    ("iFrameRate", BuiltinKind::Uniform),
    ("iMouse", BuiltinKind::Uniform),
    ("iDate", BuiltinKind::Uniform),
    ("iSampleRate", BuiltinKind::Uniform),
    ("iChannel0", BuiltinKind::Uniform),
    ("iChannel1", BuiltinKind::Uniform),
    ("iChannel2", BuiltinKind::Uniform),
    ("iChannel3", BuiltinKind::Uniform),
    ("iChannelResolution", BuiltinKind::Uniform),
    ("iChannelTime", BuiltinKind::Uniform),
    ("iFade", BuiltinKind::Uniform),
    ("gl_FragCoord", BuiltinKind::Uniform),
    ("gl_FragColor", BuiltinKind::Uniform),
    ("true", BuiltinKind::Literal),
    ("false", BuiltinKind::Literal),
    ("x", BuiltinKind::Swizzle),
    ("y", BuiltinKind::Swizzle),
    ("z", BuiltinKind::Swizzle),
    ("w", BuiltinKind::Swizzle),
    ("r", BuiltinKind::Swizzle),
    ("g", BuiltinKind::Swizzle),
    ("b", BuiltinKind::Swizzle),
    ("a", BuiltinKind::Swizzle),
    ("xy", BuiltinKind::Swizzle),
    ("zx", BuiltinKind::Swizzle),
    ("rgb", BuiltinKind::Swizzle),
    ("xyyx", BuiltinKind::Swizzle),
    ("time", BuiltinKind::CorpusHelper),
    ("spd", BuiltinKind::CorpusHelper),
    ("mm2", BuiltinKind::CorpusHelper),
    ("m2", BuiltinKind::CorpusHelper),
    ("tri", BuiltinKind::CorpusHelper),
    ("tri2", BuiltinKind::CorpusHelper),
    ("bp", BuiltinKind::CorpusHelper),
    ("p", BuiltinKind::CorpusHelper),
];

pub fn builtin_kind(name: &str) -> Option<BuiltinKind> {
    static TABLE: OnceLock<HashMap<&'static str, BuiltinKind>> = OnceLock::new();
    TABLE
        .get_or_init(|| BUILTINS.iter().copied().collect())
        .get(name)
        .copied()
}

fn struct_decl_regex() -> &'static Regex {
    static STRUCT_DECL: OnceLock<Regex> = OnceLock::new();
    STRUCT_DECL.get_or_init(|| {
        Regex::new(r"\bstruct\s+([A-Za-z_]\w*)").expect("Invalid struct declaration regex")
    })
}

/// Type names visible in one shader: the built-ins plus any `struct` declared in the text.
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    structs: HashSet<String>,
}

impl TypeNames {
    pub fn collect<S: AsRef<str>>(lines: &[S]) -> Self {
        let structs = lines
            .iter()
            .flat_map(|line| {
                struct_decl_regex()
                    .captures_iter(line.as_ref())
                    .map(|c| c[1].to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
        Self { structs }
    }

    /// Whether `word` can start a variable declaration.
    pub fn is_type(&self, word: &str) -> bool {
        GlslType::from_keyword(word).is_some()
            || OTHER_TYPES.contains(&word)
            || self.structs.contains(word)
    }

    /// Whether `word` can start a function signature.
    pub fn is_return_type(&self, word: &str) -> bool {
        word == "void" || self.is_type(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_covers_each_kind() {
        assert_eq!(builtin_kind("vec2"), Some(BuiltinKind::Type));
        assert_eq!(builtin_kind("smoothstep"), Some(BuiltinKind::Function));
        assert_eq!(builtin_kind("iResolution"), Some(BuiltinKind::Uniform));
        assert_eq!(builtin_kind("zx"), Some(BuiltinKind::Swizzle));
        assert_eq!(builtin_kind("tri2"), Some(BuiltinKind::CorpusHelper));
        assert_eq!(builtin_kind("bpos"), None);
    }

    #[test]
    fn struct_names_become_types() {
        let types = TypeNames::collect(&["struct Ray { vec3 o; vec3 d; };", "float x;"]);
        assert!(types.is_type("Ray"));
        assert!(types.is_type("vec3"));
        assert!(!types.is_type("x"));
        assert!(types.is_return_type("void"));
        assert!(!types.is_type("void"));
    }

    #[test]
    fn control_keywords_and_qualifiers() {
        assert!(is_control_keyword("return"));
        assert!(is_control_keyword("break"));
        assert!(!is_control_keyword("col"));
        assert!(is_qualifier("inout"));
        assert!(!is_qualifier("float"));
    }
}
