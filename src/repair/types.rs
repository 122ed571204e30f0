use std::collections::BTreeMap;
use std::fmt;

/// Entry function the renderer calls once per pixel.
pub const DEFAULT_ENTRY_POINT: &str = "mainImage";

/// Output parameter name assumed when the entry signature does not reveal one.
pub const DEFAULT_OUTPUT_PARAM: &str = "fragColor";

/// Scalar, vector and matrix types the repair passes know zero values for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlslType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl GlslType {
    pub const ALL: [GlslType; 9] = [
        GlslType::Float,
        GlslType::Int,
        GlslType::Bool,
        GlslType::Vec2,
        GlslType::Vec3,
        GlslType::Vec4,
        GlslType::Mat2,
        GlslType::Mat3,
        GlslType::Mat4,
    ];

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == word)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            GlslType::Float => "float",
            GlslType::Int => "int",
            GlslType::Bool => "bool",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
            GlslType::Mat2 => "mat2",
            GlslType::Mat3 => "mat3",
            GlslType::Mat4 => "mat4",
        }
    }

    /// Canonical default-valued initializer expression.
    pub fn zero_value(self) -> &'static str {
        match self {
            GlslType::Float => "0.0",
            GlslType::Int => "0",
            GlslType::Bool => "false",
            GlslType::Vec2 => "vec2(0.0)",
            GlslType::Vec3 => "vec3(0.0)",
            GlslType::Vec4 => "vec4(0.0)",
            GlslType::Mat2 => "mat2(0.0)",
            GlslType::Mat3 => "mat3(0.0)",
            GlslType::Mat4 => "mat4(0.0)",
        }
    }

    /// Guess a declaration type from the right-hand side of an assignment.
    ///
    /// An outermost constructor call wins; otherwise the first vector constructor found
    /// anywhere; otherwise `float`.
    pub fn from_initializer(expr: &str) -> Self {
        let expr = expr.trim();
        let constructor = |t: GlslType| format!("{}(", t.keyword());

        if let Some(t) = Self::ALL
            .into_iter()
            .filter(|t| !t.is_scalar())
            .find(|&t| expr.starts_with(&constructor(t)))
        {
            return t;
        }

        [GlslType::Vec2, GlslType::Vec3, GlslType::Vec4]
            .into_iter()
            .find(|&t| expr.contains(&constructor(t)))
            .unwrap_or(GlslType::Float)
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, GlslType::Float | GlslType::Int | GlslType::Bool)
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Identifiers the pipeline decided needed a default initializer, and the type chosen.
///
/// Lives for one repair run. Iteration order is by name so insertions are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairState {
    initializers: BTreeMap<String, GlslType>,
}

impl RepairState {
    pub fn record(&mut self, name: &str, ty: GlslType) {
        self.initializers.insert(name.to_string(), ty);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.initializers.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<GlslType> {
        self.initializers.get(name).copied()
    }

    /// The initializer expression recorded for `name`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, GlslType)> {
        self.initializers.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Name of the function the renderer invokes per pixel.
    pub entry_point: String,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

/// Counts of every rewrite made during one repair run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub chain_initialized: usize,
    pub standalone_initialized: usize,
    pub declarations_initialized: usize,
    pub assignments_declared: usize,
    pub assignments_dropped: usize,
    pub sweep_initialized: usize,
    pub orphans_removed: usize,
    pub output_redeclarations_fixed: usize,
    pub loop_inits_inserted: usize,
}

impl RepairReport {
    pub fn total(&self) -> usize {
        self.chain_initialized
            + self.standalone_initialized
            + self.declarations_initialized
            + self.assignments_declared
            + self.assignments_dropped
            + self.sweep_initialized
            + self.orphans_removed
            + self.output_redeclarations_fixed
            + self.loop_inits_inserted
    }
}

/// Result of [`super::repair_shader_code_with`].
#[derive(Debug, Clone)]
pub struct RepairOutput {
    pub code: String,
    pub state: RepairState,
    pub report: RepairReport,
}
