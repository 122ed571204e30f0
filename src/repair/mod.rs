//! Static repair of exported shader bodies.
//!
//! This module is organized into several submodules:
//! - `types`: Repair state, options, report and the `GlslType` zero-value table
//! - `vocab`: Keywords, built-in names and per-shader type names
//! - `text`: Identifier-boundary scanning helpers
//! - `comments`: Comment stripping
//! - `scope`: Function signatures, body spans and the per-line owner table
//! - `decls`: Per-line declaration index
//! - `infer`: Type inference for untyped identifiers
//! - `uninit`: Default initializers, undeclared assignments and the second sweep
//! - `orphans`: Orphaned assignment removal
//! - `output_decl`: Entry output redeclaration fix
//! - `loops`: Loop pre-initialization
//! - `pipeline`: Pass ordering
//!
//! The main entry points are:
//! - `repair_shader_code`: Repair with default options, text in, text out
//! - `repair_shader_code_with`: Repair with explicit options, returning state and report

pub mod comments;
pub mod decls;
pub mod infer;
pub mod loops;
pub mod orphans;
pub mod output_decl;
pub mod pipeline;
pub mod scope;
pub mod text;
pub mod types;
pub mod uninit;
pub mod vocab;

pub use comments::strip_comments;
pub use infer::{InferredType, TypeEvidence, infer_variable_type};
pub use pipeline::{repair_shader_code, repair_shader_code_with};
pub use scope::{FunctionScopes, FunctionSignature, ScopeLookup};
pub use types::{
    DEFAULT_ENTRY_POINT, DEFAULT_OUTPUT_PARAM, GlslType, RepairOptions, RepairOutput,
    RepairReport, RepairState,
};
