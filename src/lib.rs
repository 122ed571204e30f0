pub mod container;
pub mod error;
pub mod glsl_template;
pub mod repair;
pub mod validation;

pub use container::{
    ShaderContainer, ShaderInput, ShaderMetadata, ShaderPass, ShaderPerformance,
    decode_container, load_container_from_default_asset, load_container_from_path,
};
pub use error::{ContainerError, ContainerResult};
pub use glsl_template::{PreparedShader, ShaderSources, build_shader_sources, prepare_container};
pub use repair::{RepairOptions, RepairOutput, RepairReport, repair_shader_code, repair_shader_code_with};
