//! Shader container model: the JSON document a shader export tool produces.
//!
//! The container is decoded once per load and is treated as an immutable input afterwards.
//! Only `passes[].code` is interpreted; every other field is carried through untouched.

mod escape;

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ContainerError, ContainerResult};

pub use escape::escape_control_chars_in_strings;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ShaderContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ShaderMetadata>,
    pub passes: Vec<ShaderPass>,

    // Opaque pass-through data.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<ShaderPerformance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_textures: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pass_textures: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ShaderMetadata {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub shader_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_passes: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ShaderPerformance {
    #[serde(default)]
    pub cpu_usage_percent: Option<f64>,
    #[serde(default)]
    pub gpu_usage_percent: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ShaderPass {
    #[serde(default)]
    pub index: Option<u32>,
    pub code: String,
    #[serde(default)]
    pub inputs: Vec<ShaderInput>,
    #[serde(rename = "type", default)]
    pub pass_type: String,
    #[serde(default)]
    pub name: String,
}

impl ShaderPass {
    /// Whether this pass is the one rendered to screen.
    pub fn is_image(&self) -> bool {
        self.pass_type == "image" || self.name == "Image"
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ShaderInput {
    /// Exporters write this either as a string or as a bare number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub channel: u32,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(rename = "type", default)]
    pub input_type: Option<String>,
}

impl ShaderContainer {
    /// Pick the pass to render: the first `image` pass, otherwise the first pass.
    pub fn main_pass(&self) -> ContainerResult<&ShaderPass> {
        self.passes
            .iter()
            .find(|p| p.is_image())
            .or_else(|| self.passes.first())
            .ok_or(ContainerError::EmptyPassList)
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.title.as_deref())
    }
}

/// Decode raw container bytes, repairing unescaped control characters first.
pub fn decode_container(bytes: &[u8]) -> ContainerResult<ShaderContainer> {
    let escaped = escape_control_chars_in_strings(bytes);
    let container: ShaderContainer = serde_json::from_slice(&escaped)?;

    if container.passes.is_empty() {
        return Err(ContainerError::EmptyPassList);
    }
    if !container.passes.iter().any(ShaderPass::is_image) {
        log::warn!(
            "shader container has no image pass; falling back to the first of {} passes",
            container.passes.len()
        );
    }

    Ok(container)
}

pub fn load_container_from_path(path: impl AsRef<Path>) -> ContainerResult<ShaderContainer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| ContainerError::io(path, e))?;
    decode_container(&bytes)
}

pub fn load_container_from_default_asset() -> ContainerResult<ShaderContainer> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("shader.json");
    load_container_from_path(path)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected string or number for input id, got {other}"
        ))),
    }
}
