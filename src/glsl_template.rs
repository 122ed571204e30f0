//! The GL 3.3 vertex/fragment pair a repaired shader body is embedded in.

use log::info;

use crate::container::ShaderContainer;
use crate::error::ContainerResult;
use crate::repair::{RepairOptions, RepairReport, repair_shader_code_with, strip_comments};

/// Fullscreen quad vertex shader. Emits normalized coordinates in `[0, 1]`.
pub const VERTEX_SHADER: &str = "\
#version 330 core
layout(location = 0) in vec2 aPos;
layout(location = 1) in vec2 aTexCoord;
out vec2 fragCoord;

void main() {
    fragCoord = aTexCoord;
    gl_Position = vec4(aPos * 2.0 - 1.0, 0.0, 1.0);
}
";

const FRAGMENT_PRELUDE: &str = "\
#version 330 core
in vec2 fragCoord;
out vec4 fragColor;

uniform vec3 iResolution;
uniform float iTime;
uniform float iTimeDelta;
uniform int iFrame;
uniform float iFrameRate;
uniform vec4 iMouse;
uniform vec4 iDate;
uniform float iSampleRate;
uniform vec3 iChannelResolution[4];
uniform float iChannelTime[4];

uniform sampler2D iChannel0;
uniform sampler2D iChannel1;
uniform sampler2D iChannel2;
uniform sampler2D iChannel3;
uniform float iFade;
";

// `fragCoord` arrives normalized; the entry function expects pixels.
const FRAGMENT_MAIN: &str = "\
void main() {
    vec2 fragCoordScreen = fragCoord * iResolution.xy;
    mainImage(fragColor, fragCoordScreen);
    fragColor.rgb *= iFade;
}
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

/// Embed a repaired body into the template pair.
pub fn build_shader_sources(body: &str) -> ShaderSources {
    let fragment = format!("{FRAGMENT_PRELUDE}\n{body}\n\n{FRAGMENT_MAIN}");
    ShaderSources {
        vertex: VERTEX_SHADER.to_string(),
        fragment: strip_comments(&fragment),
    }
}

/// A container's image pass, repaired and embedded.
#[derive(Debug, Clone)]
pub struct PreparedShader {
    pub pass_name: String,
    pub body: String,
    pub sources: ShaderSources,
    pub report: RepairReport,
}

/// Select the image pass, repair it and build the sources the renderer compiles.
pub fn prepare_container(
    container: &ShaderContainer,
    options: &RepairOptions,
) -> ContainerResult<PreparedShader> {
    let pass = container.main_pass()?;
    info!(
        "preparing pass '{}' of '{}' ({} bytes)",
        pass.name,
        container.title().unwrap_or("untitled"),
        pass.code.len()
    );

    let repaired = repair_shader_code_with(&pass.code, options);
    let sources = build_shader_sources(&repaired.code);

    Ok(PreparedShader {
        pass_name: pass.name.clone(),
        body: repaired.code,
        sources,
        report: repaired.report,
    })
}
