//! Offline GLSL validation of repaired shader bodies using the naga library.
//!
//! naga's GLSL front end only understands Vulkan-flavoured GLSL 450, so the body is wrapped in
//! a 450 harness that mirrors the GL 3.3 template: the same uniform names, gathered into one
//! std140 block. Channel samplers are not declared; bodies that sample channels fail here even
//! though the GL template would accept them.

use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, Copy)]
pub enum GlslShaderStage {
    Vertex,
    Fragment,
}

const HARNESS_PRELUDE: &str = "\
#version 450

layout(std140, set = 0, binding = 0) uniform ShaderInputs {
    vec3 iResolution;
    float iTime;
    float iTimeDelta;
    int iFrame;
    float iFrameRate;
    vec4 iMouse;
    vec4 iDate;
    float iSampleRate;
    vec3 iChannelResolution[4];
    float iChannelTime[4];
    float iFade;
};
";

const HARNESS_MAIN: &str = "\
layout(location = 0) in vec2 v_tex_coord;
layout(location = 0) out vec4 o_color;

void main() {
    vec4 color = vec4(0.0);
    mainImage(color, v_tex_coord * iResolution.xy);
    o_color = vec4(color.rgb * iFade, color.a);
}
";

/// Parse and validate standalone GLSL 450 source.
pub fn validate_glsl(source: &str, stage: GlslShaderStage) -> Result<naga::Module> {
    let shader_stage = match stage {
        GlslShaderStage::Vertex => naga::ShaderStage::Vertex,
        GlslShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let mut parser = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options {
        stage: shader_stage,
        defines: Default::default(),
    };

    let module = parser
        .parse(&options, source)
        .map_err(|e| anyhow!("GLSL parse failed: {e:?}\n{}", format_numbered_source(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| anyhow!("GLSL validation failed: {e:?}\n{}", format_numbered_source(source)))?;

    Ok(module)
}

/// Wrap a repaired `mainImage` body in the validation harness.
pub fn build_validation_harness(body: &str) -> String {
    format!("{HARNESS_PRELUDE}\n{body}\n\n{HARNESS_MAIN}")
}

/// Validate a repaired body as the fragment stage of the harness.
pub fn validate_repaired_body(body: &str) -> Result<naga::Module> {
    validate_glsl(&build_validation_harness(body), GlslShaderStage::Fragment)
        .context("repaired shader body does not compile")
}

/// Source with line numbers, for error messages.
fn format_numbered_source(source: &str) -> String {
    let mut output = String::new();
    output.push_str("---\n");
    for (line_num, line) in source.lines().enumerate() {
        output.push_str(&format!("{:4} | {}\n", line_num + 1, line));
    }
    output.push_str("---\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_body() {
        let body = "\
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord / iResolution.xy;
    fragColor = vec4(uv, 0.5 + 0.5 * sin(iTime), 1.0);
}";
        assert!(validate_repaired_body(body).is_ok());
    }

    #[test]
    fn test_invalid_body_syntax() {
        let result = validate_repaired_body("void mainImage(out vec4 c, in vec2 p) { c = ; }");
        assert!(result.is_err());
        let err_msg = format!("{:#}", result.unwrap_err());
        assert!(err_msg.contains("repaired shader body does not compile"));
        assert!(err_msg.contains("   1 | #version 450"));
    }

    #[test]
    fn test_harness_layout() {
        let harness = build_validation_harness("// body");
        assert!(harness.starts_with("#version 450\n"));
        let body = harness.find("// body").unwrap();
        assert!(harness.find("uniform ShaderInputs").unwrap() < body);
        assert!(body < harness.find("void main()").unwrap());
    }
}
