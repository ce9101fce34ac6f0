use std::borrow::Cow;

use anyhow::{anyhow, Result};
use wgpu::naga::ShaderStage;

pub(crate) const CLOUD_VERTEX: &str = include_str!("../shaders/cloud.vert");
pub(crate) const CLOUD_FRAGMENT: &str = include_str!("../shaders/cloud.frag");
pub(crate) const GENIE_VERTEX: &str = include_str!("../shaders/genie.vert");
pub(crate) const GENIE_FRAGMENT: &str = include_str!("../shaders/genie.frag");
pub(crate) const AURORA_VERTEX: &str = include_str!("../shaders/aurora.vert");
pub(crate) const AURORA_FRAGMENT: &str = include_str!("../shaders/aurora.frag");

/// Chunks a source may pull in with `#include "name"`.
const CHUNKS: &[(&str, &str)] = &[("simplex2d.glsl", include_str!("../shaders/simplex2d.glsl"))];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IncludeError {
    #[error("line {line}: malformed #include directive")]
    Malformed { line: usize },
    #[error("line {line}: unknown include '{name}'")]
    Unknown { line: usize, name: String },
    #[error("include '{name}' may not include other chunks")]
    Nested { name: String },
}

/// Resolves `#include "name"` lines against the built-in chunk table.
pub fn assemble_source(source: &str) -> Result<String, IncludeError> {
    assemble_with(source, CHUNKS)
}

fn assemble_with(source: &str, chunks: &[(&str, &str)]) -> Result<String, IncludeError> {
    let mut out = String::with_capacity(source.len());
    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let Some(name) = include_target(line, line_no)? else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        let chunk = chunks
            .iter()
            .find(|(chunk_name, _)| *chunk_name == name)
            .map(|(_, body)| *body)
            .ok_or_else(|| IncludeError::Unknown {
                line: line_no,
                name: name.to_string(),
            })?;
        for (chunk_index, chunk_line) in chunk.lines().enumerate() {
            if include_target(chunk_line, chunk_index + 1)?.is_some() {
                return Err(IncludeError::Nested {
                    name: name.to_string(),
                });
            }
        }
        out.push_str(chunk);
        if !chunk.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}

fn include_target(line: &str, line_no: usize) -> Result<Option<&str>, IncludeError> {
    let Some(rest) = line.trim_start().strip_prefix("#include") else {
        return Ok(None);
    };
    let name = rest
        .trim()
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|name| !name.is_empty())
        .ok_or(IncludeError::Malformed { line: line_no })?;
    Ok(Some(name))
}

/// Assembles a GLSL 450 source and compiles it through naga's GLSL frontend.
///
/// Validation errors are captured with an error scope so a broken shader
/// surfaces as an `Err` instead of the device's uncaptured-error panic.
pub(crate) fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    let assembled = assemble_source(source).map_err(|err| anyhow!("{label}: {err}"))?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(assembled),
            stage,
            defines: &[],
        },
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(anyhow!("failed to compile {label}: {error}"));
    }
    tracing::debug!(label, ?stage, "compiled shader");
    Ok(module)
}

/// Vertex and fragment modules for one sketch.
pub(crate) struct ShaderPair {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl ShaderPair {
    pub(crate) fn compile(
        device: &wgpu::Device,
        name: &str,
        vertex: &str,
        fragment: &str,
    ) -> Result<Self> {
        Ok(Self {
            vertex: compile_shader(device, &format!("{name} vertex"), vertex, ShaderStage::Vertex)?,
            fragment: compile_shader(
                device,
                &format!("{name} fragment"),
                fragment,
                ShaderStage::Fragment,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_is_replaced_by_the_chunk() {
        let source = "#version 450\n#include \"simplex2d.glsl\"\nvoid main() {}\n";
        let assembled = assemble_source(source).expect("assemble");
        assert!(assembled.starts_with("#version 450\n"));
        assert!(assembled.contains("float snoise(vec2 v)"));
        assert!(!assembled.contains("#include"));
        assert!(assembled.trim_end().ends_with("void main() {}"));
    }

    #[test]
    fn sources_without_includes_pass_through() {
        let source = "#version 450\nvoid main() {}\n";
        assert_eq!(assemble_source(source).expect("assemble"), source);
    }

    #[test]
    fn rejects_unknown_and_malformed_includes() {
        assert_eq!(
            assemble_source("void a();\n#include \"fbm.glsl\"\n"),
            Err(IncludeError::Unknown {
                line: 2,
                name: "fbm.glsl".into()
            })
        );
        assert_eq!(
            assemble_source("#include simplex2d.glsl\n"),
            Err(IncludeError::Malformed { line: 1 })
        );
        assert_eq!(
            assemble_source("  #include \"\"\n"),
            Err(IncludeError::Malformed { line: 1 })
        );
    }

    #[test]
    fn chunks_may_not_include_each_other() {
        let chunks = [("a.glsl", "#include \"b.glsl\"\n"), ("b.glsl", "float b;\n")];
        assert_eq!(
            assemble_with("#include \"a.glsl\"\n", &chunks),
            Err(IncludeError::Nested {
                name: "a.glsl".into()
            })
        );
    }

    #[test]
    fn every_embedded_shader_assembles() {
        for source in [
            CLOUD_VERTEX,
            CLOUD_FRAGMENT,
            GENIE_VERTEX,
            GENIE_FRAGMENT,
            AURORA_VERTEX,
            AURORA_FRAGMENT,
        ] {
            let assembled = assemble_source(source).expect("assemble");
            assert!(assembled.starts_with("#version 450"));
            assert!(!assembled.contains("#include"));
        }
        let vertex = assemble_source(AURORA_VERTEX).expect("assemble");
        assert_eq!(vertex.matches("float snoise(vec2 v)").count(), 1);
    }

    #[test]
    fn uniform_blocks_match_across_stages() {
        let block = |source: &str, name: &str| -> String {
            let start = source.find(&format!("uniform {name} {{")).expect("block");
            let end = source[start..].find('}').expect("block end");
            source[start..start + end].to_string()
        };
        assert_eq!(block(CLOUD_VERTEX, "Frame"), block(CLOUD_FRAGMENT, "Frame"));
        assert_eq!(block(GENIE_VERTEX, "Frame"), block(GENIE_FRAGMENT, "Frame"));
        assert_eq!(block(AURORA_VERTEX, "Aurora"), block(AURORA_FRAGMENT, "Aurora"));
        assert_eq!(block(CLOUD_VERTEX, "Object"), block(AURORA_VERTEX, "Object"));
    }
}
