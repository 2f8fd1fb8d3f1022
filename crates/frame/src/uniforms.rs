//! Uniform names the loop writes and the layouts of the two programs.

use modelview_shader::{ProgramLayout, UniformBlock, UniformKind};

pub const MODEL: &str = "model";
pub const VIEW: &str = "view";
pub const PROJECTION: &str = "projection";
pub const COLOR: &str = "color";

/// Textured model program: transforms only, diffuse texture per material.
pub fn model_program_layout() -> ProgramLayout {
    ProgramLayout::new(UniformBlock::new([
        (MODEL, UniformKind::Mat4),
        (VIEW, UniformKind::Mat4),
        (PROJECTION, UniformKind::Mat4),
    ]))
    .textured()
}

/// Flat-colored light marker program.
pub fn light_program_layout() -> ProgramLayout {
    ProgramLayout::new(UniformBlock::new([
        (MODEL, UniformKind::Mat4),
        (VIEW, UniformKind::Mat4),
        (PROJECTION, UniformKind::Mat4),
        (COLOR, UniformKind::Vec3),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/shaders");

    /// Parses and validates a WGSL stage, returning the members and size of
    /// its uniform struct if it declares one.
    fn wgsl_uniform_block(path: &str) -> Option<(Vec<(String, u32)>, u32)> {
        let source = std::fs::read_to_string(path).unwrap();
        let module = naga::front::wgsl::parse_str(&source)
            .unwrap_or_else(|e| panic!("{path}: {}", e.emit_to_string(&source)));
        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{path}: {e:?}"));

        let (_, global) = module
            .global_variables
            .iter()
            .find(|(_, g)| g.space == naga::AddressSpace::Uniform)?;
        match &module.types[global.ty].inner {
            naga::TypeInner::Struct { members, span } => Some((
                members
                    .iter()
                    .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
                    .collect(),
                *span,
            )),
            other => panic!("{path}: uniform is not a struct: {other:?}"),
        }
    }

    #[test]
    fn bundled_wgsl_matches_host_layouts() {
        let mut blocks = 0;
        for (name, layout) in [
            ("model", model_program_layout()),
            ("light_cube", light_program_layout()),
        ] {
            for stage in ["vert", "frag"] {
                let path = format!("{SHADER_DIR}/{name}.{stage}.wgsl");
                let Some((members, size)) = wgsl_uniform_block(&path) else {
                    continue;
                };
                blocks += 1;
                assert_eq!(size, layout.uniforms.size(), "{path}");
                assert_eq!(members.len(), layout.uniforms.len(), "{path}");
                for (member, offset) in members {
                    assert_eq!(
                        layout.uniforms.location(&member).map(|l| l.offset),
                        Some(offset),
                        "{path}: {member}"
                    );
                }
            }
        }
        // The textured fragment stage reads no uniforms.
        assert_eq!(blocks, 3);
    }

    #[test]
    fn layouts_declare_loop_uniforms() {
        let model = model_program_layout();
        assert!(model.textured);
        for name in [MODEL, VIEW, PROJECTION] {
            assert!(model.uniforms.location(name).is_some());
        }
        let light = light_program_layout();
        assert!(!light.textured);
        assert_eq!(light.uniforms.location(COLOR).unwrap().offset, 192);
        assert_eq!(light.uniforms.size(), 208);
    }
}
