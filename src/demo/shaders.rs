use anyhow::Context;
use naga::back::spv;
use naga::valid::{Capabilities, ValidationFlags, Validator};

pub const COMPUTE_SHADER_WGSL: &str = include_str!("shaders/particle_compute.wgsl");
pub const VERTEX_SHADER_WGSL: &str = include_str!("shaders/particle_vertex.wgsl");
pub const FRAGMENT_SHADER_WGSL: &str = include_str!("shaders/particle_fragment.wgsl");

/// Compiles WGSL source to a little-endian SPIR-V byte stream.
pub fn compile_wgsl(source: &str) -> anyhow::Result<Vec<u8>> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|error| anyhow::anyhow!(error.emit_to_string(source)))?;
    let info = Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| anyhow::anyhow!("Shader validation failed: {}", error))?;

    // The device flips the coordinate space itself when it ingests SPIR-V
    let mut options = spv::Options::default();
    options.flags.remove(spv::WriterFlags::ADJUST_COORDINATE_SPACE);

    let words = spv::write_vec(&module, &info, &options, None).context("Failed to write SPIR-V")?;
    Ok(words.iter().flat_map(|word| word.to_le_bytes()).collect())
}

/// The three binaries the particle field is built from.
pub struct ShaderBlobs {
    pub compute: Vec<u8>,
    pub vertex: Vec<u8>,
    pub fragment: Vec<u8>,
}

impl ShaderBlobs {
    /// Compiles the bundled particle shaders.
    pub fn compile() -> anyhow::Result<Self> {
        Ok(Self {
            compute: compile_wgsl(COMPUTE_SHADER_WGSL).context("compute shader")?,
            vertex: compile_wgsl(VERTEX_SHADER_WGSL).context("vertex shader")?,
            fragment: compile_wgsl(FRAGMENT_SHADER_WGSL).context("fragment shader")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIRV_MAGIC: [u8; 4] = 0x0723_0203u32.to_le_bytes();

    #[test]
    fn bundled_shaders_compile_to_word_aligned_spirv() {
        let blobs = ShaderBlobs::compile().unwrap();
        for blob in [&blobs.compute, &blobs.vertex, &blobs.fragment] {
            assert_eq!(blob.len() % 4, 0);
            assert_eq!(&blob[..4], &SPIRV_MAGIC);
        }
    }

    #[test]
    fn invalid_wgsl_is_reported() {
        assert!(compile_wgsl("fn broken( {").is_err());
    }
}
