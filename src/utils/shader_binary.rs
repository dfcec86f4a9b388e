use std::borrow::Cow;
use crate::error::SetupError;
use crate::renderer::wgpu_context::WgpuContext;

/// A pre-compiled shader handed over as an opaque stream of 32-bit words.
///
/// The words are passed to the backend untouched, it is the caller's job to
/// supply a binary in the backend's intermediate representation (SPIR-V).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderBinary {
    words: Vec<u32>,
}

impl ShaderBinary {
    /// Reinterprets a little-endian byte stream as a sequence of words.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SetupError> {
        if bytes.is_empty() {
            return Err(SetupError::EmptyShaderBinary);
        }
        if bytes.len() % 4 != 0 {
            return Err(SetupError::MisalignedShaderBinary { len: bytes.len() });
        }

        let words = bytes
            .chunks_exact(4)
            .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
            .collect();
        Ok(Self { words })
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn create_module(&self, wgpu_context: &WgpuContext, label: &str) -> wgpu::ShaderModule {
        wgpu_context.get_device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::SpirV(Cow::Borrowed(&self.words)),
        })
    }
}
