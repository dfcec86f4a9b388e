use wgpu::{BindGroup, CommandEncoder};
use crate::error::SetupError;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::{pop_backend_error, shader_binary::ShaderBinary};

pub struct ComputeShader {
    pipeline: wgpu::ComputePipeline,
    workgroup_size: (u32, u32, u32),
}

impl ComputeShader {
    /// Builds a compute pipeline with a single bind group from a pre-compiled binary.
    ///
    /// Shader and pipeline errors reported by the backend are returned as-is.
    pub async fn new(
        wgpu_context: &WgpuContext,
        shader_binary: &ShaderBinary,
        entry_point: &str,
        bind_group_layout: &wgpu::BindGroupLayout,
        workgroup_size: (u32, u32, u32),
    ) -> Result<Self, SetupError> {
        let device = wgpu_context.get_device();
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let compute_shader = shader_binary.create_module(wgpu_context, &format!("Compute shader {}", entry_point));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("Compute Pipeline Layout for {}", entry_point)),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&format!("Compute Pipeline for {}", entry_point)),
            layout: Some(&pipeline_layout),
            module: &compute_shader,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        pop_backend_error(wgpu_context).await?;
        log::debug!("Created compute pipeline for {}", entry_point);

        Ok(Self {
            pipeline,
            workgroup_size,
        })
    }

    /// Dispatches the compute shader.
    pub fn dispatch(
        &self,
        encoder: &mut CommandEncoder,
        dispatch_size: (u32, u32, u32),
        bind_group: &BindGroup,
    ) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Particle integration pass"),
            timestamp_writes: None,
        });

        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);
        compute_pass.dispatch_workgroups(dispatch_size.0, dispatch_size.1, dispatch_size.2);
    }

    /// A helper function to dispatch based on the total number of items to process.
    pub fn dispatch_by_items(
        &self,
        encoder: &mut CommandEncoder,
        item_count: (u32, u32, u32),
        bind_group: &BindGroup,
    ) {
        self.dispatch(encoder, self.workgroups_for(item_count), bind_group);
    }

    pub fn workgroups_for(&self, item_count: (u32, u32, u32)) -> (u32, u32, u32) {
        (
            item_count.0.div_ceil(self.workgroup_size.0),
            item_count.1.div_ceil(self.workgroup_size.1),
            item_count.2.div_ceil(self.workgroup_size.2),
        )
    }
}
