use wgpu::{BindGroup, BindGroupLayout};
use crate::particles::particle_buffers::{BufferPair, PairId, ParticleBuffers};
use crate::particles::particle_integration::{
    READ_POSITION_BINDING, READ_VELOCITY_BINDING, SIM_PARAMS_BINDING, WRITE_POSITION_BINDING,
    WRITE_VELOCITY_BINDING,
};
use crate::renderer::wgpu_context::WgpuContext;

/// Which pair a compute dispatch reads from and which it writes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComputeDirection {
    AToB,
    BToA,
}

impl ComputeDirection {
    pub fn source(self) -> PairId {
        match self {
            ComputeDirection::AToB => PairId::A,
            ComputeDirection::BToA => PairId::B,
        }
    }

    pub fn target(self) -> PairId {
        self.source().other()
    }
}

/// The two compute bind groups, built once and never modified.
pub struct BindGroupSet {
    a_to_b: BindGroup,
    b_to_a: BindGroup,
}

impl BindGroupSet {
    pub fn new(wgpu_context: &WgpuContext, bind_group_layout: &BindGroupLayout, particle_buffers: &ParticleBuffers) -> Self {
        let pair_a = particle_buffers.pair(PairId::A);
        let pair_b = particle_buffers.pair(PairId::B);
        let sim_params = particle_buffers.sim_params().buffer();

        Self {
            a_to_b: Self::create_bind_group(wgpu_context, "Compute bind group A->B", bind_group_layout, pair_a, pair_b, sim_params),
            b_to_a: Self::create_bind_group(wgpu_context, "Compute bind group B->A", bind_group_layout, pair_b, pair_a, sim_params),
        }
    }

    pub fn get(&self, direction: ComputeDirection) -> &BindGroup {
        match direction {
            ComputeDirection::AToB => &self.a_to_b,
            ComputeDirection::BToA => &self.b_to_a,
        }
    }

    fn create_bind_group(
        wgpu_context: &WgpuContext,
        label: &str,
        bind_group_layout: &BindGroupLayout,
        source: &BufferPair,
        target: &BufferPair,
        sim_params: &wgpu::Buffer,
    ) -> BindGroup {
        wgpu_context.get_device().create_bind_group(
            &wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: READ_POSITION_BINDING,
                        resource: source.positions.buffer().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: READ_VELOCITY_BINDING,
                        resource: source.velocities.buffer().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: WRITE_POSITION_BINDING,
                        resource: target.positions.buffer().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: WRITE_VELOCITY_BINDING,
                        resource: target.velocities.buffer().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: SIM_PARAMS_BINDING,
                        resource: sim_params.as_entire_binding(),
                    },
                ],
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_read_one_pair_and_write_the_other() {
        assert_eq!(ComputeDirection::AToB.source(), PairId::A);
        assert_eq!(ComputeDirection::AToB.target(), PairId::B);
        assert_eq!(ComputeDirection::BToA.source(), PairId::B);
        assert_eq!(ComputeDirection::BToA.target(), PairId::A);
    }
}
