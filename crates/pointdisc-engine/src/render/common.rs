//! Shared GPU types and helpers for the disc renderer.

use bytemuck::{Pod, Zeroable};

use crate::attributes::computers::{COLORS, NORMALS, POSITIONS, POSITIONS_64_XY_LOW};
use crate::attributes::ElementType;

use super::uniforms::DiscUniforms;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── geometry vertex ───────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DiscVertex {
    pub pos: [f32; 3],
}

impl DiscVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DiscVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── instance attributes ───────────────────────────────────────────────────

/// Shader input location for a per-instance attribute.
///
/// Must match the `@location`s of `VertexInput` in the disc vertex shaders.
pub(super) fn shader_location(name: &str) -> Option<u32> {
    match name {
        POSITIONS => Some(1),
        NORMALS => Some(2),
        COLORS => Some(3),
        POSITIONS_64_XY_LOW => Some(4),
        _ => None,
    }
}

/// Vertex format for `size` components of `element_type`.
///
/// Byte attributes are normalized to `0..=1` in the shader. Every supported
/// format is a multiple of 4 bytes, as vertex strides and buffer writes require.
pub(super) fn vertex_format(element_type: ElementType, size: usize) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;
    match (element_type, size) {
        (ElementType::Float32, 1) => Some(F::Float32),
        (ElementType::Float32, 2) => Some(F::Float32x2),
        (ElementType::Float32, 3) => Some(F::Float32x3),
        (ElementType::Float32, 4) => Some(F::Float32x4),
        (ElementType::UInt8, 4) => Some(F::Unorm8x4),
        _ => None,
    }
}

// ── uniform binding size ──────────────────────────────────────────────────

/// `DiscUniforms` is a fixed 448-byte block, so its size is never zero.
pub(super) fn uniform_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<DiscUniforms>() as u64)
        .expect("DiscUniforms has non-zero size by construction")
}
