use crate::attributes::{Attribute, AttributeRegistry, ElementType, InstanceBuffer};
use crate::model::{Model, Topology};

use super::uniforms::UniformSet;

/// One per-instance buffer bound to the draw.
#[derive(Debug, Clone, Copy)]
pub struct BoundBuffer<'a> {
    pub name: &'a str,
    pub size: usize,
    pub element_type: ElementType,
    pub data: &'a InstanceBuffer,
}

impl<'a> BoundBuffer<'a> {
    fn from_attribute<R>(attr: &'a Attribute<R>) -> Self {
        Self {
            name: attr.name(),
            size: attr.size(),
            element_type: attr.element_type(),
            data: attr.buffer(),
        }
    }

    /// Bytes per instance.
    #[inline]
    pub fn stride(&self) -> usize {
        self.size * self.element_type.byte_size()
    }
}

/// A single instanced draw: shared geometry × `instance_count` instances.
#[derive(Debug, Clone)]
pub struct DrawRequest<'a> {
    pub model: &'a Model,
    pub topology: Topology,
    pub vertex_count: u32,
    pub instance_count: u32,
    pub buffers: Vec<BoundBuffer<'a>>,
    pub uniforms: UniformSet,
}

impl<'a> DrawRequest<'a> {
    pub(super) fn new<R>(
        model: &'a Model,
        registry: &'a AttributeRegistry<R>,
        uniforms: UniformSet,
    ) -> Self {
        let geometry = model.geometry();
        Self {
            model,
            topology: geometry.topology,
            vertex_count: geometry.vertex_count(),
            instance_count: registry.instance_count() as u32,
            buffers: registry.iter().map(BoundBuffer::from_attribute).collect(),
            uniforms,
        }
    }

    #[inline]
    pub fn buffer(&self, name: &str) -> Option<&BoundBuffer<'a>> {
        self.buffers.iter().find(|b| b.name == name)
    }

    /// `true` when drawing would produce nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instance_count == 0
    }
}
