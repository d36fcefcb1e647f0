/// Numeric type of one buffer component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementType {
    Float32,
    UInt8,
}

impl ElementType {
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            ElementType::Float32 => 4,
            ElementType::UInt8 => 1,
        }
    }
}

/// Host-side per-instance buffer: a flat sequence of `N × components` values.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceBuffer {
    Float32(Vec<f32>),
    UInt8(Vec<u8>),
}

impl InstanceBuffer {
    /// Allocates `len` values of `element_type`, all set to `fill`.
    pub fn filled(element_type: ElementType, len: usize, fill: f64) -> Self {
        match element_type {
            ElementType::Float32 => InstanceBuffer::Float32(vec![fill as f32; len]),
            ElementType::UInt8 => InstanceBuffer::UInt8(vec![fill as u8; len]),
        }
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        match self {
            InstanceBuffer::Float32(_) => ElementType::Float32,
            InstanceBuffer::UInt8(_) => ElementType::UInt8,
        }
    }

    /// Number of scalar values (not instances).
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            InstanceBuffer::Float32(v) => v.len(),
            InstanceBuffer::UInt8(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            InstanceBuffer::Float32(v) => Some(v),
            InstanceBuffer::UInt8(_) => None,
        }
    }

    #[inline]
    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            InstanceBuffer::UInt8(v) => Some(v),
            InstanceBuffer::Float32(_) => None,
        }
    }

    /// Raw bytes for GPU upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            InstanceBuffer::Float32(v) => bytemuck::cast_slice(v),
            InstanceBuffer::UInt8(v) => v,
        }
    }
}
