use std::fmt;

use crate::accessor::{AccessorKey, AccessorSet};

use super::{ElementType, InstanceBuffer};

/// Fills one attribute buffer from the whole dataset.
///
/// Must return exactly `data.len() × size` values of the attribute's element
/// type, in dataset order.
pub type ComputeFn<R> = fn(&[R], &AccessorSet<R>) -> InstanceBuffer;

/// Shape and source of a registered attribute.
///
/// `size` (components per instance) and `element_type` are fixed for the
/// attribute's lifetime; only buffer contents change on recompute.
pub struct AttributeSpec<R> {
    pub size: usize,
    pub element_type: ElementType,
    pub accessor: AccessorKey,
    pub compute: ComputeFn<R>,
    /// Value the buffer is filled with before its first recompute.
    pub default_value: Option<f64>,
}

impl<R> fmt::Debug for AttributeSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("size", &self.size)
            .field("element_type", &self.element_type)
            .field("accessor", &self.accessor)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}

/// Registered attribute: `AttributeSpec` + current buffer + dirty flag.
#[derive(Debug)]
pub struct Attribute<R> {
    name: String,
    spec: AttributeSpec<R>,
    buffer: InstanceBuffer,
    dirty: bool,
}

impl<R> Attribute<R> {
    pub(super) fn new(name: String, spec: AttributeSpec<R>, instance_count: usize) -> Self {
        let buffer = InstanceBuffer::filled(
            spec.element_type,
            instance_count * spec.size,
            spec.default_value.unwrap_or(0.0),
        );
        Self { name, spec, buffer, dirty: true }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.spec.size
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.spec.element_type
    }

    #[inline]
    pub fn accessor(&self) -> AccessorKey {
        self.spec.accessor
    }

    #[inline]
    pub fn default_value(&self) -> Option<f64> {
        self.spec.default_value
    }

    #[inline]
    pub fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub(super) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Bytes between consecutive instances.
    #[inline]
    pub fn stride(&self) -> usize {
        self.spec.size * self.spec.element_type.byte_size()
    }

    /// Runs the compute function into a fresh buffer and swaps it in.
    ///
    /// Output that disagrees with the declared size or type is rejected: the
    /// previous buffer is kept and the attribute stays dirty.
    pub(super) fn recompute(&mut self, data: &[R], accessors: &AccessorSet<R>) -> bool {
        let fresh = (self.spec.compute)(data, accessors);
        let expected = data.len() * self.spec.size;

        if fresh.element_type() != self.spec.element_type || fresh.len() != expected {
            log::error!(
                "attribute `{}` produced {} {:?} values, expected {} {:?}; keeping previous buffer",
                self.name,
                fresh.len(),
                fresh.element_type(),
                expected,
                self.spec.element_type,
            );
            return false;
        }

        self.buffer = fresh;
        self.dirty = false;
        true
    }
}
