//! Per-instance attribute buffers.
//!
//! Responsibilities:
//! - describe each attribute (width, element type, source accessor, compute fn)
//! - keep a name-keyed registry with dirty tracking
//! - rebuild dirty buffers over the whole dataset (O(N) per attribute, no deltas)

mod buffer;
mod descriptor;
mod registry;

pub mod computers;

pub use buffer::{ElementType, InstanceBuffer};
pub use descriptor::{Attribute, AttributeSpec, ComputeFn};
pub use registry::AttributeRegistry;
