//! Pointdisc engine crate.
//!
//! Renders point clouds as camera-facing discs with one instanced draw call.
//! Positions may be single precision or, for geographic data, emulated double
//! precision (`f32` hi/lo pairs).

pub mod accessor;
pub mod attributes;
pub mod fp64;
pub mod layer;
pub mod model;
pub mod precision;

pub mod coords;
pub mod device;
pub mod logging;
pub mod render;

pub use accessor::{AccessorSet, Color, Normal, Position};
pub use layer::{DrawRequest, LayerConfig, LightingParams, PointCloudLayer, UniformSet, UniformValue};
pub use precision::{CoordinateSystem, PrecisionChange, PrecisionMode};
