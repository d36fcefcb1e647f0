//! GPU rendering backend.
//!
//! `DiscRenderer` consumes a layer's `DrawRequest` and issues the instanced
//! draw via wgpu. It owns its GPU resources (pipeline, uniform and vertex
//! buffers) and reuses them across frames.
//!
//! Convention:
//! - world positions are projected with the `viewProjection` uniform
//! - disc radius is in pixels, converted to clip space with the viewport size

mod common;
mod ctx;
mod disc;
mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use disc::DiscRenderer;
pub use uniforms::MAX_LIGHTS;
