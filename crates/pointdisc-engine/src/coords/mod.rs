//! Screen-space types shared by the renderer.

mod viewport;

pub use viewport::Viewport;
