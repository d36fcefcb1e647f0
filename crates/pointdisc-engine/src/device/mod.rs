//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - allocating offscreen color targets for rendering

mod headless;
mod init;

pub use headless::{ColorTarget, HeadlessGpu};
pub use init::GpuInit;
