/// Initialization parameters for the headless GPU.
///
/// Keep this structure minimal. Add flags only when a concrete backend
/// requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the wgpu instance may use.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Accept a software adapter (e.g. llvmpipe) when no hardware one exists.
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// The disc renderer needs none; favor an empty set for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}
