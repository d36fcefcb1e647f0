use crate::precision::{CoordinateSystem, PrecisionConfig};

use super::uniforms::{
    UniformSet, UniformValue, AMBIENT_RATIO, DIFFUSE_RATIO, LIGHTS_POSITION, LIGHTS_STRENGTH,
    NUMBER_OF_LIGHTS, SPECULAR_RATIO,
};

/// Layer configuration supplied by the host each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    /// Request emulated double precision. Only honored for geographic data.
    pub high_precision_requested: bool,

    pub coordinate_system: CoordinateSystem,

    /// Disc radius in pixels.
    pub radius_pixels: f32,

    pub lighting: LightingParams,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            high_precision_requested: false,
            coordinate_system: CoordinateSystem::Cartesian,
            radius_pixels: 10.0,
            lighting: LightingParams::default(),
        }
    }
}

impl LayerConfig {
    #[inline]
    pub fn precision(&self) -> PrecisionConfig {
        PrecisionConfig::new(self.high_precision_requested, self.coordinate_system)
    }
}

/// Point-light parameters.
///
/// Light positions are in the same world space the vertex shader projects
/// instance positions into.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingParams {
    pub positions: Vec<[f32; 3]>,
    pub ambient_ratio: f32,
    pub diffuse_ratio: f32,
    pub specular_ratio: f32,
    pub strengths: Vec<f32>,
    /// Number of active lights; clamped to `positions.len()` when packed.
    pub count: u32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            positions: vec![[0.0, 0.0, 1000.0]],
            ambient_ratio: 0.35,
            diffuse_ratio: 0.6,
            specular_ratio: 0.8,
            strengths: vec![1.0],
            count: 1,
        }
    }
}

impl LightingParams {
    /// Lighting uniforms under the shader's uniform names.
    pub fn to_uniforms(&self) -> UniformSet {
        let count = (self.count as usize).min(self.positions.len());
        let mut set = UniformSet::new();
        set.set(LIGHTS_POSITION, UniformValue::Vec3Array(self.positions.clone()))
            .set(LIGHTS_STRENGTH, UniformValue::FloatArray(self.strengths.clone()))
            .set(NUMBER_OF_LIGHTS, UniformValue::Int(count as i32))
            .set(AMBIENT_RATIO, UniformValue::Float(self.ambient_ratio))
            .set(DIFFUSE_RATIO, UniformValue::Float(self.diffuse_ratio))
            .set(SPECULAR_RATIO, UniformValue::Float(self.specular_ratio));
        set
    }
}
