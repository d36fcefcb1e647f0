use bytemuck::{Pod, Zeroable};

use crate::fp64::split_double;
use crate::layer::uniforms::{
    UniformSet, UniformValue, AMBIENT_RATIO, COORDINATE_ORIGIN, COORDINATE_SYSTEM, DIFFUSE_RATIO,
    LIGHTS_POSITION, LIGHTS_STRENGTH, NUMBER_OF_LIGHTS, PIXELS_PER_UNIT, RADIUS_PIXELS,
    SPECULAR_RATIO, VIEWPORT_SIZE, VIEW_PROJECTION,
};

/// Upper bound on packed lights; matches `MAX_LIGHTS` in `lighting.wgsl`.
pub const MAX_LIGHTS: usize = 16;

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// GPU layout of `LayerUniforms` in `project.wgsl` (448 bytes):
///
///  offset   0  view_projection   mat4x4<f32>
///  offset  64  viewport_size     vec2<f32>
///  offset  72  radius_pixels     f32
///  offset  76  coordinate_system u32
///  offset  80  origin_hi         vec2<f32>
///  offset  88  origin_lo         vec2<f32>
///  offset  96  pixels_per_unit   vec4<f32>
///  offset 112  lighting          vec4<f32>  (ambient, diffuse, specular, count)
///  offset 128  lights_position   array<vec4<f32>, 16>
///  offset 384  lights_strength   array<vec4<f32>, 4>   (16 packed scalars)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct DiscUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub viewport_size: [f32; 2],
    pub radius_pixels: f32,
    pub coordinate_system: u32,
    pub origin_hi: [f32; 2],
    pub origin_lo: [f32; 2],
    pub pixels_per_unit: [f32; 4],
    pub lighting: [f32; 4],
    pub lights_position: [[f32; 4]; MAX_LIGHTS],
    pub lights_strength: [[f32; 4]; MAX_LIGHTS / 4],
}

impl DiscUniforms {
    /// Packs named uniforms into the GPU block. Missing names use defaults.
    ///
    /// Lights beyond [`MAX_LIGHTS`] are dropped; the first time that happens a
    /// debug message is emitted.
    pub fn pack(set: &UniformSet, warned_light_overflow: &mut bool) -> Self {
        let get = |name: &str| set.get(name);

        let origin = get(COORDINATE_ORIGIN).and_then(UniformValue::as_dvec2).unwrap_or([0.0; 2]);
        let (ox_hi, ox_lo) = split_double(origin[0]);
        let (oy_hi, oy_lo) = split_double(origin[1]);

        let ppu = get(PIXELS_PER_UNIT).and_then(UniformValue::as_vec3).unwrap_or([1.0; 3]);

        let positions = get(LIGHTS_POSITION).and_then(UniformValue::as_vec3_array).unwrap_or(&[]);
        let strengths = get(LIGHTS_STRENGTH).and_then(UniformValue::as_float_array).unwrap_or(&[]);
        let requested = get(NUMBER_OF_LIGHTS)
            .and_then(UniformValue::as_i32)
            .map_or(0, |n| n.max(0) as usize)
            .min(positions.len());

        if requested > MAX_LIGHTS && !*warned_light_overflow {
            log::debug!("{requested} lights requested; only the first {MAX_LIGHTS} are used");
            *warned_light_overflow = true;
        }
        let count = requested.min(MAX_LIGHTS);

        let mut lights_position = [[0.0f32; 4]; MAX_LIGHTS];
        let mut lights_strength = [[0.0f32; 4]; MAX_LIGHTS / 4];
        for i in 0..count {
            let [x, y, z] = positions[i];
            lights_position[i] = [x, y, z, 1.0];
            lights_strength[i / 4][i % 4] = strengths.get(i).copied().unwrap_or(0.0);
        }

        let scalar = |name: &str, default: f32| get(name).and_then(UniformValue::as_f32).unwrap_or(default);

        Self {
            view_projection: get(VIEW_PROJECTION).and_then(UniformValue::as_mat4).unwrap_or(IDENTITY),
            viewport_size: get(VIEWPORT_SIZE).and_then(UniformValue::as_vec2).unwrap_or([1.0, 1.0]),
            radius_pixels: scalar(RADIUS_PIXELS, 10.0),
            coordinate_system: get(COORDINATE_SYSTEM)
                .and_then(UniformValue::as_i32)
                .map_or(0, |v| v.max(0) as u32),
            origin_hi: [ox_hi, oy_hi],
            origin_lo: [ox_lo, oy_lo],
            pixels_per_unit: [ppu[0], ppu[1], ppu[2], 0.0],
            lighting: [
                scalar(AMBIENT_RATIO, 1.0),
                scalar(DIFFUSE_RATIO, 0.0),
                scalar(SPECULAR_RATIO, 0.0),
                count as f32,
            ],
            lights_position,
            lights_strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_wgsl_block() {
        assert_eq!(std::mem::size_of::<DiscUniforms>(), 448);
        assert_eq!(std::mem::size_of::<DiscUniforms>() % 16, 0);
    }

    #[test]
    fn empty_set_packs_defaults() {
        let mut warned = false;
        let u = DiscUniforms::pack(&UniformSet::new(), &mut warned);
        assert_eq!(u.view_projection, IDENTITY);
        assert_eq!(u.radius_pixels, 10.0);
        assert_eq!(u.lighting, [1.0, 0.0, 0.0, 0.0]);
        assert!(!warned);
    }

    #[test]
    fn origin_is_split_into_hi_lo() {
        let lon = -122.419_415_532_1_f64;
        let mut set = UniformSet::new();
        set.set(COORDINATE_ORIGIN, UniformValue::DVec2([lon, 0.0]));

        let u = DiscUniforms::pack(&set, &mut false);
        assert_eq!((u.origin_hi[0], u.origin_lo[0]), split_double(lon));
    }

    #[test]
    fn strengths_are_packed_four_per_vec() {
        let mut set = UniformSet::new();
        set.set(LIGHTS_POSITION, UniformValue::Vec3Array(vec![[0.0, 0.0, 1.0]; 6]))
            .set(LIGHTS_STRENGTH, UniformValue::FloatArray(vec![1.0, 2.0, 3.0, 4.0, 5.0]))
            .set(NUMBER_OF_LIGHTS, UniformValue::Int(6));

        let u = DiscUniforms::pack(&set, &mut false);
        assert_eq!(u.lighting[3], 6.0);
        assert_eq!(u.lights_strength[0], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(u.lights_strength[1], [5.0, 0.0, 0.0, 0.0]);
        assert_eq!(u.lights_position[5], [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn excess_lights_are_dropped_once() {
        let mut set = UniformSet::new();
        set.set(LIGHTS_POSITION, UniformValue::Vec3Array(vec![[0.0; 3]; 20]))
            .set(NUMBER_OF_LIGHTS, UniformValue::Int(20));

        let mut warned = false;
        let u = DiscUniforms::pack(&set, &mut warned);
        assert_eq!(u.lighting[3], MAX_LIGHTS as f32);
        assert!(warned);
    }
}
