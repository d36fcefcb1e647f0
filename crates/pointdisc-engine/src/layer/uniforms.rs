use std::collections::BTreeMap;

pub const VIEW_PROJECTION: &str = "viewProjection";
pub const VIEWPORT_SIZE: &str = "viewportSize";
pub const COORDINATE_ORIGIN: &str = "coordinateOrigin";
pub const COORDINATE_SYSTEM: &str = "coordinateSystem";
pub const PIXELS_PER_UNIT: &str = "pixelsPerUnit";
pub const RADIUS_PIXELS: &str = "radiusPixels";
pub const LIGHTS_POSITION: &str = "lightsPosition";
pub const LIGHTS_STRENGTH: &str = "lightsStrength";
pub const NUMBER_OF_LIGHTS: &str = "numberOfLights";
pub const AMBIENT_RATIO: &str = "ambientRatio";
pub const DIFFUSE_RATIO: &str = "diffuseRatio";
pub const SPECULAR_RATIO: &str = "specularRatio";

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    /// Double-precision pair, split into `(hi, lo)` floats when packed.
    DVec2([f64; 2]),
    Vec3([f32; 3]),
    /// Column-major 4×4 matrix.
    Mat4([[f32; 4]; 4]),
    FloatArray(Vec<f32>),
    Vec3Array(Vec<[f32; 3]>),
}

impl UniformValue {
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            UniformValue::Float(v) => Some(v),
            UniformValue::Int(v) => Some(v as f32),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            UniformValue::Int(v) => Some(v),
            UniformValue::Float(v) => Some(v as i32),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match *self {
            UniformValue::Vec2(v) => Some(v),
            UniformValue::DVec2([x, y]) => Some([x as f32, y as f32]),
            _ => None,
        }
    }

    pub fn as_dvec2(&self) -> Option<[f64; 2]> {
        match *self {
            UniformValue::DVec2(v) => Some(v),
            UniformValue::Vec2([x, y]) => Some([x as f64, y as f64]),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match *self {
            UniformValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mat4(&self) -> Option<[[f32; 4]; 4]> {
        match *self {
            UniformValue::Mat4(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            UniformValue::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3_array(&self) -> Option<&[[f32; 3]]> {
        match self {
            UniformValue::Vec3Array(v) => Some(v),
            _ => None,
        }
    }
}

/// Named uniform values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    values: BTreeMap<String, UniformValue>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: UniformValue) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Sets `name` only if it has no value yet.
    pub fn set_default(&mut self, name: impl Into<String>, value: UniformValue) -> &mut Self {
        self.values.entry(name.into()).or_insert(value);
        self
    }

    /// Copies every value of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &UniformSet) -> &mut Self {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
        self
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<N: Into<String>> FromIterator<(N, UniformValue)> for UniformSet {
    fn from_iter<I: IntoIterator<Item = (N, UniformValue)>>(iter: I) -> Self {
        let mut set = UniformSet::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}
