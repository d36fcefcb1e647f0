//! Per-record accessors.
//!
//! The layer never inspects a record structurally. Everything it knows about a
//! point comes through the three functions of an [`AccessorSet`], which must be
//! deterministic and side-effect-free for the duration of a frame.

use std::fmt;

/// Position returned by a position accessor.
///
/// Geographic datasets use `x = longitude`, `y = latitude` (degrees). `z` is
/// optional; buffers substitute `0` when it is absent.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Position {
    #[inline]
    pub const fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    #[inline]
    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

impl From<[f64; 2]> for Position {
    #[inline]
    fn from([x, y]: [f64; 2]) -> Self {
        Self::xy(x, y)
    }
}

impl From<[f64; 3]> for Position {
    #[inline]
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::xyz(x, y, z)
    }
}

/// Surface normal returned by a normal accessor.
///
/// Each component may be absent. Absent and NaN components become `1` in the
/// normal buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Normal(pub [Option<f32>; 3]);

impl Normal {
    /// A record without a normal.
    pub const MISSING: Normal = Normal([None; 3]);
}

impl From<[f32; 3]> for Normal {
    #[inline]
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self([Some(x), Some(y), Some(z)])
    }
}

/// RGBA color in `0..=255` units.
///
/// Alpha is optional; absent or NaN alpha becomes fully opaque (`255`).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: Option<f32>,
}

impl Color {
    /// Color used when no color accessor is supplied.
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: Some(255.0) };

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: None }
    }

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a: Some(a) }
    }
}

impl From<[u8; 3]> for Color {
    #[inline]
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r as f32, g as f32, b as f32)
    }
}

impl From<[u8; 4]> for Color {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r as f32, g as f32, b as f32, a as f32)
    }
}

/// Returns `value` when it is present and a number, otherwise `default`.
///
/// All buffer default substitution goes through here.
#[inline]
pub fn coalesce(value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => default,
    }
}

/// `f64` variant of [`coalesce`], used for positions.
#[inline]
pub fn coalesce_f64(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => default,
    }
}

pub type PositionFn<R> = Box<dyn Fn(&R) -> Position>;
pub type NormalFn<R> = Box<dyn Fn(&R) -> Normal>;
pub type ColorFn<R> = Box<dyn Fn(&R) -> Color>;

/// Capability struct holding one extraction function per attribute source.
///
/// ```ignore
/// let accessors = AccessorSet::new(|p: &Point| Position::from(p.lnglat))
///     .with_color(|p: &Point| Color::from(p.rgb));
/// ```
pub struct AccessorSet<R> {
    pub get_position: PositionFn<R>,
    pub get_normal: NormalFn<R>,
    pub get_color: ColorFn<R>,
}

impl<R> AccessorSet<R> {
    /// Creates an accessor set with the default normal ([`Normal::MISSING`])
    /// and color ([`Color::BLACK`]) accessors.
    pub fn new(get_position: impl Fn(&R) -> Position + 'static) -> Self {
        Self {
            get_position: Box::new(get_position),
            get_normal: Box::new(|_| Normal::MISSING),
            get_color: Box::new(|_| Color::BLACK),
        }
    }

    pub fn with_normal(mut self, get_normal: impl Fn(&R) -> Normal + 'static) -> Self {
        self.get_normal = Box::new(get_normal);
        self
    }

    pub fn with_color(mut self, get_color: impl Fn(&R) -> Color + 'static) -> Self {
        self.get_color = Box::new(get_color);
        self
    }

    #[inline]
    pub fn position(&self, record: &R) -> Position {
        (self.get_position)(record)
    }

    #[inline]
    pub fn normal(&self, record: &R) -> Normal {
        (self.get_normal)(record)
    }

    #[inline]
    pub fn color(&self, record: &R) -> Color {
        (self.get_color)(record)
    }
}

impl<R> fmt::Debug for AccessorSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorSet").finish_non_exhaustive()
    }
}

/// Identifies which accessor feeds an attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AccessorKey {
    Position,
    Normal,
    Color,
}
