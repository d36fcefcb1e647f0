//! Attribute compute functions.
//!
//! Each function maps the full dataset through one accessor into a flat buffer
//! of fixed width, in dataset order: values `[i * size, (i + 1) * size)` belong
//! to draw instance `i`.

use crate::accessor::{coalesce, coalesce_f64, AccessorKey, AccessorSet};
use crate::fp64::low_part;

use super::{AttributeSpec, ElementType, InstanceBuffer};

pub const POSITIONS: &str = "instance_positions";
pub const POSITIONS_64_XY_LOW: &str = "instance_positions64xy_low";
pub const NORMALS: &str = "instance_normals";
pub const COLORS: &str = "instance_colors";

pub const DEFAULT_Z: f64 = 0.0;
pub const DEFAULT_NORMAL_COMPONENT: f32 = 1.0;
pub const DEFAULT_ALPHA: f32 = 255.0;

/// `(x, y, z)` per record, `z` defaulting to `0`.
pub fn compute_positions<R>(data: &[R], accessors: &AccessorSet<R>) -> InstanceBuffer {
    let mut value = Vec::with_capacity(data.len() * 3);
    for record in data {
        let p = accessors.position(record);
        value.push(p.x as f32);
        value.push(p.y as f32);
        value.push(coalesce_f64(p.z, DEFAULT_Z) as f32);
    }
    InstanceBuffer::Float32(value)
}

/// Low halves of the `(x, y)` float pairs.
pub fn compute_positions_64xy_low<R>(data: &[R], accessors: &AccessorSet<R>) -> InstanceBuffer {
    let mut value = Vec::with_capacity(data.len() * 2);
    for record in data {
        let p = accessors.position(record);
        value.push(low_part(p.x));
        value.push(low_part(p.y));
    }
    InstanceBuffer::Float32(value)
}

/// `(nx, ny, nz)` per record, missing components defaulting to `1`.
pub fn compute_normals<R>(data: &[R], accessors: &AccessorSet<R>) -> InstanceBuffer {
    let mut value = Vec::with_capacity(data.len() * 3);
    for record in data {
        let n = accessors.normal(record);
        value.extend(n.0.iter().map(|&c| coalesce(c, DEFAULT_NORMAL_COMPONENT)));
    }
    InstanceBuffer::Float32(value)
}

/// `(r, g, b, a)` bytes per record, alpha defaulting to `255`.
///
/// Channels are not range-checked; out-of-range values saturate in the `u8`
/// conversion.
pub fn compute_colors<R>(data: &[R], accessors: &AccessorSet<R>) -> InstanceBuffer {
    let mut value = Vec::with_capacity(data.len() * 4);
    for record in data {
        let c = accessors.color(record);
        value.push(c.r as u8);
        value.push(c.g as u8);
        value.push(c.b as u8);
        value.push(coalesce(c.a, DEFAULT_ALPHA) as u8);
    }
    InstanceBuffer::UInt8(value)
}

pub fn positions_spec<R>() -> AttributeSpec<R> {
    AttributeSpec {
        size: 3,
        element_type: ElementType::Float32,
        accessor: AccessorKey::Position,
        compute: compute_positions::<R>,
        default_value: Some(DEFAULT_Z),
    }
}

pub fn positions_64xy_low_spec<R>() -> AttributeSpec<R> {
    AttributeSpec {
        size: 2,
        element_type: ElementType::Float32,
        accessor: AccessorKey::Position,
        compute: compute_positions_64xy_low::<R>,
        default_value: Some(0.0),
    }
}

pub fn normals_spec<R>() -> AttributeSpec<R> {
    AttributeSpec {
        size: 3,
        element_type: ElementType::Float32,
        accessor: AccessorKey::Normal,
        compute: compute_normals::<R>,
        default_value: Some(DEFAULT_NORMAL_COMPONENT as f64),
    }
}

pub fn colors_spec<R>() -> AttributeSpec<R> {
    AttributeSpec {
        size: 4,
        element_type: ElementType::UInt8,
        accessor: AccessorKey::Color,
        compute: compute_colors::<R>,
        default_value: Some(DEFAULT_ALPHA as f64),
    }
}

/// Attributes every layer carries regardless of precision mode.
pub fn standard_attributes<R>() -> Vec<(&'static str, AttributeSpec<R>)> {
    vec![
        (POSITIONS, positions_spec()),
        (NORMALS, normals_spec()),
        (COLORS, colors_spec()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{Color, Normal, Position};
    use crate::fp64::split_double;

    struct Pt {
        pos: Position,
        normal: Normal,
        color: Color,
    }

    fn accessors() -> AccessorSet<Pt> {
        AccessorSet::new(|p: &Pt| p.pos)
            .with_normal(|p: &Pt| p.normal)
            .with_color(|p: &Pt| p.color)
    }

    fn pt(pos: Position) -> Pt {
        Pt { pos, normal: Normal::MISSING, color: Color::rgb(1.0, 2.0, 3.0) }
    }

    // ── lengths ───────────────────────────────────────────────────────────

    #[test]
    fn buffer_lengths_scale_with_instance_count() {
        let acc = accessors();
        for n in [0usize, 1, 7] {
            let data: Vec<Pt> = (0..n).map(|i| pt(Position::xy(i as f64, 0.0))).collect();
            assert_eq!(compute_positions(&data, &acc).len(), 3 * n);
            assert_eq!(compute_normals(&data, &acc).len(), 3 * n);
            assert_eq!(compute_colors(&data, &acc).len(), 4 * n);
            assert_eq!(compute_positions_64xy_low(&data, &acc).len(), 2 * n);
        }
    }

    // ── positions ─────────────────────────────────────────────────────────

    #[test]
    fn positions_default_missing_z_to_zero() {
        let data = vec![pt(Position::xy(1.0, 2.0)), pt(Position::xyz(4.0, 5.0, 6.0))];
        let buf = compute_positions(&data, &accessors());
        assert_eq!(buf.as_f32(), Some(&[1.0f32, 2.0, 0.0, 4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn low_positions_hold_split_remainders() {
        let data = vec![pt(Position::xy(-122.419_415_532_1, 37.774_929_123_4))];
        let buf = compute_positions_64xy_low(&data, &accessors());
        let lo = buf.as_f32().unwrap();
        assert_eq!(lo[0], split_double(-122.419_415_532_1).1);
        assert_eq!(lo[1], split_double(37.774_929_123_4).1);
    }

    // ── normals ───────────────────────────────────────────────────────────

    #[test]
    fn normals_default_each_missing_component_to_one() {
        let mut p = pt(Position::xy(0.0, 0.0));
        p.normal = Normal([Some(0.0), None, Some(f32::NAN)]);
        let buf = compute_normals(&[p], &accessors());
        assert_eq!(buf.as_f32(), Some(&[0.0f32, 1.0, 1.0][..]));
    }

    // ── colors ────────────────────────────────────────────────────────────

    #[test]
    fn colors_default_alpha_to_opaque() {
        let mut a = pt(Position::xy(0.0, 0.0));
        a.color = Color::rgb(10.0, 20.0, 30.0);
        let mut b = pt(Position::xy(0.0, 0.0));
        b.color = Color::rgba(1.0, 2.0, 3.0, f32::NAN);
        let mut c = pt(Position::xy(0.0, 0.0));
        c.color = Color::rgba(1.0, 2.0, 3.0, 128.0);

        let buf = compute_colors(&[a, b, c], &accessors());
        assert_eq!(
            buf.as_u8(),
            Some(&[10u8, 20, 30, 255, 1, 2, 3, 255, 1, 2, 3, 128][..])
        );
    }

    #[test]
    fn colors_are_not_validated_beyond_byte_conversion() {
        let mut p = pt(Position::xy(0.0, 0.0));
        p.color = Color::rgba(300.0, -5.0, 12.9, 255.0);
        let buf = compute_colors(&[p], &accessors());
        assert_eq!(buf.as_u8(), Some(&[255u8, 0, 12, 255][..]));
    }
}
