use std::f32::consts::TAU;

/// Number of vertices in the disc primitive.
pub const DISC_VERTEX_COUNT: u32 = 3;

/// Circumradius of the covering triangle, in unit-disc radii.
///
/// An equilateral triangle with circumradius 2 has inradius 1, so it is the
/// smallest triangle that fully contains the unit circle.
pub const DISC_CIRCUMRADIUS: f32 = 2.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Topology {
    TriangleList,
}

/// Static geometry shared by every instance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DiscGeometry {
    pub vertices: [[f32; 3]; DISC_VERTEX_COUNT as usize],
    pub topology: Topology,
}

impl DiscGeometry {
    /// Vertices at 0°, 120° and 240° on a radius-2 circle, `z = 0`.
    pub fn covering_triangle() -> Self {
        let mut vertices = [[0.0f32; 3]; DISC_VERTEX_COUNT as usize];
        for (i, v) in vertices.iter_mut().enumerate() {
            let angle = i as f32 / DISC_VERTEX_COUNT as f32 * TAU;
            *v = [angle.cos() * DISC_CIRCUMRADIUS, angle.sin() * DISC_CIRCUMRADIUS, 0.0];
        }
        Self { vertices, topology: Topology::TriangleList }
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        DISC_VERTEX_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn len2(v: [f32; 2]) -> f32 {
        (v[0] * v[0] + v[1] * v[1]).sqrt()
    }

    #[test]
    fn vertices_lie_on_radius_two_circle() {
        let g = DiscGeometry::covering_triangle();
        for v in g.vertices {
            assert!((len2([v[0], v[1]]) - 2.0).abs() < 1e-6);
            assert_eq!(v[2], 0.0);
        }
        assert_eq!(g.vertices[0], [2.0, 0.0, 0.0]);
    }

    #[test]
    fn edges_touch_the_unit_circle() {
        // Edge midpoints are the closest boundary points to the center.
        let v = DiscGeometry::covering_triangle().vertices;
        for i in 0..3 {
            let a = v[i];
            let b = v[(i + 1) % 3];
            let mid = [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5];
            assert!((len2(mid) - 1.0).abs() < 1e-5);
        }
    }
}
