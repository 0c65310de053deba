//! View-frustum polygon clipping
//!
//! Sutherland-Hodgman: the polygon is clipped against one plane at a time,
//! each pass feeding the next. Clipping a triangle against the six convex
//! frustum planes can only grow it to a bounded vertex count, so the polygon
//! is a fixed-capacity container; the cap is still checked defensively.

use crate::math::{Vec2, Vec3};
use crate::MAX_POLY_VERTICES;
use log::warn;

/// A clip plane: a point on the plane and a normal pointing toward the
/// frustum interior ("inside" is a positive dot product).
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Classification value for a vertex; > 0 means inside the half-space
    pub fn side(&self, v: Vec3) -> f32 {
        (v - self.point).dot(self.normal)
    }
}

/// The six frustum planes, immutable per-frame configuration derived from
/// the field of view and the near/far distances.
///
/// Plane order is the clip order: left, right, top, bottom, near, far.
/// The four side planes pass through the origin; near and far sit on the
/// z axis at their respective distances.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn new(fov_x: f32, fov_y: f32, z_near: f32, z_far: f32) -> Self {
        let cos_half_x = (fov_x / 2.0).cos();
        let sin_half_x = (fov_x / 2.0).sin();
        let cos_half_y = (fov_y / 2.0).cos();
        let sin_half_y = (fov_y / 2.0).sin();

        Self {
            planes: [
                // left
                Plane::new(Vec3::ZERO, Vec3::new(cos_half_x, 0.0, sin_half_x)),
                // right
                Plane::new(Vec3::ZERO, Vec3::new(-cos_half_x, 0.0, sin_half_x)),
                // top
                Plane::new(Vec3::ZERO, Vec3::new(0.0, -cos_half_y, sin_half_y)),
                // bottom
                Plane::new(Vec3::ZERO, Vec3::new(0.0, cos_half_y, sin_half_y)),
                // near
                Plane::new(Vec3::new(0.0, 0.0, z_near), Vec3::new(0.0, 0.0, 1.0)),
                // far
                Plane::new(Vec3::new(0.0, 0.0, z_far), Vec3::new(0.0, 0.0, -1.0)),
            ],
        }
    }
}

/// A clipped sub-triangle with its interpolated texture coordinates
#[derive(Debug, Clone, Copy)]
pub struct ClippedTriangle {
    pub points: [Vec3; 3],
    pub texcoords: [Vec2; 3],
}

/// An ordered, capacity-bounded polygon: vertex positions and texture
/// coordinates in parallel, always the same length.
#[derive(Debug, Clone, Copy)]
pub struct Polygon {
    vertices: [Vec3; MAX_POLY_VERTICES],
    texcoords: [Vec2; MAX_POLY_VERTICES],
    len: usize,
}

impl Polygon {
    pub fn empty() -> Self {
        Self {
            vertices: [Vec3::ZERO; MAX_POLY_VERTICES],
            texcoords: [Vec2::default(); MAX_POLY_VERTICES],
            len: 0,
        }
    }

    pub fn from_triangle(points: [Vec3; 3], texcoords: [Vec2; 3]) -> Self {
        let mut poly = Self::empty();
        for i in 0..3 {
            poly.push(points[i], texcoords[i]);
        }
        poly
    }

    /// Build from vertex/texcoord pairs, capping at the polygon capacity
    pub fn from_vertices(vertices: &[(Vec3, Vec2)]) -> Self {
        let mut poly = Self::empty();
        for &(v, uv) in vertices {
            poly.push(v, uv);
        }
        poly
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn vertex(&self, i: usize) -> Vec3 {
        self.vertices[i]
    }

    pub fn texcoord(&self, i: usize) -> Vec2 {
        self.texcoords[i]
    }

    /// Append a vertex. At capacity the vertex is dropped and reported
    /// rather than overrunning the fixed storage.
    fn push(&mut self, v: Vec3, uv: Vec2) {
        if self.len == MAX_POLY_VERTICES {
            warn!("polygon vertex cap ({MAX_POLY_VERTICES}) reached, dropping vertex");
            return;
        }
        self.vertices[self.len] = v;
        self.texcoords[self.len] = uv;
        self.len += 1;
    }

    /// Clip against a single plane, returning the inside polygon.
    ///
    /// Walks adjacent vertex pairs (wrapping). When an edge crosses the
    /// plane the intersection at `t = prev_dot / (prev_dot - cur_dot)` is
    /// emitted with both position and texture coordinates interpolated;
    /// every inside vertex is emitted as-is. When the two dot products are
    /// exactly equal across a sign change there is no t to compute and the
    /// intersection vertex is skipped; the surrounding algorithm tolerates
    /// the dropped boundary vertex.
    pub fn clip_against_plane(&self, plane: &Plane) -> Polygon {
        let mut inside = Polygon::empty();
        if self.len == 0 {
            return inside;
        }

        let mut prev = self.len - 1;
        let mut prev_dot = plane.side(self.vertices[prev]);

        for cur in 0..self.len {
            let cur_dot = plane.side(self.vertices[cur]);

            // Opposite signs: the edge from prev to cur crosses the plane
            if cur_dot * prev_dot < 0.0 {
                if prev_dot - cur_dot != 0.0 {
                    let t = prev_dot / (prev_dot - cur_dot);
                    inside.push(
                        self.vertices[prev].lerp(self.vertices[cur], t),
                        self.texcoords[prev].lerp(self.texcoords[cur], t),
                    );
                } else {
                    warn!("clip: equal dot products across an edge, skipping intersection");
                }
            }

            if cur_dot > 0.0 {
                inside.push(self.vertices[cur], self.texcoords[cur]);
            }

            prev_dot = cur_dot;
            prev = cur;
        }

        inside
    }

    /// Clip against all six frustum planes in order. A polygon that becomes
    /// empty on any plane stays empty for the rest.
    pub fn clip(&self, frustum: &Frustum) -> Polygon {
        let mut poly = *self;
        for plane in &frustum.planes {
            if poly.is_empty() {
                break;
            }
            poly = poly.clip_against_plane(plane);
        }
        poly
    }

    /// Fan triangulation from vertex 0: N vertices yield exactly N-2
    /// triangles (0, i+1, i+2). A 3-vertex polygon yields itself.
    pub fn triangulate(&self) -> Vec<ClippedTriangle> {
        let mut triangles = Vec::new();
        if self.len < 3 {
            return triangles;
        }
        for i in 0..self.len - 2 {
            triangles.push(ClippedTriangle {
                points: [self.vertices[0], self.vertices[i + 1], self.vertices[i + 2]],
                texcoords: [self.texcoords[0], self.texcoords[i + 1], self.texcoords[i + 2]],
            });
        }
        triangles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 0.0001;

    fn test_frustum() -> Frustum {
        // fov_x = fov_y = 90 degrees, znear = 0.1, zfar = 100
        Frustum::new(
            std::f32::consts::FRAC_PI_2,
            std::f32::consts::FRAC_PI_2,
            0.1,
            100.0,
        )
    }

    fn default_uvs() -> [Vec2; 3] {
        [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)]
    }

    #[test]
    fn test_frustum_plane_construction() {
        let f = test_frustum();

        // near: P=(0,0,0.1), N=(0,0,1)
        assert!((f.planes[4].point.z - 0.1).abs() < EPS);
        assert!((f.planes[4].normal.z - 1.0).abs() < EPS);

        // far: P=(0,0,100), N=(0,0,-1)
        assert!((f.planes[5].point.z - 100.0).abs() < EPS);
        assert!((f.planes[5].normal.z + 1.0).abs() < EPS);

        // left plane normal x = cos(45 deg)
        assert!((f.planes[0].normal.x - 0.7071).abs() < 0.001);
    }

    #[test]
    fn test_triangle_fully_inside_is_unchanged() {
        let points = [
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(1.0, 0.0, 10.0),
            Vec3::new(0.0, 1.0, 10.0),
        ];
        let poly = Polygon::from_triangle(points, default_uvs());
        let clipped = poly.clip(&test_frustum());

        assert_eq!(clipped.len(), 3);
        for i in 0..3 {
            // order preserved
            assert!((clipped.vertex(i) - points[i]).len() < EPS);
        }
        assert_eq!(clipped.triangulate().len(), 1);
    }

    #[test]
    fn test_triangle_fully_outside_is_empty() {
        // Entirely behind the near plane
        let points = [
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(1.0, 0.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        ];
        let poly = Polygon::from_triangle(points, default_uvs());
        let clipped = poly.clip(&test_frustum());

        assert!(clipped.is_empty());
        assert!(clipped.triangulate().is_empty());
    }

    #[test]
    fn test_single_plane_crossing_yields_quad() {
        let near = Plane::new(Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.0, 0.0, 1.0));
        // One vertex behind the near plane
        let poly = Polygon::from_triangle(
            [
                Vec3::new(0.0, 0.0, 2.0),
                Vec3::new(1.0, 0.0, 2.0),
                Vec3::new(0.5, 0.0, -2.0),
            ],
            default_uvs(),
        );

        let clipped = poly.clip_against_plane(&near);
        assert_eq!(clipped.len(), 4);

        let triangles = clipped.triangulate();
        assert_eq!(triangles.len(), 2);
        for tri in &triangles {
            for p in tri.points {
                assert!(near.side(p) >= -EPS);
            }
        }
    }

    #[test]
    fn test_clip_interpolates_texcoords() {
        let near = Plane::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        // Edge from uv (0,0) at z=1 to uv (1,1) at z=-1 crosses at t=0.5
        let poly = Polygon::from_vertices(&[
            (Vec3::new(0.0, 0.0, 1.0), Vec2::new(0.0, 0.0)),
            (Vec3::new(2.0, 0.0, 1.0), Vec2::new(1.0, 0.0)),
            (Vec3::new(0.0, 2.0, -1.0), Vec2::new(1.0, 1.0)),
        ]);

        let clipped = poly.clip_against_plane(&near);
        assert_eq!(clipped.len(), 4);

        let mut found_midpoint = false;
        for i in 0..clipped.len() {
            if (clipped.texcoord(i).x - 0.5).abs() < EPS && (clipped.texcoord(i).y - 0.5).abs() < EPS
            {
                found_midpoint = true;
            }
        }
        assert!(found_midpoint);
    }

    #[test]
    fn test_fan_triangulation_law() {
        // Convex planar polygons of 3..=10 vertices on a circle
        for n in 3..=MAX_POLY_VERTICES {
            let verts: Vec<(Vec3, Vec2)> = (0..n)
                .map(|i| {
                    let a = i as f32 / n as f32 * std::f32::consts::TAU;
                    (Vec3::new(a.cos(), a.sin(), 5.0), Vec2::default())
                })
                .collect();
            let poly = Polygon::from_vertices(&verts);
            assert_eq!(poly.len(), n);

            let triangles = poly.triangulate();
            assert_eq!(triangles.len(), n - 2);
            for tri in &triangles {
                assert!((tri.points[0] - poly.vertex(0)).len() < EPS);
            }
        }
    }

    #[test]
    fn test_vertex_cap_is_enforced() {
        let verts: Vec<(Vec3, Vec2)> = (0..MAX_POLY_VERTICES + 4)
            .map(|i| (Vec3::new(i as f32, 0.0, 1.0), Vec2::default()))
            .collect();
        let poly = Polygon::from_vertices(&verts);
        assert_eq!(poly.len(), MAX_POLY_VERTICES);
    }
}
