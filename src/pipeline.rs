//! Geometry pipeline: mesh faces to screen-space triangles
//!
//! Per face: world transform, view transform, backface test on camera-space
//! geometry, frustum clip, re-fan, perspective project, screen mapping, and
//! per-face directional light. The output list is rebuilt from scratch each
//! frame and must be fully populated before the rasterizer consumes it.

use crate::clip::{Frustum, Polygon};
use crate::math::{perspective_divide, Mat4, Vec3, Vec4};
use crate::types::{Camera, Mesh, RenderSettings, ScreenTriangle};
use crate::MAX_RENDER_TRIANGLES;
use log::warn;

/// Output resolution in pixels
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Frame-scoped, capacity-bounded list of screen-space triangles. Triangles
/// past the cap are dropped and counted; the frame renders with holes
/// instead of growing without bound.
#[derive(Default)]
pub struct TriangleList<'a> {
    triangles: Vec<ScreenTriangle<'a>>,
    dropped: usize,
}

impl<'a> TriangleList<'a> {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            dropped: 0,
        }
    }

    /// Reset for a new frame
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.dropped = 0;
    }

    pub fn push(&mut self, tri: ScreenTriangle<'a>) {
        if self.triangles.len() == MAX_RENDER_TRIANGLES {
            if self.dropped == 0 {
                warn!("triangle list full ({MAX_RENDER_TRIANGLES}), dropping further triangles this frame");
            }
            self.dropped += 1;
            return;
        }
        self.triangles.push(tri);
    }

    pub fn triangles(&self) -> &[ScreenTriangle<'a>] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// How many triangles were dropped at capacity this frame
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Transform, cull, clip, and project one mesh's faces into `out`.
///
/// The mesh and camera are read only; the emitted triangles borrow the
/// mesh's texture.
pub fn build_triangles<'a>(
    mesh: &'a Mesh,
    camera: &Camera,
    frustum: &Frustum,
    projection: &Mat4,
    viewport: Viewport,
    settings: &RenderSettings,
    out: &mut TriangleList<'a>,
) {
    let world = mesh.world_matrix();
    let view = camera.view_matrix();
    let half_w = viewport.width as f32 / 2.0;
    let half_h = viewport.height as f32 / 2.0;

    for face in &mesh.faces {
        let model = [
            mesh.vertices[face.a],
            mesh.vertices[face.b],
            mesh.vertices[face.c],
        ];

        let mut cam_space = [Vec3::ZERO; 3];
        for (i, v) in model.iter().enumerate() {
            let world_v = world.mul_vec4(Vec4::from_vec3(*v));
            cam_space[i] = view.mul_vec4(world_v).to_vec3();
        }

        // Face normal from unit edge vectors
        let edge_ab = (cam_space[1] - cam_space[0]).normalize();
        let edge_ac = (cam_space[2] - cam_space[0]).normalize();
        let normal = edge_ab.cross(edge_ac).normalize();

        // Backface test on un-clipped camera-space geometry: the face is
        // discarded when its normal points away from the ray back to the
        // camera origin
        let camera_ray = Vec3::ZERO - cam_space[0];
        if settings.backface_cull && normal.dot(camera_ray) < 0.0 {
            continue;
        }

        let intensity = -normal.dot(settings.light_dir);
        let color = face.color.shade(intensity);

        let polygon = Polygon::from_triangle(cam_space, [face.a_uv, face.b_uv, face.c_uv]);
        let clipped = polygon.clip(frustum);
        if clipped.len() < 3 {
            continue;
        }

        for tri in clipped.triangulate() {
            let mut points = [Vec4::default(); 3];
            for (i, p) in tri.points.iter().enumerate() {
                let mut projected =
                    perspective_divide(projection.mul_vec4(Vec4::from_vec3(*p)));

                // NDC to pixels; y flips because screen row 0 is the top
                projected.x *= half_w;
                projected.y *= -half_h;
                projected.x += half_w;
                projected.y += half_h;

                points[i] = projected;
            }

            out.push(ScreenTriangle {
                points,
                texcoords: tri.texcoords,
                color,
                texture: mesh.texture.as_ref(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::types::{Color, Face};

    fn setup() -> (Camera, Frustum, Mat4, Viewport) {
        let fov = std::f32::consts::FRAC_PI_2;
        (
            Camera::default(),
            Frustum::new(fov, fov, 0.1, 100.0),
            Mat4::perspective(fov, 1.0, 0.1, 100.0),
            Viewport::new(200, 200),
        )
    }

    fn facing_triangle() -> Mesh {
        // Wound so the face normal points back toward the camera at origin
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.5, 5.0),
                Vec3::new(0.5, -0.5, 5.0),
                Vec3::new(-0.5, -0.5, 5.0),
            ],
            vec![Face::new(0, 1, 2)],
        )
    }

    #[test]
    fn test_facing_triangle_is_emitted() {
        let (camera, frustum, projection, viewport) = setup();
        let mesh = facing_triangle();
        let mut list = TriangleList::new();

        build_triangles(
            &mesh,
            &camera,
            &frustum,
            &projection,
            viewport,
            &RenderSettings::default(),
            &mut list,
        );

        assert_eq!(list.len(), 1);
        assert_eq!(list.dropped(), 0);

        for p in list.triangles()[0].points {
            assert!(p.x >= 0.0 && p.x <= 200.0);
            assert!(p.y >= 0.0 && p.y <= 200.0);
            // w retains camera-space depth for perspective-correct raster
            assert!((p.w - 5.0).abs() < 0.01);
        }

        // First vertex sits above center in world space, which is above
        // center on screen too (row 0 is the top)
        assert!(list.triangles()[0].points[0].y < 100.0);
    }

    #[test]
    fn test_backface_is_culled_only_when_enabled() {
        let (camera, frustum, projection, viewport) = setup();
        // Reverse winding: normal points away from the camera
        let mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.5, 5.0),
                Vec3::new(-0.5, -0.5, 5.0),
                Vec3::new(0.5, -0.5, 5.0),
            ],
            vec![Face::new(0, 1, 2)],
        );

        let mut list = TriangleList::new();
        build_triangles(
            &mesh,
            &camera,
            &frustum,
            &projection,
            viewport,
            &RenderSettings::default(),
            &mut list,
        );
        assert!(list.is_empty());

        let mut settings = RenderSettings::default();
        settings.backface_cull = false;
        list.clear();
        build_triangles(
            &mesh, &camera, &frustum, &projection, viewport, &settings, &mut list,
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_triangle_behind_camera_contributes_nothing() {
        let (camera, frustum, projection, viewport) = setup();
        let mut mesh = facing_triangle();
        mesh.translation = Vec3::new(0.0, 0.0, -10.0);

        let mut list = TriangleList::new();
        build_triangles(
            &mesh,
            &camera,
            &frustum,
            &projection,
            viewport,
            &RenderSettings::default(),
            &mut list,
        );
        assert!(list.is_empty());
    }

    #[test]
    fn test_clipped_triangle_refans() {
        let (camera, frustum, projection, viewport) = setup();
        // One vertex behind the near plane, two in front: the clipped
        // polygon has 4 vertices and re-fans into 2 triangles
        let mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.2, -1.0),
                Vec3::new(0.5, -0.2, 5.0),
                Vec3::new(-0.5, -0.2, 5.0),
            ],
            vec![Face::new(0, 1, 2)],
        );

        let mut settings = RenderSettings::default();
        settings.backface_cull = false;
        let mut list = TriangleList::new();
        build_triangles(
            &mesh, &camera, &frustum, &projection, viewport, &settings, &mut list,
        );
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_face_color_is_lit() {
        let (camera, frustum, projection, viewport) = setup();
        let mut mesh = facing_triangle();
        mesh.faces[0] = Face::new(0, 1, 2).with_color(Color::WHITE);

        // The facing triangle's normal is (0,0,-1); a light shining along
        // +z lights it fully, along -z not at all
        let mut lit = RenderSettings::default();
        lit.light_dir = Vec3::new(0.0, 0.0, 1.0);
        let mut list = TriangleList::new();
        build_triangles(
            &mesh, &camera, &frustum, &projection, viewport, &lit, &mut list,
        );
        assert_eq!(list.triangles()[0].color, Color::WHITE);

        let mut unlit = RenderSettings::default();
        unlit.light_dir = Vec3::new(0.0, 0.0, -1.0);
        list.clear();
        build_triangles(
            &mesh, &camera, &frustum, &projection, viewport, &unlit, &mut list,
        );
        let c = list.triangles()[0].color;
        assert_eq!((c.r, c.g, c.b), (0, 0, 0));
    }

    #[test]
    fn test_triangle_list_drop_accounting() {
        let mut list = TriangleList::new();
        let tri = ScreenTriangle {
            points: [Vec4::default(); 3],
            texcoords: [Vec2::default(); 3],
            color: Color::WHITE,
            texture: None,
        };
        for _ in 0..MAX_RENDER_TRIANGLES + 5 {
            list.push(tri);
        }
        assert_eq!(list.len(), MAX_RENDER_TRIANGLES);
        assert_eq!(list.dropped(), 5);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.dropped(), 0);
    }
}
