//! Value types shared across the rendering pipeline

use crate::math::{Mat4, Vec2, Vec3, Vec4};
use thiserror::Error;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Apply a light intensity factor, clamped to [0, 1] per channel
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i) as u8,
            g: (self.g as f32 * i) as u8,
            b: (self.b as f32 * i) as u8,
            a: self.a,
        }
    }

    /// Convert to [u8; 4] for the framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Texture loading failure. Runtime sampling never fails; coordinates wrap.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        source: image::ImageError,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Load a texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Load a texture from raw encoded bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        use image::GenericImageView;

        let img = image::load_from_memory(bytes)?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self {
            width,
            height,
            pixels,
            name: "checkerboard".to_string(),
        }
    }

    /// Sample at UV coordinates (nearest, no filtering). Coordinates wrap,
    /// including negative values, so sampling never indexes out of bounds.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let tx = ((u * self.width as f32).floor() as i64).rem_euclid(self.width as i64) as usize;
        let ty = ((v * self.height as f32).floor() as i64).rem_euclid(self.height as i64) as usize;
        self.pixels[ty * self.width + tx]
    }
}

/// A mesh face: three vertex indices, per-corner texture coordinates, and a
/// base color used by the flat-shaded fill path.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub a_uv: Vec2,
    pub b_uv: Vec2,
    pub c_uv: Vec2,
    pub color: Color,
}

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            a,
            b,
            c,
            a_uv: Vec2::default(),
            b_uv: Vec2::default(),
            c_uv: Vec2::default(),
            color: Color::WHITE,
        }
    }

    pub fn with_uvs(a: usize, b: usize, c: usize, a_uv: Vec2, b_uv: Vec2, c_uv: Vec2) -> Self {
        Self {
            a,
            b,
            c,
            a_uv,
            b_uv,
            c_uv,
            color: Color::WHITE,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Mesh data consumed by the pipeline each frame. Owned by the asset-loading
/// collaborator; the core only reads it.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub texture: Option<Texture>,
    pub scale: Vec3,
    pub rotation: Vec3,
    pub translation: Vec3,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            faces,
            texture: None,
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }

    /// World matrix from the mesh transform: scale first, then rotation
    /// about x, y, z, then translation.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation.x, self.translation.y, self.translation.z)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// A unit test cube: 8 vertices, 12 faces, UV-mapped per face
    pub fn cube() -> Self {
        let vertices = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];

        let quads = [
            [0, 1, 2, 3], // front
            [3, 2, 4, 5], // right
            [5, 4, 6, 7], // back
            [7, 6, 1, 0], // left
            [1, 6, 4, 2], // top
            [5, 7, 0, 3], // bottom
        ];

        let mut faces = Vec::with_capacity(12);
        for [a, b, c, d] in quads {
            faces.push(Face::with_uvs(
                a,
                b,
                c,
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
            ));
            faces.push(Face::with_uvs(
                a,
                c,
                d,
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
            ));
        }

        Self::new(vertices, faces)
    }
}

/// Camera state. The pipeline only consumes the derived view matrix; input
/// handling that drives yaw/pitch lives outside the core.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Forward direction from yaw and pitch applied to +z
    pub fn direction(&self) -> Vec3 {
        let rot = Mat4::rotation_y(self.yaw) * Mat4::rotation_x(self.pitch);
        rot.mul_vec4(Vec4::new(0.0, 0.0, 1.0, 0.0)).to_vec3()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.direction(), Vec3::UP)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Render settings: display-mode toggles gate which rasterizer paths run;
/// the light direction feeds the per-face intensity.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Draw triangle edges with Bresenham lines
    pub draw_wireframe: bool,
    /// Fill triangles with the face color
    pub draw_filled: bool,
    /// Fill triangles from their texture when one is present
    pub draw_textured: bool,
    /// Mark each triangle vertex with a small rect
    pub draw_vertex_dots: bool,
    /// Discard faces pointing away from the camera
    pub backface_cull: bool,
    /// Directional light (like the sun, not a point source)
    pub light_dir: Vec3,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_wireframe: false,
            draw_filled: true,
            draw_textured: true,
            draw_vertex_dots: false,
            backface_cull: true,
            light_dir: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

/// A screen-space triangle ready for rasterization. Points keep their w from
/// before the perspective divide for perspective-correct interpolation.
/// Immutable after the pipeline emits it; consumed once by the rasterizer.
#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle<'a> {
    pub points: [Vec4; 3],
    pub texcoords: [Vec2; 3],
    pub color: Color,
    pub texture: Option<&'a Texture>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_clamps() {
        let c = Color::new(100, 200, 50).shade(2.0);
        assert_eq!(c, Color::new(100, 200, 50));
        let dark = Color::WHITE.shade(-1.0);
        assert_eq!((dark.r, dark.g, dark.b), (0, 0, 0));
    }

    #[test]
    fn test_texture_sample_wraps() {
        let tex = Texture::checkerboard(8, 8, Color::RED, Color::BLUE);
        assert_eq!(tex.sample(0.0, 0.0), tex.sample(1.0, 1.0));
        assert_eq!(tex.sample(0.25, 0.5), tex.sample(1.25, -0.5));
    }

    #[test]
    fn test_texture_from_bytes_round_trip() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let tex = Texture::from_bytes(png.get_ref(), "brick".to_string()).unwrap();
        assert_eq!(tex.width, 2);
        assert_eq!(tex.height, 1);
        assert_eq!(tex.name, "brick");
        assert_eq!(tex.pixels[0], Color::RED);
        assert_eq!(tex.pixels[1], Color::BLUE);
    }

    #[test]
    fn test_texture_from_bytes_rejects_garbage() {
        let result = Texture::from_bytes(&[0, 1, 2, 3], "bad".to_string());
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_cube_has_twelve_faces() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 12);
        for face in &cube.faces {
            assert!(face.a < 8 && face.b < 8 && face.c < 8);
        }
    }

    #[test]
    fn test_camera_direction_from_yaw() {
        let mut cam = Camera::new(Vec3::ZERO);
        let ahead = cam.direction();
        assert!((ahead.z - 1.0).abs() < 0.001);

        cam.yaw = std::f32::consts::FRAC_PI_2;
        let right = cam.direction();
        assert!((right.x - 1.0).abs() < 0.001);
        assert!(right.z.abs() < 0.001);
    }
}
