//! Triangle rasterization
//!
//! Scanline fill via flat-top/flat-bottom decomposition. Every covered pixel
//! gets barycentric weights, a perspective-correct depth (1 - interpolated
//! 1/w) tested against the depth buffer, and either the face color or a
//! perspective-correct texture sample. Because visibility is a per-pixel
//! depth test, triangle submission order does not affect the final image
//! (exact floating-point depth ties keep the first writer).

use crate::buffer::{DepthBuffer, FrameBuffer};
use crate::math::{barycentric_weights, Vec2, Vec4};
use crate::pipeline::TriangleList;
use crate::types::{Color, RenderSettings, ScreenTriangle, Texture};

/// Rasterize every triangle in the list into the buffers. The settings
/// toggles gate which paths run for each triangle.
pub fn rasterize(
    list: &TriangleList,
    settings: &RenderSettings,
    frame: &mut FrameBuffer,
    depth: &mut DepthBuffer,
) {
    for tri in list.triangles() {
        if settings.draw_textured && tri.texture.is_some() {
            fill_triangle(frame, depth, tri, tri.texture);
        } else if settings.draw_filled {
            fill_triangle(frame, depth, tri, None);
        }

        if settings.draw_wireframe {
            draw_wireframe(frame, tri);
        }
        if settings.draw_vertex_dots {
            draw_vertex_dots(frame, tri);
        }
    }
}

/// Fill one triangle's pixels. With a texture the fill samples
/// perspective-correct UVs; without one the face color is constant across
/// the triangle. Both run the same scan/barycentric/depth-test structure.
fn fill_triangle(
    frame: &mut FrameBuffer,
    depth: &mut DepthBuffer,
    tri: &ScreenTriangle,
    texture: Option<&Texture>,
) {
    // Sort by y ascending, carrying every attribute along with each swap
    let mut p = tri.points;
    let mut uv = tri.texcoords;
    if p[0].y > p[1].y {
        p.swap(0, 1);
        uv.swap(0, 1);
    }
    if p[1].y > p[2].y {
        p.swap(1, 2);
        uv.swap(1, 2);
    }
    if p[0].y > p[1].y {
        p.swap(0, 1);
        uv.swap(0, 1);
    }

    let (x0, y0) = (p[0].x as i32, p[0].y as i32);
    let (x1, y1) = (p[1].x as i32, p[1].y as i32);
    let (x2, y2) = (p[2].x as i32, p[2].y as i32);

    // Upper half (flat bottom). Skipped entirely when y0 == y1: the left
    // leg's inverse slope would divide by zero.
    if y1 - y0 != 0 {
        let inv_slope_1 = (x1 - x0) as f32 / (y1 - y0) as f32;
        let inv_slope_2 = (x2 - x0) as f32 / (y2 - y0) as f32;

        for y in y0..=y1 {
            let xa = x1 as f32 + (y - y1) as f32 * inv_slope_1;
            let xb = x0 as f32 + (y - y0) as f32 * inv_slope_2;
            scan_row(frame, depth, y, xa, xb, &p, &uv, tri.color, texture);
        }
    }

    // Lower half (flat top), symmetrically skipped when y1 == y2
    if y2 - y1 != 0 {
        let inv_slope_1 = (x2 - x1) as f32 / (y2 - y1) as f32;
        let inv_slope_2 = (x2 - x0) as f32 / (y2 - y0) as f32;

        for y in y1..=y2 {
            let xa = x1 as f32 + (y - y1) as f32 * inv_slope_1;
            let xb = x0 as f32 + (y - y0) as f32 * inv_slope_2;
            scan_row(frame, depth, y, xa, xb, &p, &uv, tri.color, texture);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn scan_row(
    frame: &mut FrameBuffer,
    depth: &mut DepthBuffer,
    y: i32,
    xa: f32,
    xb: f32,
    p: &[Vec4; 3],
    uv: &[Vec2; 3],
    color: Color,
    texture: Option<&Texture>,
) {
    let mut x_start = xa as i32;
    let mut x_end = xb as i32;
    if x_end < x_start {
        std::mem::swap(&mut x_start, &mut x_end);
    }

    for x in x_start..x_end {
        plot_pixel(frame, depth, x, y, p, uv, color, texture);
    }
}

/// Depth-test and shade one pixel
#[allow(clippy::too_many_arguments)]
fn plot_pixel(
    frame: &mut FrameBuffer,
    depth: &mut DepthBuffer,
    x: i32,
    y: i32,
    p: &[Vec4; 3],
    uv: &[Vec2; 3],
    color: Color,
    texture: Option<&Texture>,
) {
    if x < 0 || y < 0 {
        return;
    }

    let point = Vec2::new(x as f32, y as f32);
    let weights = match barycentric_weights(point, p[0].xy(), p[1].xy(), p[2].xy()) {
        Some(w) => w,
        // Degenerate triangle: skip the pixel, never abort the frame
        None => return,
    };
    let (alpha, beta, gamma) = (weights.x, weights.y, weights.z);

    // 1/w varies linearly across the screen-space triangle, unlike w itself
    let inv_w = alpha / p[0].w + beta / p[1].w + gamma / p[2].w;

    // Invert so 0.0 is nearest, matching the buffer cleared to 1.0
    let depth_value = 1.0 - inv_w;

    if !depth.test_and_set(x as usize, y as usize, depth_value) {
        return;
    }

    let out = if let Some(tex) = texture {
        // Interpolate u/w and v/w, then divide by the interpolated 1/w to
        // recover true perspective-correct coordinates
        let u = (uv[0].x * alpha / p[0].w + uv[1].x * beta / p[1].w + uv[2].x * gamma / p[2].w)
            / inv_w;
        let v = (uv[0].y * alpha / p[0].w + uv[1].y * beta / p[1].w + uv[2].y * gamma / p[2].w)
            / inv_w;
        tex.sample(u, v)
    } else {
        color
    };

    frame.set_pixel(x as usize, y as usize, out);
}

fn draw_wireframe(frame: &mut FrameBuffer, tri: &ScreenTriangle) {
    let (x0, y0) = (tri.points[0].x as i32, tri.points[0].y as i32);
    let (x1, y1) = (tri.points[1].x as i32, tri.points[1].y as i32);
    let (x2, y2) = (tri.points[2].x as i32, tri.points[2].y as i32);

    frame.draw_line(x0, y0, x1, y1, Color::GREEN);
    frame.draw_line(x1, y1, x2, y2, Color::GREEN);
    frame.draw_line(x2, y2, x0, y0, Color::GREEN);
}

fn draw_vertex_dots(frame: &mut FrameBuffer, tri: &ScreenTriangle) {
    for point in &tri.points {
        frame.draw_rect(point.x as i32 - 3, point.y as i32 - 3, 6, 6, Color::RED);
    }
}
