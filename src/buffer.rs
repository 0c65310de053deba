//! Per-pixel color and depth stores, sized to the output resolution
//!
//! Both buffers are cleared once per frame before any triangle is
//! rasterized, and handed to the presentation collaborator read-only after
//! the frame completes. All accessors are bounds-checked; out-of-range
//! coordinates read back a sentinel instead of erroring because the
//! rasterizer may compute coordinates fractionally past an edge.

use crate::types::Color;

/// Per-pixel color store, RGBA, 4 bytes per pixel, indexed y * width + x
pub struct FrameBuffer {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    /// A fresh buffer starts opaque black, the same color out-of-range
    /// reads return
    pub fn new(width: usize, height: usize) -> Self {
        let mut fb = Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        };
        fb.clear(Color::BLACK);
        fb
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Read a pixel back; out-of-range coordinates return the background black
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            Color::with_alpha(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            )
        } else {
            Color::BLACK
        }
    }

    /// Raw RGBA bytes for presentation (blit, PNG encode, ...)
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Draw a filled rect, clipped to the buffer
    pub fn draw_rect(&mut self, rect_x: i32, rect_y: i32, w: i32, h: i32, color: Color) {
        for y in rect_y..rect_y + h {
            for x in rect_x..rect_x + w {
                if x >= 0 && y >= 0 {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Per-pixel depth store. Values are inverted normalized depth: 0.0 is at
/// the camera, 1.0 is the far plane / background. Cleared to 1.0 each frame.
pub struct DepthBuffer {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![1.0; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self) {
        self.values.fill(1.0);
    }

    /// Depth at (x, y); out-of-range reads return 1.0 ("nothing drawn,
    /// maximally far")
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.values[y * self.width + x]
        } else {
            1.0
        }
    }

    /// Depth-test and write: stores `depth` and returns true only if it is
    /// strictly less than the current value at (x, y). An exact tie keeps
    /// the first writer; which fragment wins a floating-point tie is
    /// implementation-defined, not an ordering guarantee.
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if depth < self.values[idx] {
                self.values[idx] = depth;
                return true;
            }
        }
        false
    }
}
