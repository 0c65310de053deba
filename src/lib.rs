//! Software 3D rasterizer core
//!
//! Takes mesh triangles and a camera and produces perspective-correct,
//! depth-tested, optionally textured pixels in a frame buffer, no GPU
//! involved.
//!
//! Stages:
//! - Affine/projective transform math (vectors, 4x4 matrices)
//! - Six-plane view-frustum polygon clipping with re-fanning
//! - Scanline triangle rasterization against a per-pixel depth buffer
//! - Perspective-correct attribute (texture-coordinate) interpolation
//!
//! A frame flows one direction: [`build_triangles`] transforms, culls, and
//! clips each mesh face into a bounded [`TriangleList`]; [`rasterize`]
//! consumes the list into a [`FrameBuffer`] / [`DepthBuffer`] pair, which
//! presentation then reads. Window/surface management, asset loading, and
//! input handling live outside this crate.

mod buffer;
mod clip;
mod math;
mod pipeline;
mod raster;
mod types;

pub use buffer::*;
pub use clip::*;
pub use math::*;
pub use pipeline::*;
pub use raster::*;
pub use types::*;

/// Maximum vertices a clipped polygon can hold. A triangle clipped against
/// the six convex frustum planes stays under this bound; the clipper caps
/// and reports rather than overflowing if handed malformed input.
pub const MAX_POLY_VERTICES: usize = 10;

/// Maximum screen-space triangles per frame. Excess triangles are dropped
/// with a surfaced warning; that frame renders with holes rather than
/// growing or crashing.
pub const MAX_RENDER_TRIANGLES: usize = 10_000;
