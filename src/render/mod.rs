//! Compositing, encoding and the end-to-end render pipeline.
//!
//! - [`MapRenderer`]: points in, PNG out
//! - [`Compositor`]: stitches tiles into a [`Canvas`] and draws markers
//! - [`PngCanvasEncoder`]: metadata-free, byte-stable PNG output

mod compositor;
mod encoder;
mod service;

pub use compositor::{Canvas, Compositor, MarkerStyle, DEFAULT_MARKER_RADIUS};
pub use encoder::{encode_rgb_png, PngCanvasEncoder};
pub use service::{MapRenderer, RenderOutput};
