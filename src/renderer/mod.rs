//! Rendering abstraction layer. The column renderer never touches a
//! concrete window or pixel format directly; it writes through this
//! trait so the same math drives both the software backend below and,
//! eventually, any other target.

pub mod software;

/// 0xAARRGGBB pixel, matching [`crate::world::Texture`].
pub type Rgba = u32;

/// A target the column renderer can paint into.
pub trait Renderer {
    /// Begin a frame of size `w x h`, clearing to `clear`.
    fn begin_frame(&mut self, w: usize, h: usize, clear: Rgba);

    /// Write one pixel. Out-of-bounds coordinates are silently ignored.
    fn set_pixel(&mut self, x: usize, y: usize, rgba: Rgba);

    /// Finish the frame (no-op for in-memory buffers; a windowed backend
    /// would blit here).
    fn end_frame(&mut self);
}

pub use software::Software;
