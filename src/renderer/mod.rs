//! Rendering module
//!
//! The engine draws through the [`Surface`] trait. On the web that is a 2D
//! canvas; natively (and in tests) it is a [`RecordingSurface`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod path;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use path::{Paint, Path, PathBuilder, colors};
pub use shapes::{CupFlags, draw_cup_set};

/// A 2D drawing target
pub trait Surface {
    /// Match a new CSS size; the backing store is `scale` times larger
    fn resize(&mut self, width: f32, height: f32, scale: f32);
    /// Wipe the whole surface
    fn clear(&mut self, width: f32, height: f32);
    /// Fill a closed path
    fn fill(&mut self, path: &Path, paint: Paint);
}

/// One recorded fill
#[derive(Debug, Clone, PartialEq)]
pub struct FillCommand {
    pub path: Path,
    pub paint: Paint,
}

/// In-memory surface that records what was drawn
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    /// Backing store size in device pixels
    pub backing_size: (u32, u32),
    /// Number of clears (one per repaint)
    pub frames: u32,
    fills: Vec<FillCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills since the last clear
    pub fn fills(&self) -> &[FillCommand] {
        &self.fills
    }

    pub fn reset(&mut self) {
        self.fills.clear();
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f32, height: f32, scale: f32) {
        self.backing_size = ((width * scale) as u32, (height * scale) as u32);
    }

    fn clear(&mut self, _width: f32, _height: f32) {
        self.frames += 1;
        self.fills.clear();
    }

    fn fill(&mut self, path: &Path, paint: Paint) {
        self.fills.push(FillCommand {
            path: path.clone(),
            paint,
        });
    }
}
