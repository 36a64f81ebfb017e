//! 2D canvas surface (WASM only)

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Path2d};

use super::{Paint, Path, Surface};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// `None` if the canvas has no 2D context (yet)
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// A detached canvas can't be drawn on any more
    pub fn is_connected(&self) -> bool {
        self.canvas.is_connected()
    }
}

fn to_path2d(path: &Path) -> Option<Path2d> {
    let (first, rest) = path.points().split_first()?;
    let p = Path2d::new().ok()?;
    p.move_to(first.x as f64, first.y as f64);
    for point in rest {
        p.line_to(point.x as f64, point.y as f64);
    }
    p.close_path();
    Some(p)
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: f32, height: f32, scale: f32) {
        self.canvas.set_width((width * scale) as u32);
        self.canvas.set_height((height * scale) as u32);
        // Resizing resets the transform; draw in CSS pixels from here on
        let scale = scale as f64;
        let _ = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
    }

    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill(&mut self, path: &Path, paint: Paint) {
        let Some(p) = to_path2d(path) else {
            return;
        };
        self.ctx.save();
        self.ctx.set_global_alpha(paint.alpha as f64);
        self.ctx.set_fill_style_str(&paint.css());
        self.ctx.fill_with_path_2d(&p);
        self.ctx.restore();
    }
}
