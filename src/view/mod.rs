// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{RectRenderer, RectVertex, RenderError, ScreenUniform};
pub use gpu_init::GpuContext;

use crate::model::{Color, RectShape};

/// Draw target for one frame: clear, any number of rectangles, present
pub trait Canvas {
    type Error;

    fn clear(&mut self, color: Color);
    fn draw_rect(&mut self, rect: &RectShape);
    fn present(&mut self) -> Result<(), Self::Error>;
}
