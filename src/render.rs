use crate::geometry::Pose;
use crate::shape::Shape;

/// Receives intermediate and final configurations while the optimizer runs
pub trait Renderer {
    fn render(&mut self, shapes: &[Shape], configuration: &[Pose]);
}

/// Renderer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&mut self, _shapes: &[Shape], _configuration: &[Pose]) {}
}

impl<F> Renderer for F
where
    F: FnMut(&[Shape], &[Pose]),
{
    fn render(&mut self, shapes: &[Shape], configuration: &[Pose]) {
        self(shapes, configuration)
    }
}
