//! Geometry output
//!
//! The level emits colored triangle lists into a `DrawTarget`. A host
//! renderer implements the trait (or collects into a `Vec<Vertex>`) and
//! uploads the vertices however it likes.

pub mod shapes;
pub mod vertex;

pub use vertex::Vertex;

/// Sink for triangle lists (three vertices per triangle)
pub trait DrawTarget {
    fn draw_triangles(&mut self, vertices: &[Vertex]);
}

impl DrawTarget for Vec<Vertex> {
    fn draw_triangles(&mut self, vertices: &[Vertex]) {
        self.extend_from_slice(vertices);
    }
}
