use glam::Vec2;

use crate::error::ParseError;

/// Vertex of a correction mesh: clip-space position, texture coordinate and
/// colour
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub s: f32,
    pub t: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Vertex {
    /// Opaque white vertex
    pub fn new(x: f32, y: f32, s: f32, t: f32) -> Self {
        Self {
            x,
            y,
            s,
            t,
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryType {
    #[default]
    TriangleList,
    TriangleStrip,
}

/// Vertices and indices of a loaded mesh. Every index is checked against the
/// vertex count on construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    geometry: GeometryType,
}

impl Buffer {
    pub fn new(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        geometry: GeometryType,
    ) -> Result<Self, ParseError> {
        let vertex_count = vertices.len();
        if let Some((position, index)) = indices
            .iter()
            .enumerate()
            .find(|(_, index)| **index as usize >= vertex_count)
        {
            return Err(ParseError::IndexOutOfRange {
                index: *index,
                position,
                vertex_count,
            });
        }

        Ok(Self {
            vertices,
            indices,
            geometry,
        })
    }

    /// Four-vertex strip covering a viewport rectangle, used when no
    /// correction mesh is configured
    pub fn quad(position: Vec2, size: Vec2) -> Self {
        let left = position.x;
        let right = position.x + size.x;
        let bottom = position.y;
        let top = position.y + size.y;
        let clip = |value: f32| 2.0 * value - 1.0;

        Self {
            vertices: vec![
                Vertex::new(clip(left), clip(bottom), left, bottom),
                Vertex::new(clip(left), clip(top), left, top),
                Vertex::new(clip(right), clip(bottom), right, bottom),
                Vertex::new(clip(right), clip(top), right, top),
            ],
            indices: vec![0, 1, 2, 3],
            geometry: GeometryType::TriangleStrip,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn geometry(&self) -> GeometryType {
        self.geometry
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        match self.geometry {
            GeometryType::TriangleList => self.indices.len() / 3,
            GeometryType::TriangleStrip => self.indices.len().saturating_sub(2),
        }
    }
}
