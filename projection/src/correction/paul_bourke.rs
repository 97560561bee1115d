use glam::Vec2;
use log::info;

use crate::{
    correction::buffer::{Buffer, GeometryType, Vertex},
    error::ParseError,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BourkeVertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
    pub intensity: f32,
}

/// Text warp mesh: a mapping-type line, a `columns rows` line, then one
/// `x y u v intensity` line per grid point. Positions are in the viewport's
/// clip space; a negative intensity marks a point outside the image.
#[derive(Debug, Clone, PartialEq)]
pub struct PaulBourkeMesh {
    pub mapping: u32,
    pub columns: u32,
    pub rows: u32,
    pub vertices: Vec<BourkeVertex>,
}

impl PaulBourkeMesh {
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|error| ParseError::InvalidLine {
            line: 1,
            reason: error.to_string(),
        })?;
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line, mapping_line) = lines.next().ok_or(ParseError::InvalidLine {
            line: 1,
            reason: "missing mapping type".to_string(),
        })?;
        let mapping = parse_field(mapping_line, line, "mapping type")?;

        let (line, dimension_line) = lines.next().ok_or(ParseError::InvalidLine {
            line: line + 1,
            reason: "missing grid dimensions".to_string(),
        })?;
        let mut dimensions = dimension_line.split_whitespace();
        let columns: u32 = parse_field(dimensions.next().unwrap_or_default(), line, "columns")?;
        let rows: u32 = parse_field(dimensions.next().unwrap_or_default(), line, "rows")?;
        if columns < 2 || rows < 2 {
            return Err(ParseError::InvalidLine {
                line,
                reason: format!("grid of {}x{} has no cells", columns, rows),
            });
        }

        let count = (columns as usize)
            .checked_mul(rows as usize)
            .ok_or(ParseError::VertexCountOverflow { columns, rows })?;
        // grows with the lines actually present, the header is not trusted
        let mut vertices = Vec::new();
        let mut last_line = line;
        for (line, content) in lines.by_ref().take(count) {
            let mut fields = content.split_whitespace();
            let mut next = |name: &str| parse_field(fields.next().unwrap_or_default(), line, name);
            vertices.push(BourkeVertex {
                x: next("x")?,
                y: next("y")?,
                u: next("u")?,
                v: next("v")?,
                intensity: next("intensity")?,
            });
            last_line = line;
        }
        if vertices.len() != count {
            return Err(ParseError::InvalidLine {
                line: last_line + 1,
                reason: format!("expected {} vertices, found {}", count, vertices.len()),
            });
        }

        Ok(Self {
            mapping,
            columns,
            rows,
            vertices,
        })
    }

    /// Triangle list over every grid cell whose four corners are visible
    pub fn generate_buffer(&self, position: Vec2, size: Vec2) -> Result<Buffer, ParseError> {
        let vertices = self
            .vertices
            .iter()
            .map(|vertex| {
                let unit_x = (vertex.x + 1.0) * 0.5;
                let unit_y = (vertex.y + 1.0) * 0.5;
                let intensity = vertex.intensity.clamp(0.0, 1.0);
                Vertex {
                    x: 2.0 * (unit_x * size.x + position.x) - 1.0,
                    y: 2.0 * (unit_y * size.y + position.y) - 1.0,
                    s: vertex.u.clamp(0.0, 1.0) * size.x + position.x,
                    t: vertex.v.clamp(0.0, 1.0) * size.y + position.y,
                    r: intensity,
                    g: intensity,
                    b: intensity,
                    a: 1.0,
                }
            })
            .collect();

        let columns = self.columns as usize;
        let visible = |index: usize| self.vertices[index].intensity >= 0.0;
        let mut indices = Vec::new();
        for c in 0..columns - 1 {
            for r in 0..self.rows as usize - 1 {
                let i0 = r * columns + c;
                let i1 = r * columns + c + 1;
                let i2 = (r + 1) * columns + c + 1;
                let i3 = (r + 1) * columns + c;
                if [i0, i1, i2, i3].into_iter().all(visible) {
                    indices.extend([i0, i1, i2, i0, i2, i3].map(|index| index as u32));
                }
            }
        }

        let buffer = Buffer::new(vertices, indices, GeometryType::TriangleList)?;
        info!(
            "Paul Bourke mesh {}x{}: {} triangles",
            self.columns,
            self.rows,
            buffer.triangle_count()
        );
        Ok(buffer)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, line: usize, name: &str) -> Result<T, ParseError> {
    field.parse().map_err(|_| ParseError::InvalidLine {
        line,
        reason: format!("invalid {} '{}'", name, field),
    })
}
