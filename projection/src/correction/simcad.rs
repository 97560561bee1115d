use glam::Vec2;
use log::{debug, info};

use crate::{
    correction::buffer::{Buffer, GeometryType, Vertex},
    error::ParseError,
};

const ROOT_ELEMENT: &str = "GeometryFile";
const DEFINITION_ELEMENT: &str = "GeometryDefinition";
const X_ELEMENT: &str = "X-FlatParameters";
const Y_ELEMENT: &str = "Y-FlatParameters";

/// Projector-alignment warp exported by SimCAD: square grids of horizontal
/// and vertical corrections, each stored as raw values that are divided by
/// the element's `range` attribute. A file without any warp holds zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct SimCadWarp {
    pub x_range: f32,
    pub y_range: f32,
    pub x_corrections: Vec<f32>,
    pub y_corrections: Vec<f32>,
}

impl SimCadWarp {
    /// Uncorrected `side` x `side` grid
    pub fn identity(side: usize) -> Self {
        Self {
            x_range: 1.0,
            y_range: 1.0,
            x_corrections: vec![0.0; side * side],
            y_corrections: vec![0.0; side * side],
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|error| ParseError::Xml {
            message: error.to_string(),
        })?;
        let document = roxmltree::Document::parse(text).map_err(|error| ParseError::Xml {
            message: error.to_string(),
        })?;

        let root = document.root_element();
        if !root.has_tag_name(ROOT_ELEMENT) {
            return Err(ParseError::MissingElement {
                element: ROOT_ELEMENT,
            });
        }
        let definition = root
            .children()
            .find(|node| node.has_tag_name(DEFINITION_ELEMENT))
            .ok_or(ParseError::MissingElement {
                element: DEFINITION_ELEMENT,
            })?;

        let mut warp = Self {
            x_range: 1.0,
            y_range: 1.0,
            x_corrections: Vec::new(),
            y_corrections: Vec::new(),
        };
        for child in definition.children().filter(|node| node.is_element()) {
            let (range, corrections) = match child.tag_name().name() {
                X_ELEMENT => (&mut warp.x_range, &mut warp.x_corrections),
                Y_ELEMENT => (&mut warp.y_range, &mut warp.y_corrections),
                other => {
                    debug!("Ignoring SimCAD element {}", other);
                    continue;
                }
            };
            // Parameters without a usable range are skipped
            let range_value = child
                .attribute("range")
                .and_then(|range| range.parse::<f32>().ok());
            let Some(value) = range_value else {
                debug!("SimCAD {} has no range, skipping it", child.tag_name().name());
                continue;
            };
            *range = value;
            for field in child.text().unwrap_or_default().split_whitespace() {
                let correction = field.parse::<f32>().map_err(|_| ParseError::InvalidSimCad {
                    reason: format!("invalid {} value '{}'", child.tag_name().name(), field),
                })?;
                corrections.push(correction);
            }
        }

        warp.grid_side()?;
        Ok(warp)
    }

    /// Side length of the square correction grid
    pub fn grid_side(&self) -> Result<usize, ParseError> {
        let count = self.x_corrections.len();
        if count != self.y_corrections.len() {
            return Err(ParseError::InvalidSimCad {
                reason: format!(
                    "{} x corrections but {} y corrections",
                    count,
                    self.y_corrections.len()
                ),
            });
        }
        let side = (count as f64).sqrt().round() as usize;
        if side * side != count {
            return Err(ParseError::InvalidSimCad {
                reason: format!("{} corrections do not form a square grid", count),
            });
        }
        if side < 2 {
            return Err(ParseError::InvalidSimCad {
                reason: format!("grid of {}x{} has no cells", side, side),
            });
        }
        Ok(side)
    }

    pub fn to_xml(&self) -> String {
        let join = |values: &[f32]| {
            values
                .iter()
                .map(f32::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <{root}>\n  <{definition}>\n    \
             <{x} range=\"{x_range}\">{x_values}</{x}>\n    \
             <{y} range=\"{y_range}\">{y_values}</{y}>\n  \
             </{definition}>\n</{root}>\n",
            root = ROOT_ELEMENT,
            definition = DEFINITION_ELEMENT,
            x = X_ELEMENT,
            y = Y_ELEMENT,
            x_range = self.x_range,
            y_range = self.y_range,
            x_values = join(&self.x_corrections),
            y_values = join(&self.y_corrections),
        )
    }

    /// Triangle strip snaking through the grid rows. Texture coordinates
    /// keep the uncorrected grid position, y runs from the top row down.
    pub fn generate_buffer(&self, position: Vec2, size: Vec2) -> Result<Buffer, ParseError> {
        let side = self.grid_side()?;
        let last = (side - 1) as f32;

        let mut vertices = Vec::with_capacity(side * side);
        for r in 0..side {
            for c in 0..side {
                let i = r * side + c;
                let u = c as f32 / last;
                let v = 1.0 - r as f32 / last;
                let x = u + self.x_corrections[i] / self.x_range;
                let y = v - self.y_corrections[i] / self.y_range;
                vertices.push(Vertex::new(
                    2.0 * (x * size.x + position.x) - 1.0,
                    2.0 * (y * size.y + position.y) - 1.0,
                    u * size.x + position.x,
                    v * size.y + position.y,
                ));
            }
        }

        let side_u32 = side as u32;
        let mut indices = Vec::with_capacity(2 * side * (side - 1));
        for r in 0..side_u32 - 1 {
            if r % 2 == 0 {
                for c in 0..side_u32 {
                    indices.extend([c + r * side_u32, c + (r + 1) * side_u32]);
                }
            } else {
                for c in (1..side_u32).rev() {
                    indices.extend([c + (r + 1) * side_u32, c - 1 + r * side_u32]);
                }
            }
        }

        let buffer = Buffer::new(vertices, indices, GeometryType::TriangleStrip)?;
        info!(
            "SimCAD warp {}x{}: {} vertices, {} indices",
            side,
            side,
            buffer.vertex_count(),
            buffer.indices().len()
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_grid_spans_the_viewport() {
        let buffer = SimCadWarp::identity(3)
            .generate_buffer(Vec2::ZERO, Vec2::ONE)
            .unwrap();
        let vertices = buffer.vertices();

        assert_eq!(buffer.geometry(), GeometryType::TriangleStrip);
        assert_eq!((vertices[0].x, vertices[0].y), (-1.0, 1.0));
        assert_eq!((vertices[8].x, vertices[8].y), (1.0, -1.0));
        assert_eq!(buffer.indices()[..6], [0, 3, 1, 4, 2, 5]);
        // second row runs back right to left
        assert_eq!(buffer.indices()[6..], [8, 4, 7, 3]);
    }

    #[test]
    fn corrections_are_scaled_by_range() {
        let mut warp = SimCadWarp::identity(2);
        warp.x_range = 4.0;
        warp.y_range = 2.0;
        warp.x_corrections[0] = 1.0;
        warp.y_corrections[0] = 1.0;

        let buffer = warp.generate_buffer(Vec2::ZERO, Vec2::ONE).unwrap();
        let first = buffer.vertices()[0];
        assert_eq!((first.x, first.y), (-0.5, 0.0));
        assert_eq!((first.s, first.t), (0.0, 1.0));
    }

    #[test]
    fn xml_reads_back_exactly() {
        let mut warp = SimCadWarp::identity(3);
        warp.x_range = 100.0;
        warp.y_range = 50.0;
        warp.x_corrections[4] = 0.125;
        warp.y_corrections[7] = -3.3;

        let xml = warp.to_xml();
        assert_eq!(SimCadWarp::parse(xml.as_bytes()), Ok(warp));
    }

    #[test]
    fn parameters_without_range_are_skipped() {
        let xml = "<GeometryFile><GeometryDefinition>\
                   <X-FlatParameters>0 0 0 0</X-FlatParameters>\
                   <Y-FlatParameters range=\"1\">0 0 0 0</Y-FlatParameters>\
                   </GeometryDefinition></GeometryFile>";
        assert!(matches!(
            SimCadWarp::parse(xml.as_bytes()),
            Err(ParseError::InvalidSimCad { .. })
        ));
    }

    #[test]
    fn missing_elements_are_named() {
        assert_eq!(
            SimCadWarp::parse(b"<Other/>"),
            Err(ParseError::MissingElement {
                element: "GeometryFile"
            })
        );
        assert_eq!(
            SimCadWarp::parse(b"<GeometryFile></GeometryFile>"),
            Err(ParseError::MissingElement {
                element: "GeometryDefinition"
            })
        );
        assert!(matches!(
            SimCadWarp::parse(b"<GeometryFile>"),
            Err(ParseError::Xml { .. })
        ));
    }

    #[test]
    fn non_square_grid_is_rejected() {
        let mut warp = SimCadWarp::identity(2);
        warp.x_corrections.push(0.0);
        warp.y_corrections.push(0.0);
        assert!(matches!(
            SimCadWarp::parse(warp.to_xml().as_bytes()),
            Err(ParseError::InvalidSimCad { .. })
        ));
    }
}
