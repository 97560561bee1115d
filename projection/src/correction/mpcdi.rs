use concord_serde::{ByteWrite, Serde, StreamWriter};
use log::info;

use crate::{
    correction::{
        buffer::{Buffer, GeometryType, Vertex},
        mesh_reader::MeshReader,
    },
    error::{MeshSection, ParseError},
};

pub const PFM_FORMAT_TAG: &str = "PF";
const MAX_HEADER_LENGTH: usize = 100;
const HEADER_LINES: usize = 3;
const BYTES_PER_ENTRY: usize = 12;

/// One grid point of a PFM warp file
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PfmEntry {
    pub x: f32,
    pub y: f32,
    pub error: f32,
}

/// Float grid of per-point corrections, stored in raster order starting at
/// the upper-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct PfmGrid {
    header: Vec<u8>,
    columns: u32,
    rows: u32,
    entries: Vec<PfmEntry>,
}

impl PfmGrid {
    pub fn new(columns: u32, rows: u32, entries: Vec<PfmEntry>) -> Result<Self, ParseError> {
        validate_dimensions(columns, rows)?;
        let (count, expected) = grid_size(columns, rows)?;
        if entries.len() != count {
            return Err(ParseError::TruncatedGrid {
                expected,
                available: entries.len().saturating_mul(BYTES_PER_ENTRY),
            });
        }
        Ok(Self {
            header: format!("{}\n{} {}\n-1.0\n", PFM_FORMAT_TAG, columns, rows).into_bytes(),
            columns,
            rows,
            entries,
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let header_length = find_header_end(bytes)?;
        let header = &bytes[..header_length];
        let text = std::str::from_utf8(header).map_err(|_| ParseError::InvalidHeader {
            reason: "header is not text".to_string(),
        })?;

        let tag: String = text.chars().take(PFM_FORMAT_TAG.len()).collect();
        if tag != PFM_FORMAT_TAG {
            return Err(ParseError::BadFormatTag { tag });
        }
        let mut fields = text
            .get(tag.len()..)
            .unwrap_or_default()
            .split_whitespace();
        let columns = parse_dimension(fields.next(), "columns")?;
        let rows = parse_dimension(fields.next(), "rows")?;
        validate_dimensions(columns, rows)?;

        let (count, expected) = grid_size(columns, rows)?;
        let mut reader = MeshReader::new(&bytes[header_length..]);
        if reader.remaining() < expected {
            return Err(ParseError::TruncatedGrid {
                expected,
                available: reader.remaining(),
            });
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let [x, y, error]: [f32; 3] = reader.read(MeshSection::Grid)?;
            entries.push(PfmEntry { x, y, error });
        }
        info!(
            "PFM grid {}x{}: read {} bytes of correction data",
            columns,
            rows,
            reader.position()
        );

        Ok(Self {
            header: header.to_vec(),
            columns,
            rows,
            entries,
        })
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn entries(&self) -> &[PfmEntry] {
        &self.entries
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = StreamWriter::with_capacity(self.header.len() + self.entries.len() * BYTES_PER_ENTRY);
        writer.write_bytes(&self.header);
        for entry in &self.entries {
            [entry.x, entry.y, entry.error].ser(&mut writer);
        }
        writer.to_bytes()
    }

    /// Triangle list over the grid. Grid points are spread evenly over [0,1]
    /// with y flipped, shifted by their correction and mapped to clip space;
    /// texture coordinates keep the uncorrected position.
    pub fn generate_buffer(&self) -> Result<Buffer, ParseError> {
        let columns = self.columns as usize;
        let rows = self.rows as usize;

        let vertices = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let smooth_x = (i % columns) as f32 / (columns - 1) as f32;
                let smooth_y = 1.0 - (i / columns) as f32 / (rows - 1) as f32;
                Vertex::new(
                    2.0 * (smooth_x + entry.x) - 1.0,
                    2.0 * (smooth_y + entry.y) - 1.0,
                    smooth_x,
                    smooth_y,
                )
            })
            .collect();

        let mut indices = Vec::with_capacity((columns - 1) * (rows - 1) * 6);
        for c in 0..columns - 1 {
            for r in 0..rows - 1 {
                let i0 = (r * columns + c) as u32;
                let i1 = (r * columns + c + 1) as u32;
                let i2 = ((r + 1) * columns + c + 1) as u32;
                let i3 = ((r + 1) * columns + c) as u32;

                indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
            }
        }

        Buffer::new(vertices, indices, GeometryType::TriangleList)
    }
}

/// Length of the header including its third newline
fn find_header_end(bytes: &[u8]) -> Result<usize, ParseError> {
    let mut newlines = 0;
    for (offset, byte) in bytes.iter().enumerate() {
        if offset >= MAX_HEADER_LENGTH {
            return Err(ParseError::InvalidHeader {
                reason: format!("no {} header lines within {} bytes", HEADER_LINES, MAX_HEADER_LENGTH),
            });
        }
        if *byte == b'\n' {
            newlines += 1;
            if newlines == HEADER_LINES {
                return Ok(offset + 1);
            }
        }
    }
    Err(ParseError::MissingHeader {
        available: bytes.len(),
    })
}

fn parse_dimension(field: Option<&str>, name: &str) -> Result<u32, ParseError> {
    let field = field.ok_or_else(|| ParseError::InvalidHeader {
        reason: format!("missing {}", name),
    })?;
    field.parse().map_err(|_| ParseError::InvalidHeader {
        reason: format!("invalid {} '{}'", name, field),
    })
}

/// Number of grid points and the bytes they occupy
fn grid_size(columns: u32, rows: u32) -> Result<(usize, usize), ParseError> {
    (columns as usize)
        .checked_mul(rows as usize)
        .and_then(|count| Some((count, count.checked_mul(BYTES_PER_ENTRY)?)))
        .ok_or(ParseError::VertexCountOverflow { columns, rows })
}

fn validate_dimensions(columns: u32, rows: u32) -> Result<(), ParseError> {
    if columns < 2 || rows < 2 {
        return Err(ParseError::InvalidHeader {
            reason: format!("grid of {}x{} has no cells", columns, rows),
        });
    }
    Ok(())
}
