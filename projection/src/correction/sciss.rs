use concord_serde::{ByteWrite, ConstByteLength, Serde, SerdeErr, StreamReader, StreamWriter};
use glam::{Quat, Vec2, Vec3};
use log::{debug, info, warn};

use crate::{
    correction::{
        buffer::{Buffer, GeometryType, Vertex},
        mesh_reader::MeshReader,
    },
    error::{ConfigError, MeshSection, ParseError},
    user::User,
    viewport::{BaseViewport, DEFAULT_VIEW_PLANE_DISTANCE},
};

pub const SCISS_FILE_ID: [u8; 3] = *b"SGC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SciSSMapping {
    Planar,
    Cube,
    /// Any other value. Kept so the file writes back unchanged; the mesh is
    /// generated the same way as for a cube mapping.
    Other(u32),
}

impl SciSSMapping {
    pub fn id(&self) -> u32 {
        match self {
            SciSSMapping::Planar => 0,
            SciSSMapping::Cube => 1,
            SciSSMapping::Other(value) => *value,
        }
    }

    pub fn from_id(value: u32) -> Self {
        match value {
            0 => SciSSMapping::Planar,
            1 => SciSSMapping::Cube,
            value => SciSSMapping::Other(value),
        }
    }
}

/// View record of a SciSS file: orientation, viewer position and signed FOVs
/// in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SciSSViewData {
    pub rotation: Quat,
    pub position: Vec3,
    pub fov_up: f32,
    pub fov_down: f32,
    pub fov_left: f32,
    pub fov_right: f32,
}

impl Default for SciSSViewData {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
            fov_up: 20.0,
            fov_down: -20.0,
            fov_left: -20.0,
            fov_right: 20.0,
        }
    }
}

impl SciSSViewData {
    /// Moves the user to the recorded view position and rebuilds the viewport
    /// plane from the recorded orientation and FOVs
    pub fn apply(&self, viewport: &mut BaseViewport, user: &mut User) -> Result<(), ConfigError> {
        user.set_position(self.position);
        viewport.set_view_plane_coords_using_fovs(
            self.fov_up,
            self.fov_down,
            self.fov_left,
            self.fov_right,
            self.rotation,
            DEFAULT_VIEW_PLANE_DISTANCE,
        )
    }
}

impl Serde for SciSSViewData {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.rotation.ser(writer);
        self.position.ser(writer);
        self.fov_up.ser(writer);
        self.fov_down.ser(writer);
        self.fov_left.ser(writer);
        self.fov_right.ser(writer);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            rotation: Quat::de(reader)?,
            position: Vec3::de(reader)?,
            fov_up: f32::de(reader)?,
            fov_down: f32::de(reader)?,
            fov_left: f32::de(reader)?,
            fov_right: f32::de(reader)?,
        })
    }
}

impl ConstByteLength for SciSSViewData {
    fn const_byte_length() -> usize {
        44
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SciSSVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub tx: f32,
    pub ty: f32,
    pub tz: f32,
}

impl Serde for SciSSVertex {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        for value in [self.x, self.y, self.z, self.tx, self.ty, self.tz] {
            value.ser(writer);
        }
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let [x, y, z, tx, ty, tz] = <[f32; 6]>::de(reader)?;
        Ok(Self {
            x,
            y,
            z,
            tx,
            ty,
            tz,
        })
    }
}

impl ConstByteLength for SciSSVertex {
    fn const_byte_length() -> usize {
        24
    }
}

/// Contents of a packed binary SciSS warp mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SciSSFile {
    pub version: u8,
    pub mapping: SciSSMapping,
    pub view: SciSSViewData,
    pub counts: [u32; 2],
    pub vertices: Vec<SciSSVertex>,
    pub indices: Vec<u32>,
}

impl SciSSFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = MeshReader::new(bytes);

        let file_id = reader.read_bytes(MeshSection::FileId, SCISS_FILE_ID.len())?;
        if file_id != SCISS_FILE_ID {
            return Err(ParseError::InvalidFileId {
                found: file_id.to_vec(),
            });
        }

        let version: u8 = reader.read(MeshSection::Version)?;
        debug!("SciSS file version {}", version);

        let mapping = SciSSMapping::from_id(reader.read(MeshSection::MappingType)?);
        match mapping {
            SciSSMapping::Other(value) => warn!("Unknown SciSS mapping type {}, reading it as cube", value),
            mapping => debug!("SciSS mapping type {:?}", mapping),
        }

        let view: SciSSViewData = reader.read(MeshSection::ViewData)?;
        debug!(
            "SciSS view: rotation {:?}, position {:?}, fov up {} down {} left {} right {}",
            view.rotation, view.position, view.fov_up, view.fov_down, view.fov_left, view.fov_right
        );

        let counts: [u32; 2] = reader.read(MeshSection::VertexCounts)?;
        let vertex_count = Self::expected_vertex_count(version, counts)?;
        let vertices = reader.read_vec(MeshSection::Vertices, vertex_count)?;

        let index_count: u32 = reader.read(MeshSection::IndexCount)?;
        let indices = reader.read_vec(MeshSection::Indices, index_count as usize)?;

        Ok(Self {
            version,
            mapping,
            view,
            counts,
            vertices,
            indices,
        })
    }

    /// Version 2 files store the vertex count in the second descriptor; older
    /// files store grid dimensions.
    pub fn expected_vertex_count(version: u8, counts: [u32; 2]) -> Result<usize, ParseError> {
        if version == 2 {
            return Ok(counts[1] as usize);
        }
        (counts[0] as usize)
            .checked_mul(counts[1] as usize)
            .ok_or(ParseError::VertexCountOverflow {
                columns: counts[0],
                rows: counts[1],
            })
    }

    pub fn geometry(&self) -> GeometryType {
        if self.version == 2 && self.counts[0] == 4 {
            GeometryType::TriangleList
        } else {
            GeometryType::TriangleStrip
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = StreamWriter::new();
        writer.write_bytes(&SCISS_FILE_ID);
        self.version.ser(&mut writer);
        self.mapping.id().ser(&mut writer);
        self.view.ser(&mut writer);
        self.counts.ser(&mut writer);
        for vertex in &self.vertices {
            vertex.ser(&mut writer);
        }
        (self.indices.len() as u32).ser(&mut writer);
        for index in &self.indices {
            index.ser(&mut writer);
        }
        writer.to_bytes()
    }

    /// Maps the file's normalized vertices into the viewport rectangle.
    /// Positions and texture coordinates are clamped to [0,1] first.
    pub fn generate_buffer(&self, position: Vec2, size: Vec2) -> Result<Buffer, ParseError> {
        let vertices = self
            .vertices
            .iter()
            .map(|vertex| {
                let x = vertex.x.clamp(0.0, 1.0);
                let y = vertex.y.clamp(0.0, 1.0);
                let tx = vertex.tx.clamp(0.0, 1.0);
                let ty = vertex.ty.clamp(0.0, 1.0);

                Vertex::new(
                    2.0 * (x * size.x + position.x) - 1.0,
                    2.0 * ((1.0 - y) * size.y + position.y) - 1.0,
                    tx * size.x + position.x,
                    ty * size.y + position.y,
                )
            })
            .collect();

        let buffer = Buffer::new(vertices, self.indices.clone(), self.geometry())?;
        info!(
            "SciSS mesh: {} vertices, {} indices, {:?}",
            buffer.vertex_count(),
            buffer.indices().len(),
            buffer.geometry()
        );
        Ok(buffer)
    }
}
