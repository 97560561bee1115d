use std::fmt;

use concord_serde::SerdeErr;
use glam::Vec2;
use thiserror::Error;

/// Part of a correction-mesh file a parser was reading when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSection {
    FileId,
    Version,
    MappingType,
    ViewData,
    VertexCounts,
    Vertices,
    IndexCount,
    Indices,
    Header,
    Grid,
}

impl fmt::Display for MeshSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeshSection::FileId => "file id",
            MeshSection::Version => "file version",
            MeshSection::MappingType => "mapping type",
            MeshSection::ViewData => "view data",
            MeshSection::VertexCounts => "vertex counts",
            MeshSection::Vertices => "vertices",
            MeshSection::IndexCount => "index count",
            MeshSection::Indices => "indices",
            MeshSection::Header => "header",
            MeshSection::Grid => "grid",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Failed to read mesh file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse correction mesh {path}: {source}")]
    InFile {
        path: String,
        #[source]
        source: Box<ParseError>,
    },

    #[error("Cannot determine correction mesh format of {path}")]
    UnknownFormat { path: String },

    #[error("Unknown correction mesh hint '{hint}'")]
    UnknownHint { hint: String },

    #[error("Mesh {section} truncated: needed {needed} bytes, {available} available")]
    Truncated {
        section: MeshSection,
        needed: usize,
        available: usize,
    },

    #[error("Malformed mesh {section}: {source}")]
    Malformed {
        section: MeshSection,
        #[source]
        source: SerdeErr,
    },

    #[error("Incorrect SciSS file id {found:?}")]
    InvalidFileId { found: Vec<u8> },

    #[error("Mesh vertex count {columns}x{rows} overflows")]
    VertexCountOverflow { columns: u32, rows: u32 },

    #[error("PFM header not found: data ended after {available} bytes")]
    MissingHeader { available: usize },

    #[error("Invalid PFM header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Unsupported PFM format tag '{tag}'")]
    BadFormatTag { tag: String },

    #[error("PFM grid truncated: expected {expected} bytes, {available} available")]
    TruncatedGrid { expected: usize, available: usize },

    #[error("Invalid SimCAD XML: {message}")]
    Xml { message: String },

    #[error("SimCAD file has no {element} element")]
    MissingElement { element: &'static str },

    #[error("Invalid SimCAD warp: {reason}")]
    InvalidSimCad { reason: String },

    #[error("Invalid mesh line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u32,
        position: usize,
        vertex_count: usize,
    },
}

impl ParseError {
    /// The error underneath any file context
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::InFile { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Projection plane corners are collinear or coincident")]
    DegeneratePlane,

    #[error("Eye lies on the projection plane (distance {distance})")]
    EyeOnPlane { distance: f32 },

    #[error("Eye lies behind the projection plane (distance {distance})")]
    EyeBehindPlane { distance: f32 },

    #[error("Invalid clip planes: near {near}, far {far}")]
    InvalidClipPlanes { near: f32, far: f32 },

    #[error("Viewport rectangle at {position} with size {size} is outside [0,1]x[0,1]")]
    InvalidViewportRect { position: Vec2, size: Vec2 },

    #[error("Invalid field of view: {degrees} degrees")]
    InvalidFieldOfView { degrees: f32 },

    #[error("Invalid aspect ratio {aspect}")]
    InvalidAspectRatio { aspect: f32 },

    #[error("Invalid view plane distance {distance}")]
    InvalidDistance { distance: f32 },

    #[error("No user named '{name}'")]
    UnknownUser { name: String },

    #[error("A user named '{name}' already exists")]
    DuplicateUser { name: String },

    #[error("Fisheye field of view {fov} exceeds {max} degrees for the selected cube layout")]
    FisheyeFovTooWide { fov: f32, max: f32 },

    #[error("Invalid dome diameter {diameter}")]
    InvalidDiameter { diameter: f32 },

    #[error("Invalid cubemap resolution {resolution} with {samples} samples")]
    InvalidCubemap { resolution: u32, samples: u32 },

    #[error("Invalid fisheye crop factors {crop:?}")]
    InvalidCrop { crop: [f32; 4] },

    #[error("Spout output has no enabled faces")]
    NoEnabledFaces,
}

/// Failure to allocate an offscreen resource for a projection face
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to create {resource} for face {face}: {reason}")]
pub struct ResourceError {
    pub face: &'static str,
    pub resource: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
