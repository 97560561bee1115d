use std::{fs, path::Path, str::FromStr};

use glam::Vec2;
use log::info;

use crate::{
    correction::{
        buffer::Buffer,
        mpcdi::PfmGrid,
        paul_bourke::PaulBourkeMesh,
        sciss::{SciSSFile, SciSSViewData},
        simcad::SimCadWarp,
    },
    error::ParseError,
};

/// Correction mesh file formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    SciSS,
    Mpcdi,
    PaulBourke,
    SimCad,
}

impl MeshFormat {
    /// Picks the format from an explicit hint, falling back to the file
    /// extension
    pub fn detect(path: &Path, hint: Option<MeshFormat>) -> Result<Self, ParseError> {
        if let Some(format) = hint {
            return Ok(format);
        }
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("sgc") => Ok(MeshFormat::SciSS),
            Some("pfm") | Some("mpcdi") => Ok(MeshFormat::Mpcdi),
            Some("data") => Ok(MeshFormat::PaulBourke),
            Some("xml") => Ok(MeshFormat::SimCad),
            _ => Err(ParseError::UnknownFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

impl FromStr for MeshFormat {
    type Err = ParseError;

    fn from_str(hint: &str) -> Result<Self, Self::Err> {
        match hint.to_ascii_lowercase().as_str() {
            "sciss" => Ok(MeshFormat::SciSS),
            "mpcdi" | "pfm" => Ok(MeshFormat::Mpcdi),
            "bourke" | "paulbourke" => Ok(MeshFormat::PaulBourke),
            "simcad" => Ok(MeshFormat::SimCad),
            _ => Err(ParseError::UnknownHint {
                hint: hint.to_string(),
            }),
        }
    }
}

/// A parsed mesh ready for the warp pass. SciSS files also carry the view
/// they were calibrated for.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionMesh {
    pub format: MeshFormat,
    pub buffer: Buffer,
    pub view: Option<SciSSViewData>,
}

impl CorrectionMesh {
    pub fn load(
        path: &Path,
        hint: Option<MeshFormat>,
        position: Vec2,
        size: Vec2,
    ) -> Result<Self, ParseError> {
        let format = MeshFormat::detect(path, hint)?;
        info!("Reading {:?} correction mesh from '{}'", format, path.display());
        let bytes = fs::read(path).map_err(|error| ParseError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        let mesh = Self::from_bytes(format, &bytes, position, size).map_err(|error| {
            ParseError::InFile {
                path: path.display().to_string(),
                source: Box::new(error),
            }
        })?;
        info!(
            "Loaded '{}': {} vertices, {} indices",
            path.display(),
            mesh.buffer.vertex_count(),
            mesh.buffer.indices().len()
        );
        Ok(mesh)
    }

    pub fn from_bytes(
        format: MeshFormat,
        bytes: &[u8],
        position: Vec2,
        size: Vec2,
    ) -> Result<Self, ParseError> {
        let (buffer, view) = match format {
            MeshFormat::SciSS => {
                let file = SciSSFile::parse(bytes)?;
                (file.generate_buffer(position, size)?, Some(file.view))
            }
            MeshFormat::Mpcdi => (PfmGrid::parse(bytes)?.generate_buffer()?, None),
            MeshFormat::PaulBourke => (
                PaulBourkeMesh::parse(bytes)?.generate_buffer(position, size)?,
                None,
            ),
            MeshFormat::SimCad => (
                SimCadWarp::parse(bytes)?.generate_buffer(position, size)?,
                None,
            ),
        };
        Ok(Self {
            format,
            buffer,
            view,
        })
    }
}
