/// PROPERTY-BASED TESTS: every mesh a loader produces only indexes vertices
/// it actually has

use std::fmt::Write;

use glam::Vec2;
use proptest::prelude::*;

use concord_projection::{
    CorrectionMesh, GeometryType, MeshFormat, ParseError, PaulBourkeMesh, PfmEntry, PfmGrid,
    SciSSFile, SciSSMapping, SciSSVertex, SciSSViewData,
};

fn bourke_text(columns: u32, rows: u32, intensities: &[f32]) -> String {
    let mut text = format!("2\n{} {}\n", columns, rows);
    for (i, intensity) in intensities.iter().enumerate() {
        let column = (i as u32 % columns) as f32 / (columns - 1) as f32;
        let row = (i as u32 / columns) as f32 / (rows - 1) as f32;
        writeln!(
            text,
            "{} {} {} {} {}",
            column * 2.0 - 1.0,
            row * 2.0 - 1.0,
            column,
            row,
            intensity
        )
        .unwrap();
    }
    text
}

fn sciss_file(version: u8, counts: [u32; 2], vertex_count: usize, indices: Vec<u32>) -> SciSSFile {
    SciSSFile {
        version,
        mapping: SciSSMapping::Planar,
        view: SciSSViewData::default(),
        counts,
        vertices: vec![SciSSVertex::default(); vertex_count],
        indices,
    }
}

fn assert_indices_in_range(indices: &[u32], vertex_count: usize) {
    assert!(indices.iter().all(|index| (*index as usize) < vertex_count));
}

#[test]
fn pfm_grid_layout_matches_its_dimensions() {
    let entries = vec![PfmEntry::default(); 12];
    let bytes = PfmGrid::new(4, 3, entries).unwrap().to_bytes();
    assert_eq!(bytes.len() - b"PF\n4 3\n-1.0\n".len(), 144);

    let mesh = CorrectionMesh::from_bytes(MeshFormat::Mpcdi, &bytes, Vec2::ZERO, Vec2::ONE).unwrap();
    assert_eq!(mesh.buffer.triangle_count(), 12);
}

#[test]
fn sciss_counts_follow_the_version() {
    for (version, counts) in [(2u8, [4u32, 100u32]), (1, [10, 10])] {
        let bytes = sciss_file(version, counts, 100, vec![0, 1, 2]).to_bytes();
        let parsed = SciSSFile::parse(&bytes).unwrap();
        assert_eq!(parsed.vertices.len(), 100);
    }
}

proptest! {
    #[test]
    fn prop_pfm_indices_cover_every_cell(columns in 2u32..24, rows in 2u32..24) {
        let entries = vec![PfmEntry::default(); (columns * rows) as usize];
        let bytes = PfmGrid::new(columns, rows, entries).unwrap().to_bytes();

        let buffer = PfmGrid::parse(&bytes).unwrap().generate_buffer().unwrap();
        prop_assert_eq!(buffer.vertex_count(), (columns * rows) as usize);
        prop_assert_eq!(buffer.geometry(), GeometryType::TriangleList);
        prop_assert_eq!(buffer.triangle_count(), 2 * (columns - 1) as usize * (rows - 1) as usize);
        assert_indices_in_range(buffer.indices(), buffer.vertex_count());
    }

    #[test]
    fn prop_bourke_skips_hidden_cells(
        (columns, rows, intensities) in (2u32..12, 2u32..12).prop_flat_map(|(columns, rows)| {
            (
                Just(columns),
                Just(rows),
                prop::collection::vec(prop_oneof![Just(-1.0f32), 0.0f32..1.0], (columns * rows) as usize),
            )
        })
    ) {
        let text = bourke_text(columns, rows, &intensities);
        let mesh = PaulBourkeMesh::parse(text.as_bytes()).unwrap();
        let buffer = mesh.generate_buffer(Vec2::ZERO, Vec2::ONE).unwrap();

        prop_assert_eq!(buffer.vertex_count(), intensities.len());
        prop_assert!(buffer.triangle_count() <= 2 * (columns - 1) as usize * (rows - 1) as usize);
        assert_indices_in_range(buffer.indices(), buffer.vertex_count());
        if intensities.iter().all(|intensity| *intensity >= 0.0) {
            prop_assert_eq!(buffer.triangle_count(), 2 * (columns - 1) as usize * (rows - 1) as usize);
        }
    }

    #[test]
    fn prop_sciss_never_yields_dangling_indices(
        vertex_count in 3usize..64,
        indices in prop::collection::vec(0u32..80, 0..96),
    ) {
        let bytes = sciss_file(2, [4, vertex_count as u32], vertex_count, indices.clone()).to_bytes();
        let parsed = SciSSFile::parse(&bytes).unwrap();

        match parsed.generate_buffer(Vec2::ZERO, Vec2::ONE) {
            Ok(buffer) => {
                prop_assert!(indices.iter().all(|index| (*index as usize) < vertex_count));
                assert_indices_in_range(buffer.indices(), buffer.vertex_count());
            }
            Err(ParseError::IndexOutOfRange { index, vertex_count: count, .. }) => {
                prop_assert_eq!(count, vertex_count);
                prop_assert!(index as usize >= vertex_count);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
