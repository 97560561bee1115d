mod mesh_reader;

pub mod buffer;
pub mod correction_mesh;
pub mod mpcdi;
pub mod paul_bourke;
pub mod sciss;
pub mod simcad;
