pub mod local_cluster;
pub mod mock_backend;
pub mod test_codec;

pub use local_cluster::{ClientRun, ClusterOptions, ClusterRun, LocalCluster};
pub use mock_backend::{MockRenderBackend, RecordedWarp};
pub use test_codec::{AbcCodec, MissingFieldCodec};
