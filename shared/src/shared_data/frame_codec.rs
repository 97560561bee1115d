use concord_serde::SerdeErr;

use super::shared_data::SharedData;

/// Application hook that writes and reads the per-frame cluster state.
/// `decode` must read exactly the fields `encode` wrote, in the same order.
pub trait FrameCodec {
    /// Called on the master during the encode phase
    fn encode(&mut self, data: &mut SharedData);

    /// Called on clients during the decode phase
    fn decode(&mut self, data: &mut SharedData) -> Result<(), SerdeErr>;

    /// Whether the state changed since the last `encode`. When false the
    /// master sends only the frame stamp, unless a client needs a snapshot.
    fn is_dirty(&self) -> bool {
        true
    }
}
