//! Layout of a Data packet's payload: the master's session time (f64), a flag
//! telling whether application state follows, then the application state.
//! Time always comes first so clients can measure latency even when the
//! remaining fields fail to decode.

use concord_serde::SerdeErr;

use super::error::SyncError;
use crate::shared_data::{frame_codec::FrameCodec, shared_data::SharedData};

/// Fields every frame carries ahead of the application state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStamp {
    pub master_time: f64,
    pub has_state: bool,
}

/// Fill `data` with one frame. State is included when the codec reports a
/// change or when `force_snapshot` is set, e.g. because a client just joined.
/// Returns the stamp that was written.
pub fn encode_frame(
    data: &mut SharedData,
    master_time: f64,
    codec: &mut dyn FrameCodec,
    force_snapshot: bool,
) -> FrameStamp {
    let stamp = FrameStamp {
        master_time,
        has_state: force_snapshot || codec.is_dirty(),
    };

    data.begin_encode();
    data.write(&stamp.master_time);
    data.write(&stamp.has_state);
    if stamp.has_state {
        codec.encode(data);
    }
    stamp
}

pub fn decode_frame_stamp(data: &mut SharedData) -> Result<FrameStamp, SerdeErr> {
    let master_time = data.read::<f64>()?;
    let has_state = data.read::<bool>()?;
    Ok(FrameStamp {
        master_time,
        has_state,
    })
}

/// Apply a received frame. `on_stamp` sees the stamp before the application
/// state is decoded. Every byte of the frame must be consumed.
pub fn decode_frame(
    data: &mut SharedData,
    bytes: &[u8],
    codec: &mut dyn FrameCodec,
    frame: i32,
    peer: &str,
    snapshot_received: bool,
    on_stamp: impl FnOnce(&FrameStamp),
) -> Result<FrameStamp, SyncError> {
    let desync = |source: SerdeErr| SyncError::Desync {
        frame,
        peer: peer.to_string(),
        source,
    };

    data.begin_decode(bytes);
    let stamp = decode_frame_stamp(data).map_err(desync)?;
    on_stamp(&stamp);

    if stamp.has_state {
        codec.decode(data).map_err(desync)?;
    } else if !snapshot_received {
        return Err(SyncError::MissingSnapshot { frame });
    }

    let count = data.unread();
    if count > 0 {
        return Err(SyncError::TrailingBytes {
            frame,
            peer: peer.to_string(),
            count,
        });
    }
    Ok(stamp)
}
