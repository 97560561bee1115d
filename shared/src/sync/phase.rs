use super::error::SyncError;

/// The stages every node walks through once per frame, in this order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyncPhase {
    Idle,
    /// Master mutates authoritative state, clients wait
    PreSync,
    /// Master serializes state
    Encode,
    /// State travels from master to clients
    Transmit,
    /// Clients deserialize state
    Decode,
    /// All nodes render the same state
    Render,
    /// Local rendering is complete
    SwapReady,
    /// Waiting for every member of the swap barrier
    SwapBarrierWait,
}

impl SyncPhase {
    pub fn next(&self) -> SyncPhase {
        match self {
            SyncPhase::Idle => SyncPhase::PreSync,
            SyncPhase::PreSync => SyncPhase::Encode,
            SyncPhase::Encode => SyncPhase::Transmit,
            SyncPhase::Transmit => SyncPhase::Decode,
            SyncPhase::Decode => SyncPhase::Render,
            SyncPhase::Render => SyncPhase::SwapReady,
            SyncPhase::SwapReady => SyncPhase::SwapBarrierWait,
            SyncPhase::SwapBarrierWait => SyncPhase::Idle,
        }
    }
}

/// Tracks the current phase and rejects anything but the next one
#[derive(Debug)]
pub struct SyncStateMachine {
    phase: SyncPhase,
}

impl SyncStateMachine {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn advance(&mut self, to: SyncPhase) -> Result<(), SyncError> {
        if self.phase.next() != to {
            return Err(SyncError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }

    /// Abandon the current frame after an error
    pub fn reset(&mut self) {
        self.phase = SyncPhase::Idle;
    }
}

impl Default for SyncStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
