//! Swap-group and swap-barrier control.
//!
//! Hardware swap groups lock buffer swaps across GPUs and machines. They are
//! reached through a platform extension, so the cluster only sees the
//! [`SwapGroup`] capability trait. [`SoftwareSwapGroup`] is the portable
//! fallback: it keeps the bookkeeping and a frame counter, and the actual
//! cross-node lock is the master's wait for frame acknowledgements.

use log::{info, warn};
use thiserror::Error;

/// Errors reported by a swap-group implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapGroupError {
    #[error("Swap groups are not supported on this system")]
    Unsupported,

    #[error("Swap group {group} exceeds the maximum of {max}")]
    GroupOutOfRange { group: u32, max: u32 },

    #[error("Barrier {barrier} exceeds the maximum of {max}")]
    BarrierOutOfRange { barrier: u32, max: u32 },

    #[error("Cannot bind barrier {barrier} before joining group {group}")]
    NotInGroup { group: u32, barrier: u32 },

    #[error("Swap group call {call} failed")]
    CallFailed { call: &'static str },
}

/// Limits reported by [`SwapGroup::query_max_groups`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapGroupLimits {
    pub max_groups: u32,
    pub max_barriers: u32,
}

/// Capability interface over a swap-group implementation.
/// Group and barrier 0 mean "none": joining group 0 leaves, binding barrier 0 unbinds.
pub trait SwapGroup: Send {
    fn query_max_groups(&self) -> Result<SwapGroupLimits, SwapGroupError>;

    fn join_group(&mut self, group: u32) -> Result<(), SwapGroupError>;

    fn bind_barrier(&mut self, group: u32, barrier: u32) -> Result<(), SwapGroupError>;

    /// Number of swaps since the counter was last reset
    fn query_frame_count(&self) -> Result<u32, SwapGroupError>;

    fn reset_frame_count(&mut self) -> Result<(), SwapGroupError>;

    /// Called after every buffer swap. Hardware counters advance on their own.
    fn frame_swapped(&mut self) {}

    fn is_hardware(&self) -> bool {
        false
    }
}

/// Counter-based swap group used where no hardware support exists
#[derive(Debug, Default)]
pub struct SoftwareSwapGroup {
    group: u32,
    barrier: u32,
    frame_count: u32,
}

impl SoftwareSwapGroup {
    const MAX_GROUPS: u32 = 1;
    const MAX_BARRIERS: u32 = 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn barrier(&self) -> u32 {
        self.barrier
    }
}

impl SwapGroup for SoftwareSwapGroup {
    fn query_max_groups(&self) -> Result<SwapGroupLimits, SwapGroupError> {
        Ok(SwapGroupLimits {
            max_groups: Self::MAX_GROUPS,
            max_barriers: Self::MAX_BARRIERS,
        })
    }

    fn join_group(&mut self, group: u32) -> Result<(), SwapGroupError> {
        if group > Self::MAX_GROUPS {
            return Err(SwapGroupError::GroupOutOfRange {
                group,
                max: Self::MAX_GROUPS,
            });
        }
        self.group = group;
        if group == 0 {
            self.barrier = 0;
        }
        Ok(())
    }

    fn bind_barrier(&mut self, group: u32, barrier: u32) -> Result<(), SwapGroupError> {
        if barrier > Self::MAX_BARRIERS {
            return Err(SwapGroupError::BarrierOutOfRange {
                barrier,
                max: Self::MAX_BARRIERS,
            });
        }
        if barrier != 0 && (group == 0 || group != self.group) {
            return Err(SwapGroupError::NotInGroup { group, barrier });
        }
        self.barrier = barrier;
        Ok(())
    }

    fn query_frame_count(&self) -> Result<u32, SwapGroupError> {
        Ok(self.frame_count)
    }

    fn reset_frame_count(&mut self) -> Result<(), SwapGroupError> {
        self.frame_count = 0;
        Ok(())
    }

    fn frame_swapped(&mut self) {
        self.frame_count = self.frame_count.wrapping_add(1);
    }
}

/// The node's membership in the cluster-wide swap barrier
pub struct SwapBarrier {
    group: Box<dyn SwapGroup>,
    enabled: bool,
}

impl SwapBarrier {
    const GROUP: u32 = 1;
    const BARRIER: u32 = 1;

    pub fn new(group: Box<dyn SwapGroup>) -> Self {
        Self {
            group,
            enabled: false,
        }
    }

    pub fn software() -> Self {
        Self::new(Box::new(SoftwareSwapGroup::new()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_hardware(&self) -> bool {
        self.group.is_hardware()
    }

    /// Join group 1 and bind it to barrier 1. Resets the frame counter since
    /// membership changed.
    pub fn enable(&mut self) -> Result<(), SwapGroupError> {
        let limits = self.group.query_max_groups()?;
        if limits.max_groups == 0 || limits.max_barriers == 0 {
            return Err(SwapGroupError::Unsupported);
        }
        self.group.join_group(Self::GROUP)?;
        self.group.bind_barrier(Self::GROUP, Self::BARRIER)?;
        self.group.reset_frame_count()?;
        self.enabled = true;
        info!(
            "Joined swap group {} with barrier {} ({})",
            Self::GROUP,
            Self::BARRIER,
            if self.is_hardware() { "hardware" } else { "software" }
        );
        Ok(())
    }

    pub fn disable(&mut self) -> Result<(), SwapGroupError> {
        if !self.enabled {
            return Ok(());
        }
        self.group.bind_barrier(Self::GROUP, 0)?;
        self.group.join_group(0)?;
        self.enabled = false;
        info!("Left swap group {}", Self::GROUP);
        Ok(())
    }

    pub fn frame_swapped(&mut self) {
        if self.enabled {
            self.group.frame_swapped();
        }
    }

    pub fn frame_count(&self) -> Result<u32, SwapGroupError> {
        self.group.query_frame_count()
    }

    pub fn reset_frame_count(&mut self) -> Result<(), SwapGroupError> {
        self.group.reset_frame_count()
    }
}

impl Drop for SwapBarrier {
    fn drop(&mut self) {
        if let Err(error) = self.disable() {
            warn!("Failed to leave swap group: {}", error);
        }
    }
}
