use thiserror::Error;

/// Frame numbers count up to this value and then wrap to 0
pub const MAX_FRAME_NUMBER: i32 = 10000;

const FRAME_RING: i32 = MAX_FRAME_NUMBER + 1;

/// Errors that can occur when handling frame numbers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameNumberError {
    /// Frame numbers are never negative; a negative value means a corrupt header
    #[error("Frame number {value} is negative")]
    Negative { value: i32 },

    #[error("Frame number {value} exceeds the maximum of {MAX_FRAME_NUMBER}")]
    OutOfRange { value: i32 },
}

/// The number of a synchronized frame
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameNumber(i32);

impl FrameNumber {
    pub const ZERO: FrameNumber = FrameNumber(0);

    pub fn new(value: i32) -> Result<Self, FrameNumberError> {
        if value < 0 {
            return Err(FrameNumberError::Negative { value });
        }
        if value > MAX_FRAME_NUMBER {
            return Err(FrameNumberError::OutOfRange { value });
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    /// The following frame, wrapping to 0 after [`MAX_FRAME_NUMBER`]
    pub fn next(&self) -> Self {
        if self.0 >= MAX_FRAME_NUMBER {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }
}

impl std::fmt::Display for FrameNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns whether frame `a` comes after frame `b`, taking wrap-around into account
/// frame_greater_than(2,1) will return true
/// frame_greater_than(0,10000) will return true
/// frame_greater_than(1,1) will return false
pub fn frame_greater_than(a: i32, b: i32) -> bool {
    let half = FRAME_RING / 2;
    ((a > b) && (a - b <= half)) || ((a < b) && (b - a > half))
}

/// Retrieves the wrapping difference from frame `a` to frame `b`.
///
/// # Examples
/// ```
/// # use concord_shared::try_frame_diff;
/// assert_eq!(try_frame_diff(1, 2).unwrap(), 1);
/// assert_eq!(try_frame_diff(2, 1).unwrap(), -1);
/// assert_eq!(try_frame_diff(10000, 0).unwrap(), 1);
/// assert_eq!(try_frame_diff(0, 10000).unwrap(), -1);
/// ```
pub fn try_frame_diff(a: i32, b: i32) -> Result<i32, FrameNumberError> {
    let a = FrameNumber::new(a)?.get();
    let b = FrameNumber::new(b)?.get();

    let diff = (b - a).rem_euclid(FRAME_RING);
    if diff > FRAME_RING / 2 {
        Ok(diff - FRAME_RING)
    } else {
        Ok(diff)
    }
}
