mod session_clock;
mod timer;

pub use session_clock::{SessionClock, TimeError};
pub use timer::Timer;
