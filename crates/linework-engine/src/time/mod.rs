//! Time subsystem.
//!
//! Frame counting and pacing statistics, independent of the runtime.
//! Call `FrameClock::tick()` once per rendered frame.

mod frame_clock;

pub use frame_clock::{FrameClock, RunSummary};
