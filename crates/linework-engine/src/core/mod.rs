//! Core harness contracts.
//!
//! `LineHarness` owns the resource handles and the loop state. It talks to the
//! GPU only through `device::LineDevice`, so the runtime drives it with wgpu
//! and tests drive it with a recording device.

mod config;
mod harness;

pub use config::HarnessConfig;
pub use harness::{ExitSignals, LineHarness, LoopState, Step};
