use anyhow::Context;
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{HarnessConfig, LineHarness, LoopState};
use crate::device::{Gpu, GpuInit, InitError};
use crate::input::platform::translate_window_event;
use crate::input::InputState;
use crate::render::{LineResources, WgpuLineDevice};
use crate::time::{FrameClock, RunSummary};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,

    /// Latch key presses until the harness polls them.
    pub sticky_keys: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Tutorial 02 - Red triangle".to_string(),
            initial_size: LogicalSize::new(1024.0, 768.0),
            resizable: true,
            sticky_keys: true,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs the harness until it exits and tears it down.
    ///
    /// Blocks until the event loop returns. Any failure before the harness
    /// finished is reported as an [`InitError`].
    pub fn run(
        config: RuntimeConfig,
        harness: HarnessConfig,
        gpu_init: GpuInit,
    ) -> Result<RunSummary, InitError> {
        let event_loop = EventLoop::new()
            .context("failed to create winit EventLoop")
            .map_err(InitError::window_system)?;
        let mut state = AppState::new(config, harness, gpu_init);

        let result = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        state.finish(result)
    }
}

#[self_referencing]
struct WindowEntry {
    input: InputState,
    clock: FrameClock,
    resources: LineResources,
    harness: Option<LineHarness>,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: RuntimeConfig,
    harness_config: HarnessConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    started: bool,

    summary: Option<RunSummary>,
    init_error: Option<InitError>,
}

impl AppState {
    fn new(config: RuntimeConfig, harness_config: HarnessConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            harness_config,
            gpu_init,
            entry: None,
            started: false,
            summary: None,
            init_error: None,
        }
    }

    /// Combines the event loop result with what the run recorded.
    ///
    /// A loop error after a completed shutdown does not fail the run.
    fn finish(self, loop_result: anyhow::Result<()>) -> Result<RunSummary, InitError> {
        if let Some(err) = self.init_error {
            return Err(err);
        }

        match (loop_result, self.summary) {
            (Ok(()), summary) => Ok(summary.unwrap_or_default()),
            (Err(err), Some(summary)) => {
                log::warn!("{err:#}");
                Ok(summary)
            }
            (Err(err), None) => Err(InitError::window_system(err)),
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry, InitError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")
            .map_err(InitError::window_creation)?;

        let mut input = InputState::new();
        input.set_sticky_keys(self.config.sticky_keys);

        let gpu_init = self.gpu_init.clone();
        let mut entry = WindowEntryTryBuilder {
            input,
            clock: FrameClock::new(),
            resources: LineResources::new(),
            harness: None,
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        let harness_config = &self.harness_config;
        let harness = entry
            .with_mut(|fields| {
                let mut device = WgpuLineDevice::new(fields.gpu, fields.window, fields.resources);
                LineHarness::new(&mut device, harness_config)
            })
            .map_err(InitError::program)?;

        // Frame timing starts with the first frame, not with setup.
        entry.with_mut(|fields| {
            *fields.harness = Some(harness);
            *fields.clock = FrameClock::new();
        });

        Ok(entry)
    }

    /// Tears the harness down, drops the window and stops the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.entry.take() {
            let summary = entry.with_mut(|fields| {
                if let Some(harness) = fields.harness.take() {
                    let mut device =
                        WgpuLineDevice::new(fields.gpu, fields.window, fields.resources);
                    harness.teardown(&mut device);
                }
                fields.clock.summary()
            });

            log::info!(
                "{} frames in {:.2?} ({:.1} fps average, longest frame {:.2?})",
                summary.frames,
                summary.elapsed,
                summary.average_fps(),
                summary.longest_frame
            );
            self.summary = Some(summary);
        }

        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(err) => {
                log::error!("{err}");
                self.init_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; Fifo presentation paces the loop.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        if let Some(ev) = translate_window_event(&event) {
            entry.with_input_mut(|input| input.apply_event(&ev));
        }

        match &event {
            // Only flags the close; the window lives until the frame completes.
            WindowEvent::CloseRequested => {
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let state = entry.with_mut(|fields| {
                    let Some(harness) = fields.harness.as_mut() else {
                        return LoopState::Exiting;
                    };

                    let mut device =
                        WgpuLineDevice::new(fields.gpu, fields.window, fields.resources);
                    let step = harness.step(&mut device, fields.input);
                    if step.outcome.is_some() {
                        fields.clock.tick();
                    }
                    step.state
                });

                if state == LoopState::Exiting {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            log::debug!("event loop exiting with the window still open");
            self.shutdown(event_loop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_matches_the_fixed_setup() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.title, "Tutorial 02 - Red triangle");
        assert_eq!(cfg.initial_size, LogicalSize::new(1024.0, 768.0));
        assert!(cfg.sticky_keys);
    }

    fn app_state() -> AppState {
        AppState::new(
            RuntimeConfig::default(),
            HarnessConfig::default(),
            GpuInit::default(),
        )
    }

    #[test]
    fn finish_prefers_the_init_error() {
        let mut state = app_state();
        state.summary = Some(RunSummary::default());
        state.init_error = Some(InitError::GpuLoader("no adapter".into()));

        assert!(matches!(state.finish(Ok(())), Err(InitError::GpuLoader(_))));
    }

    #[test]
    fn finish_without_a_window_reports_zero_frames() {
        let state = app_state();
        assert_eq!(state.finish(Ok(())).ok().map(|s| s.frames), Some(0));
    }

    #[test]
    fn loop_error_after_shutdown_keeps_the_summary() {
        let mut state = app_state();
        state.summary = Some(RunSummary {
            frames: 42,
            ..RunSummary::default()
        });

        let summary = state
            .finish(Err(anyhow::anyhow!("display connection lost")))
            .ok()
            .unwrap();
        assert_eq!(summary.frames, 42);
    }

    #[test]
    fn loop_error_before_any_run_is_a_window_system_failure() {
        let state = app_state();
        let err = state
            .finish(Err(anyhow::anyhow!("display connection lost")))
            .err()
            .unwrap();
        assert!(matches!(err, InitError::WindowSystemInit(_)));
    }
}
