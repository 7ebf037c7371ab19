use anyhow::{Context, Result};

use crate::device::{BufferId, LineDevice, PresentOutcome, ProgramId, VertexArrayId};
use crate::input::{InputState, Key, KeyState};
use crate::paint::Color;
use crate::scene::lines::VERTICES_PER_SEGMENT;
use crate::scene::{
    AttributeLayout, FrameCommands, LineCmd, LineSegment, LINE_SEGMENTS, SEGMENT_COUNT,
};

use super::HarnessConfig;

/// Render loop state. `Exiting` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Exiting,
}

/// Exit conditions sampled after a completed frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ExitSignals {
    pub exit_key_pressed: bool,
    pub close_requested: bool,
}

impl ExitSignals {
    /// Samples `input`, consuming a latched press of `exit_key`.
    pub fn poll(input: &mut InputState, exit_key: Key) -> Self {
        Self {
            exit_key_pressed: input.poll_key(exit_key) == KeyState::Pressed,
            close_requested: input.should_close(),
        }
    }

    #[inline]
    pub fn any(self) -> bool {
        self.exit_key_pressed || self.close_requested
    }
}

/// Result of one loop iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Step {
    /// `None` when no frame was drawn because the loop was already exiting.
    pub outcome: Option<PresentOutcome>,
    pub state: LoopState,
}

/// Owns the program, the vertex array and the line buffers for one run.
///
/// Lifecycle:
/// - [`LineHarness::new`]: vertex array, program, then one buffer per segment
/// - per iteration: [`step`](Self::step), which draws a frame and only then
///   checks the exit conditions
/// - [`teardown`](Self::teardown): buffers, vertex array, program, device
///   shutdown, in that order
pub struct LineHarness {
    vertex_array: VertexArrayId,
    program: ProgramId,
    buffers: [BufferId; SEGMENT_COUNT],

    attribute: AttributeLayout,
    clear_color: Color,
    exit_key: Key,

    state: LoopState,
    frames: u64,

    // Reused across frames.
    commands: FrameCommands,
}

impl LineHarness {
    /// Builds the program and uploads the line geometry.
    ///
    /// On failure, everything created so far is released again before the
    /// error is returned.
    pub fn new<D>(device: &mut D, config: &HarnessConfig) -> Result<Self>
    where
        D: LineDevice + ?Sized,
    {
        let vertex_array = device
            .create_vertex_array(config.attribute)
            .context("failed to create vertex array")?;

        let program = match device.create_program(vertex_array, &config.program) {
            Ok(program) => program,
            Err(err) => {
                device.delete_vertex_array(vertex_array);
                return Err(err.context("failed to build line program"));
            }
        };

        let buffers = match upload_segments(device, &LINE_SEGMENTS) {
            Ok(buffers) => buffers,
            Err(err) => {
                device.delete_vertex_array(vertex_array);
                device.delete_program(program);
                return Err(err);
            }
        };

        log::info!(
            "uploaded {SEGMENT_COUNT} line buffers ({} bytes each)",
            LineSegment::byte_len()
        );

        Ok(Self {
            vertex_array,
            program,
            buffers,
            attribute: config.attribute,
            clear_color: config.clear_color,
            exit_key: config.exit_key,
            state: LoopState::Running,
            frames: 0,
            commands: FrameCommands::new(),
        })
    }

    /// Records one frame: clear, bind the program, then per buffer bind,
    /// enable the attribute, draw one line, disable the attribute.
    pub fn record_frame(&self, out: &mut FrameCommands) {
        out.clear();
        out.push(LineCmd::Clear(self.clear_color));
        out.push(LineCmd::UseProgram(self.program));

        for &buffer in &self.buffers {
            out.push(LineCmd::BindBuffer(buffer));
            out.push(LineCmd::EnableAttribute(self.attribute));
            out.push(LineCmd::DrawLines {
                first: 0,
                count: VERTICES_PER_SEGMENT,
            });
            out.push(LineCmd::DisableAttribute {
                location: self.attribute.location,
            });
        }

        debug_assert!(out.attributes_balanced());
    }

    /// Records and submits one frame.
    ///
    /// Returns `None` without touching the device once the loop is exiting.
    /// A fatal present outcome moves the loop to `Exiting`.
    pub fn render_frame<D>(&mut self, device: &mut D) -> Option<PresentOutcome>
    where
        D: LineDevice + ?Sized,
    {
        if self.state == LoopState::Exiting {
            return None;
        }

        let mut commands = std::mem::take(&mut self.commands);
        self.record_frame(&mut commands);
        let outcome = device.submit(&commands);
        self.commands = commands;
        self.frames += 1;

        match outcome {
            PresentOutcome::Presented => {}
            PresentOutcome::Skipped => log::trace!("frame {} skipped", self.frames),
            PresentOutcome::Fatal => {
                log::error!("device failure while presenting; stopping");
                self.state = LoopState::Exiting;
            }
        }

        Some(outcome)
    }

    /// Evaluates the exit condition after a completed frame.
    pub fn end_frame(&mut self, signals: ExitSignals) -> LoopState {
        if self.state == LoopState::Running && signals.any() {
            if signals.exit_key_pressed {
                log::info!("{} pressed; exiting", self.exit_key);
            } else {
                log::info!("close requested; exiting");
            }
            self.state = LoopState::Exiting;
        }
        self.state
    }

    /// One loop iteration: draw a frame, then sample `input` and evaluate the
    /// exit condition.
    pub fn step<D>(&mut self, device: &mut D, input: &mut InputState) -> Step
    where
        D: LineDevice + ?Sized,
    {
        let outcome = self.render_frame(device);
        let state = self.end_frame(ExitSignals::poll(input, self.exit_key));
        Step { outcome, state }
    }

    /// Releases every resource in a fixed order and shuts the device down.
    pub fn teardown<D>(self, device: &mut D)
    where
        D: LineDevice + ?Sized,
    {
        for buffer in self.buffers {
            device.delete_buffer(buffer);
        }
        device.delete_vertex_array(self.vertex_array);
        device.delete_program(self.program);
        device.shutdown();

        log::debug!("harness torn down after {} frames", self.frames);
    }
}

fn upload_segments<D>(
    device: &mut D,
    segments: &[LineSegment; SEGMENT_COUNT],
) -> Result<[BufferId; SEGMENT_COUNT]>
where
    D: LineDevice + ?Sized,
{
    let mut uploaded = Vec::with_capacity(SEGMENT_COUNT);

    for (i, segment) in segments.iter().enumerate() {
        match device.create_buffer(&format!("linework line {i}"), segment.as_bytes()) {
            Ok(id) => uploaded.push(id),
            Err(err) => {
                for id in uploaded {
                    device.delete_buffer(id);
                }
                return Err(err.context(format!("failed to upload line {i}")));
            }
        }
    }

    uploaded.try_into().map_err(|v: Vec<BufferId>| {
        anyhow::anyhow!("uploaded {} line buffers, expected {SEGMENT_COUNT}", v.len())
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::device::ProgramSource;
    use crate::input::platform::translate_window_event;
    use crate::input::InputEvent;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreateVertexArray,
        CreateProgram(VertexArrayId),
        CreateBuffer { id: BufferId, len: usize },
        Submit(Vec<LineCmd>),
        DeleteBuffer(BufferId),
        DeleteVertexArray(VertexArrayId),
        DeleteProgram(ProgramId),
        Shutdown,
    }

    #[derive(Default)]
    struct RecordingDevice {
        calls: Vec<Call>,
        next: u32,
        fail_program: bool,
        fail_buffer_at: Option<usize>,
        buffers_created: usize,
        outcomes: VecDeque<PresentOutcome>,
    }

    impl RecordingDevice {
        fn next_raw(&mut self) -> u32 {
            self.next += 1;
            self.next
        }

        fn submits(&self) -> Vec<&[LineCmd]> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Submit(cmds) => Some(cmds.as_slice()),
                    _ => None,
                })
                .collect()
        }
    }

    impl LineDevice for RecordingDevice {
        fn create_vertex_array(&mut self, _layout: AttributeLayout) -> Result<VertexArrayId> {
            self.calls.push(Call::CreateVertexArray);
            Ok(VertexArrayId::from_raw(self.next_raw()))
        }

        fn create_program(
            &mut self,
            vertex_array: VertexArrayId,
            _source: &ProgramSource,
        ) -> Result<ProgramId> {
            self.calls.push(Call::CreateProgram(vertex_array));
            anyhow::ensure!(!self.fail_program, "link failed");
            Ok(ProgramId::from_raw(self.next_raw()))
        }

        fn create_buffer(&mut self, _label: &str, contents: &[u8]) -> Result<BufferId> {
            anyhow::ensure!(self.fail_buffer_at != Some(self.buffers_created), "out of memory");
            self.buffers_created += 1;
            let id = BufferId::from_raw(self.next_raw());
            self.calls.push(Call::CreateBuffer {
                id,
                len: contents.len(),
            });
            Ok(id)
        }

        fn submit(&mut self, frame: &FrameCommands) -> PresentOutcome {
            self.calls.push(Call::Submit(frame.commands().to_vec()));
            self.outcomes.pop_front().unwrap_or(PresentOutcome::Presented)
        }

        fn delete_buffer(&mut self, id: BufferId) {
            self.calls.push(Call::DeleteBuffer(id));
        }

        fn delete_vertex_array(&mut self, id: VertexArrayId) {
            self.calls.push(Call::DeleteVertexArray(id));
        }

        fn delete_program(&mut self, id: ProgramId) {
            self.calls.push(Call::DeleteProgram(id));
        }

        fn shutdown(&mut self) {
            self.calls.push(Call::Shutdown);
        }
    }

    fn harness(device: &mut RecordingDevice) -> LineHarness {
        LineHarness::new(device, &HarnessConfig::default()).unwrap()
    }

    fn expected_teardown(h: &LineHarness) -> Vec<Call> {
        let mut calls: Vec<Call> = h.buffers.iter().map(|&b| Call::DeleteBuffer(b)).collect();
        calls.push(Call::DeleteVertexArray(h.vertex_array));
        calls.push(Call::DeleteProgram(h.program));
        calls.push(Call::Shutdown);
        calls
    }

    #[test]
    fn uploads_one_full_buffer_per_segment() {
        let mut dev = RecordingDevice::default();
        let h = harness(&mut dev);

        assert_eq!(dev.calls[0], Call::CreateVertexArray);
        assert_eq!(dev.calls[1], Call::CreateProgram(h.vertex_array));

        let uploads: Vec<_> = dev.calls[2..]
            .iter()
            .map(|c| match c {
                Call::CreateBuffer { id, len } => (*id, *len),
                other => panic!("unexpected call {other:?}"),
            })
            .collect();

        assert_eq!(uploads.len(), SEGMENT_COUNT);
        for (slot, (id, len)) in uploads.iter().enumerate() {
            assert_eq!(*id, h.buffers[slot]);
            assert_eq!(*len, 2 * 3 * std::mem::size_of::<f32>());
        }
    }

    #[test]
    fn buffers_are_distinct() {
        let mut dev = RecordingDevice::default();
        let h = harness(&mut dev);
        let mut ids = h.buffers.to_vec();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SEGMENT_COUNT);
    }

    #[test]
    fn frame_draws_five_two_vertex_lines_in_upload_order() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);

        assert_eq!(h.render_frame(&mut dev), Some(PresentOutcome::Presented));

        let submits = dev.submits();
        assert_eq!(submits.len(), 1);
        let cmds = submits[0];

        assert_eq!(cmds[0], LineCmd::Clear(Color::DARK_BLUE));
        assert_eq!(cmds[1], LineCmd::UseProgram(h.program));

        let bound: Vec<BufferId> = cmds
            .iter()
            .filter_map(|c| match c {
                LineCmd::BindBuffer(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(bound, h.buffers.to_vec());

        let draws: Vec<_> = cmds
            .iter()
            .filter(|c| matches!(c, LineCmd::DrawLines { .. }))
            .collect();
        assert_eq!(draws.len(), SEGMENT_COUNT);
        assert!(draws
            .iter()
            .all(|c| **c == LineCmd::DrawLines { first: 0, count: 2 }));
    }

    #[test]
    fn every_draw_enables_and_disables_the_attribute_once() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        h.render_frame(&mut dev);

        let cmds = dev.submits()[0];
        let per_buffer = &cmds[2..];
        assert_eq!(per_buffer.len(), SEGMENT_COUNT * 4);

        for (slot, group) in per_buffer.chunks(4).enumerate() {
            assert_eq!(
                group,
                &[
                    LineCmd::BindBuffer(h.buffers[slot]),
                    LineCmd::EnableAttribute(AttributeLayout::POSITION_2D),
                    LineCmd::DrawLines { first: 0, count: 2 },
                    LineCmd::DisableAttribute { location: 0 },
                ]
            );
        }
    }

    #[test]
    fn frames_are_identical() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        h.render_frame(&mut dev);
        h.render_frame(&mut dev);

        let submits = dev.submits();
        assert_eq!(submits[0], submits[1]);
        assert_eq!(h.frames, 2);
    }

    #[test]
    fn nothing_is_drawn_after_exiting() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);

        h.render_frame(&mut dev);
        let state = h.end_frame(ExitSignals {
            exit_key_pressed: true,
            close_requested: false,
        });
        assert_eq!(state, LoopState::Exiting);

        assert_eq!(h.render_frame(&mut dev), None);
        assert_eq!(h.end_frame(ExitSignals::default()), LoopState::Exiting);
        assert_eq!(dev.submits().len(), 1);
    }

    #[test]
    fn quiet_signals_keep_running() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        h.render_frame(&mut dev);
        assert_eq!(h.end_frame(ExitSignals::default()), LoopState::Running);
    }

    fn sticky_input() -> InputState {
        let mut input = InputState::new();
        input.set_sticky_keys(true);
        input
    }

    fn tap(input: &mut InputState, key: Key) {
        input.apply_event(&InputEvent::Key {
            key,
            state: KeyState::Pressed,
        });
        input.apply_event(&InputEvent::Key {
            key,
            state: KeyState::Released,
        });
    }

    #[test]
    fn close_before_first_check_still_draws_one_frame() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        let mut input = sticky_input();

        input.apply_event(&InputEvent::CloseRequested);

        let first = h.step(&mut dev, &mut input);
        assert_eq!(first.outcome, Some(PresentOutcome::Presented));
        assert_eq!(first.state, LoopState::Exiting);

        let second = h.step(&mut dev, &mut input);
        assert_eq!(second.outcome, None);
        assert_eq!(dev.submits().len(), 1);
        assert_eq!(h.frames, 1);
    }

    #[test]
    fn window_close_event_ends_the_loop_after_the_frame() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        let mut input = sticky_input();

        assert_eq!(h.step(&mut dev, &mut input).state, LoopState::Running);

        let event = translate_window_event(&winit::event::WindowEvent::CloseRequested).unwrap();
        input.apply_event(&event);

        assert_eq!(h.step(&mut dev, &mut input).state, LoopState::Exiting);
        assert_eq!(dev.submits().len(), 2);
    }

    #[test]
    fn escape_tapped_between_frames_is_not_lost() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        let mut input = sticky_input();

        assert_eq!(h.step(&mut dev, &mut input).state, LoopState::Running);

        // Pressed and released before the next check.
        tap(&mut input, Key::Escape);

        let step = h.step(&mut dev, &mut input);
        assert_eq!(step.outcome, Some(PresentOutcome::Presented));
        assert_eq!(step.state, LoopState::Exiting);
        assert_eq!(h.frames, 2);
    }

    #[test]
    fn other_keys_do_not_end_the_loop() {
        let mut dev = RecordingDevice::default();
        let mut h = harness(&mut dev);
        let mut input = sticky_input();

        tap(&mut input, Key::Unknown(7));
        assert_eq!(h.step(&mut dev, &mut input).state, LoopState::Running);
    }

    #[test]
    fn teardown_order_is_the_same_for_key_and_close_exits() {
        for close in [false, true] {
            let mut dev = RecordingDevice::default();
            let mut h = harness(&mut dev);
            let mut input = sticky_input();
            let expected = expected_teardown(&h);

            let mut iterations = 0;
            loop {
                iterations += 1;
                if iterations == 3 {
                    if close {
                        input.apply_event(&InputEvent::CloseRequested);
                    } else {
                        tap(&mut input, Key::Escape);
                    }
                }
                if h.step(&mut dev, &mut input).state == LoopState::Exiting {
                    break;
                }
            }
            assert_eq!(h.frames, 3);

            h.teardown(&mut dev);

            let tail = &dev.calls[dev.calls.len() - expected.len()..];
            assert_eq!(tail, expected.as_slice());
        }
    }

    #[test]
    fn fatal_present_ends_the_loop() {
        let mut dev = RecordingDevice::default();
        dev.outcomes.push_back(PresentOutcome::Skipped);
        dev.outcomes.push_back(PresentOutcome::Fatal);
        let mut h = harness(&mut dev);
        let mut input = sticky_input();

        assert_eq!(h.step(&mut dev, &mut input).state, LoopState::Running);

        let step = h.step(&mut dev, &mut input);
        assert_eq!(step.outcome, Some(PresentOutcome::Fatal));
        assert_eq!(step.state, LoopState::Exiting);
        assert_eq!(h.state, LoopState::Exiting);
    }

    #[test]
    fn program_failure_releases_the_vertex_array() {
        let mut dev = RecordingDevice {
            fail_program: true,
            ..Default::default()
        };

        let err = LineHarness::new(&mut dev, &HarnessConfig::default())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("link failed"));

        let va = VertexArrayId::from_raw(1);
        assert_eq!(
            dev.calls,
            vec![
                Call::CreateVertexArray,
                Call::CreateProgram(va),
                Call::DeleteVertexArray(va),
            ]
        );
    }

    #[test]
    fn upload_failure_releases_everything_created() {
        let mut dev = RecordingDevice {
            fail_buffer_at: Some(2),
            ..Default::default()
        };

        assert!(LineHarness::new(&mut dev, &HarnessConfig::default()).is_err());

        let va = VertexArrayId::from_raw(1);
        let program = ProgramId::from_raw(2);
        let b0 = BufferId::from_raw(3);
        let b1 = BufferId::from_raw(4);
        assert_eq!(
            &dev.calls[4..],
            &[
                Call::DeleteBuffer(b0),
                Call::DeleteBuffer(b1),
                Call::DeleteVertexArray(va),
                Call::DeleteProgram(program),
            ]
        );
    }
}
