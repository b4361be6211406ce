//! Integration tests for the frame loop core
//!
//! Runs the full loop over fakes: cursor tracking against a device clock
//! that advances on its own, and byte-for-byte determinism across runs.

#[cfg(test)]
mod tests {
    use crate::audio::{AudioDevice, BYTES_PER_SAMPLE, CursorDriver, ToneSynth};
    use crate::input::ControllerState;
    use crate::platform::AppEvent;
    use crate::runtime::{LoopState, Runtime};
    use crate::test_utils::{ScriptedControllers, ScriptedEvents, TestPlatform, pad, test_runtime};

    // ============================================================================
    // Cursor Tracking
    // ============================================================================

    #[test]
    fn test_ten_iterations_track_play_cursor() {
        let mut runtime = test_runtime(
            ScriptedEvents::new(),
            ScriptedControllers::new(),
            CursorDriver::FixedStep(2000),
        );
        assert_eq!(runtime.sound().secondary_buffer_size(), 48_000 * 4);
        assert_eq!(runtime.sound().latency_sample_count(), 3200);
        runtime.start().unwrap();

        let buffer_size = runtime.sound().secondary_buffer_size() as u64;
        let mut last_index = runtime.sound().running_sample_index();
        for _ in 0..10 {
            assert_eq!(runtime.frame(), LoopState::Running);

            let index = runtime.sound().running_sample_index();
            assert!(index >= last_index);
            last_index = index;

            let written = index * BYTES_PER_SAMPLE as u64;
            let played = runtime.platform().audio.played_bytes();
            assert!(written >= played);
            assert!(written - played <= buffer_size);
            // Exactly one latency window ahead
            assert_eq!(written - played, 12_800);
        }

        assert_eq!(runtime.platform().audio.played_bytes(), 20_000);
        assert_eq!(last_index, 3200 + 10 * 500);
    }

    #[test]
    fn test_cursor_tracking_across_ring_wrap() {
        let mut runtime = test_runtime(
            ScriptedEvents::new(),
            ScriptedControllers::new(),
            CursorDriver::FixedStep(7_000),
        );
        runtime.start().unwrap();

        let buffer_size = runtime.sound().secondary_buffer_size() as u64;
        // 60 frames of 7000 bytes laps the 192000 byte ring twice
        for _ in 0..60 {
            runtime.frame();
            let written = runtime.sound().running_sample_index() * BYTES_PER_SAMPLE as u64;
            let played = runtime.platform().audio.played_bytes();
            assert_eq!(written - played, 12_800);
            assert!(written - played <= buffer_size);
        }
        assert!(runtime.platform().audio.played_bytes() > 2 * buffer_size);
    }

    #[test]
    fn test_ring_holds_phase_contiguous_stream() {
        let mut runtime = test_runtime(
            ScriptedEvents::new(),
            ScriptedControllers::new(),
            CursorDriver::FixedStep(4000),
        );
        runtime.start().unwrap();
        for _ in 0..5 {
            runtime.frame();
        }

        // Everything written so far sits at [0, written) without wrapping
        let written = (runtime.sound().running_sample_index() * BYTES_PER_SAMPLE as u64) as usize;
        let ring = runtime.platform().audio.ring();
        let mut reference = ToneSynth::new(48_000, 256, 5000);
        for frame in ring[..written].chunks_exact(4) {
            let expected = reference.next_sample().to_le_bytes();
            assert_eq!(&frame[..2], &expected);
            assert_eq!(&frame[2..], &expected);
        }
    }

    // ============================================================================
    // Determinism
    // ============================================================================

    fn scripted_run() -> Runtime<TestPlatform> {
        let mut events = ScriptedEvents::new();
        events
            .idle(3)
            .push_batch([AppEvent::Resized {
                width: 48,
                height: 24,
            }])
            .idle(5)
            .push_batch([AppEvent::Quit]);

        let mut controllers = ScriptedControllers::new();
        for step in 0..8i16 {
            controllers.push_frame([
                pad(step * 4000, -(step * 3000)),
                ControllerState::Disconnected,
                ControllerState::Disconnected,
                ControllerState::Disconnected,
            ]);
        }

        let mut runtime = test_runtime(events, controllers, CursorDriver::FixedStep(1600));
        runtime.run().unwrap();
        runtime
    }

    #[test]
    fn test_identical_traces_are_byte_identical() {
        let first = scripted_run();
        let second = scripted_run();

        assert_eq!(first.context().frame_index, 9);
        assert_eq!(first.backbuffer(), second.backbuffer());
        assert_eq!(first.platform().audio.ring(), second.platform().audio.ring());
        assert_eq!(
            first.sound().running_sample_index(),
            second.sound().running_sample_index()
        );
        assert_eq!(first.sound().tone(), second.sound().tone());
        assert_eq!(first.context().offsets, second.context().offsets);
    }

    #[test]
    fn test_scripted_run_reaches_expected_state() {
        let runtime = scripted_run();
        assert_eq!(runtime.state(), LoopState::Stopped);
        assert_eq!(runtime.backbuffer().width(), 48);
        assert_eq!(runtime.platform().audio.buffer_size(), 192_000);
        // The stick moved the tone away from its start frequency
        assert_ne!(runtime.sound().tone().tone_hz(), 256);
    }
}
