//! Per-iteration steps of the frame loop

use std::time::Duration;

use crate::audio::{AudioDevice, fill_sound_buffer};
use crate::error::DeviceError;
use crate::input::{ControllerSource, ControllerState, MAX_CONTROLLERS, apply_stick_deadzone};
use crate::pattern::paint_gradient;
use crate::platform::{AppEvent, Clock, Collaborators, EventSource, Platform, Presenter};

use super::timing::counter_duration;
use super::{AppContext, LoopState, RuntimeConfig};

/// Execute one iteration
///
/// Events are drained first; a quit request ends the iteration there.
/// Otherwise controllers, audio, painting, presentation and timing run in
/// that order. Per-step failures are logged and never stop the loop.
pub fn execute_frame<P: Platform>(
    config: &RuntimeConfig,
    platform: &mut Collaborators<P>,
    ctx: &mut AppContext,
) -> LoopState {
    ctx.frame_start = platform.clock.counter();

    if handle_events(&mut platform.events, ctx) == LoopState::Stopped {
        return LoopState::Stopped;
    }

    poll_controllers(&mut platform.controllers, config, ctx);
    write_audio(&mut platform.audio, ctx);
    paint_gradient(&mut ctx.backbuffer, ctx.offsets.blue, ctx.offsets.green);
    present(&mut platform.presenter, ctx);

    let work = record_timing(&platform.clock, config, ctx);
    pace(&mut platform.clock, config, work);

    ctx.frame_index += 1;
    LoopState::Running
}

/// Drain every pending event, then report whether the loop should go on
pub(super) fn handle_events<E: EventSource>(events: &mut E, ctx: &mut AppContext) -> LoopState {
    for result in events.pump_events() {
        match result {
            Ok(event) => dispatch_event(event, ctx),
            Err(e) => tracing::warn!("Event dispatch failed: {}", e),
        }
    }
    ctx.state
}

fn dispatch_event(event: AppEvent, ctx: &mut AppContext) {
    if event.is_quit() {
        if ctx.state == LoopState::Running {
            tracing::info!("Quit requested ({:?})", event);
        }
        ctx.state = LoopState::Stopped;
        return;
    }

    match event {
        AppEvent::Resized { width, height } => {
            // Minimized surfaces report 0x0; keep drawing into the old buffer
            if width == 0 || height == 0 {
                return;
            }
            if (width, height) == (ctx.backbuffer.width(), ctx.backbuffer.height()) {
                return;
            }
            if let Err(e) = ctx.backbuffer.resize(width, height) {
                tracing::warn!(
                    "Keeping {}x{} backbuffer: {}",
                    ctx.backbuffer.width(),
                    ctx.backbuffer.height(),
                    e
                );
            }
        }
        AppEvent::Key {
            code,
            is_down,
            was_down,
            ..
        } => {
            if is_down != was_down {
                tracing::trace!(
                    "Key {:?} {}",
                    code,
                    if is_down { "pressed" } else { "released" }
                );
            }
        }
        AppEvent::Activated(active) => {
            tracing::debug!("Application {}", if active { "activated" } else { "deactivated" });
        }
        AppEvent::Quit | AppEvent::CloseRequested => {}
    }
}

/// Poll every slot; connected pads scroll the gradient and bend the tone
pub(super) fn poll_controllers<C: ControllerSource>(
    controllers: &mut C,
    config: &RuntimeConfig,
    ctx: &mut AppContext,
) {
    controllers.refresh();

    let divisor = config.scroll_divisor.max(1);
    for slot in 0..MAX_CONTROLLERS {
        let ControllerState::Connected(pad) = controllers.poll(slot) else {
            continue;
        };

        let stick_x = apply_stick_deadzone(pad.stick_x, config.stick_deadzone) as i32;
        let stick_y = apply_stick_deadzone(pad.stick_y, config.stick_deadzone) as i32;

        ctx.offsets.blue = ctx.offsets.blue.wrapping_add(stick_x / divisor);
        ctx.offsets.green = ctx.offsets.green.wrapping_add(stick_y / divisor);

        let bend = (config.hz_range as f32 * (stick_y as f32 / 30000.0)) as i32;
        let tone_hz = config.center_hz.saturating_add(bend);
        ctx.sound.tone_mut().set_tone_hz(tone_hz.max(1) as u32);
    }
}

/// Fill this frame's write window ahead of the play cursor
pub(super) fn write_audio<A: AudioDevice>(audio: &mut A, ctx: &mut AppContext) {
    let cursors = match audio.cursors() {
        Ok(cursors) => cursors,
        Err(e) => {
            tracing::warn!("Failed to read audio cursors: {}", e);
            return;
        }
    };

    let window = ctx.sound.write_window(cursors.play);
    ctx.last_window = Some(window);

    match fill_sound_buffer(&mut ctx.sound, audio, window.byte_to_lock, window.bytes_to_write) {
        Ok(_) => {}
        Err(DeviceError::Busy) => {
            tracing::debug!(
                "Audio ring busy, skipping {} bytes at {}",
                window.bytes_to_write,
                window.byte_to_lock
            );
        }
        Err(e) => tracing::warn!("Audio fill failed: {}", e),
    }
}

fn present<S: Presenter>(presenter: &mut S, ctx: &AppContext) {
    let (width, height) = presenter.drawable_size();
    if let Err(e) = presenter.present(&ctx.backbuffer, width, height) {
        tracing::warn!("{}", e);
    }
}

/// Record frame-to-frame timing and return the time spent working this frame
fn record_timing<C: Clock>(clock: &C, config: &RuntimeConfig, ctx: &mut AppContext) -> Duration {
    let stats = ctx.timing.lap(clock);
    ctx.last_stats = stats;
    ctx.history.push(stats.ms_per_frame as f32);

    tracing::debug!(
        "{:.02}ms/f, {:.02}f/s, {:.02}mc/f",
        stats.ms_per_frame,
        stats.fps,
        stats.mcycles_per_frame
    );

    let work = counter_duration(clock.counter().wrapping_sub(ctx.frame_start), clock.frequency());
    if work > config.cpu_budget {
        tracing::warn!(
            "Frame took {:?}, exceeds budget of {:?}",
            work,
            config.cpu_budget
        );
    }
    work
}

/// Sleep out the rest of the frame period when paced
fn pace<C: Clock>(clock: &mut C, config: &RuntimeConfig, work: Duration) {
    if let Some(remaining) = config
        .frame_duration()
        .and_then(|period| period.checked_sub(work))
        .filter(|remaining| !remaining.is_zero())
    {
        clock.sleep(remaining);
    }
}
