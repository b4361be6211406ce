//! Deadzone application for analog inputs

/// Zero out stick deflection whose magnitude is below `deadzone`.
///
/// Deflection at or beyond the threshold passes through unchanged, so the
/// linear stick-to-control mapping keeps its full range.
pub fn apply_stick_deadzone(value: i16, deadzone: u16) -> i16 {
    if (value as i32).abs() < deadzone as i32 {
        0
    } else {
        value
    }
}
