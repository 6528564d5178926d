//! Human-readable byte-size formatting for [`crate::global::GlobalAllocator::stat`].

use core::fmt::Write as _;

const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
const SCALE: f64 = 1024.0;

/// Formats `bytes` auto-scaled to the largest unit in [`UNITS`] that keeps
/// the value at least 1.0, with two decimal places (none for plain bytes).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = UNITS[0];

    for candidate in &UNITS[1..] {
        if value < SCALE {
            break;
        }
        value /= SCALE;
        unit = candidate;
    }

    let mut out = String::new();
    if unit == "B" {
        let _ = write!(out, "{bytes} {unit}");
    } else {
        let _ = write!(out, "{value:.2} {unit}");
    }
    out
}
