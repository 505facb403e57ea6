//! Shared constants, angle wrapping and time conversions.

use bevy::prelude::*;
use std::f64::consts::TAU;

/// Ordering of the per-frame work.
///
/// All bodies are propagated before the camera reads its anchor, and the
/// camera settles before transforms are written for rendering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Clock advance, time travel and orbit propagation.
    Propagate,
    /// Camera anchor tracking and focus transitions.
    Camera,
    /// Copy registry state into render transforms.
    Sync,
}

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Milliseconds per day
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Julian Date of the Unix epoch (1970-01-01T00:00:00Z)
pub const JD_UNIX_EPOCH: f64 = 2440587.5;

/// Julian Date of J2000.0 (2000-01-01T12:00 TT)
pub const J2000_JD: f64 = 2451545.0;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Scene length unit: one Earth radius (6378 km).
pub const EARTH_RADIUS: f64 = 1.0;

/// Earth's semi-major axis in scene units; also the AU-to-scene scale.
pub const EARTH_A: f64 = 23455.0;

/// Sun radius in scene units.
pub const SUN_RADIUS: f64 = 109.0;

/// Fraction of a body's radius the camera may approach (measured from the centre).
pub const CONTROL_MIN_DISTANCE: f64 = 1.0003;

/// Wrap an angle to `[0, 2π)`.
///
/// Used everywhere a mean anomaly is stored. Idempotent, and never returns 2π
/// even when `rem_euclid` rounds a tiny negative remainder up to it.
pub fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest unsigned distance between two angles, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = wrap_two_pi(a - b);
    d.min(TAU - d)
}

/// Convert a Julian Date to Unix milliseconds.
pub fn jd_to_unix_ms(jd: f64) -> f64 {
    (jd - JD_UNIX_EPOCH) * MS_PER_DAY
}

/// Convert Unix milliseconds to a Julian Date.
pub fn unix_ms_to_jd(unix_ms: f64) -> f64 {
    unix_ms / MS_PER_DAY + JD_UNIX_EPOCH
}

/// Current wall-clock time as Unix milliseconds.
pub fn current_unix_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or_default()
}

/// Format Unix milliseconds as `YYYY-MM-DD HH:MM UTC`.
///
/// Display only; ignores leap seconds.
pub fn unix_ms_to_date_string(unix_ms: f64) -> String {
    let total_minutes = (unix_ms / 60_000.0).floor() as i64;
    let days = total_minutes.div_euclid(1440);
    let minute_of_day = total_minutes.rem_euclid(1440);

    let (year, month, day) = days_to_ymd(days);

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02} UTC",
        year,
        month,
        day,
        minute_of_day / 60,
        minute_of_day % 60
    )
}

/// Convert days since Unix epoch to year, month, day (proleptic Gregorian).
fn days_to_ymd(days: i64) -> (i64, u32, u32) {
    let shifted = days + 719468;
    let era = shifted.div_euclid(146097);
    let day_of_era = shifted.rem_euclid(146097) as u32;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era as i64 + era * 400;

    (if month <= 2 { year + 1 } else { year }, month, day)
}
