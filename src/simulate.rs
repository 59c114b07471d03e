use chrono::{Duration, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::SensorReading;

/// Produces `count` CO readings spaced `step` apart, starting at `start`.
///
/// Ids run from 1 in time order. Values hover around a quiet-room baseline
/// and ramp up toward the end of the series, roughly the shape seen before a
/// CO alarm trips.
pub fn generate_series(
    device_id: &str,
    start: NaiveDateTime,
    count: usize,
    step: Duration,
) -> Vec<SensorReading> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let baseline = 5.0 + rng.gen::<f64>() * 4.0; // 5 to 9 ppm
            let ramp = if count > 1 {
                (i as f64 / (count - 1) as f64).powi(3) * 60.0
            } else {
                0.0
            };
            SensorReading {
                id: i as i64 + 1,
                device_id: device_id.to_string(),
                timestamp: offset(step, i).and_then(|d| start.checked_add_signed(d)),
                numeric_value: Some(((baseline + ramp) * 10.0).round() / 10.0),
                boolean_value: None,
                is_alarm_point: false,
            }
        })
        .collect()
}

// `None` once the offset no longer fits, leaving that reading untimed.
fn offset(step: Duration, i: usize) -> Option<Duration> {
    i32::try_from(i).ok().and_then(|n| step.checked_mul(n))
}

/// Shuffles readings into arbitrary insertion order, the way a backend may return them.
pub fn shuffle(readings: &mut [SensorReading]) {
    readings.shuffle(&mut rand::thread_rng());
}
