//! Alarm-anchored window selection.
//!
//! Given a device's readings and the raw time an alarm was reported, pick the
//! reading closest to the alarm plus the readings leading up to it, oldest
//! first, with only the closest one flagged as the alarm point.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::error::SelectError;
use crate::timestamp;
use crate::types::{AlarmSensorReadings, SensorReading};

pub const DEFAULT_WINDOW_SIZE: usize = 5;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    MissingAlarmTime,
    UnparsableAlarmTime,
    NoTimestampedReadings,
    AnchorTooFar,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Anchored { anchor_id: i64, distance_ms: i64 },
    Fallback { reason: FallbackReason },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub readings: Vec<SensorReading>,
    pub outcome: SelectionOutcome,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SensorReading> {
        self.readings.iter()
    }

    /// The flagged reading, if the selection found one.
    pub fn anchor(&self) -> Option<&SensorReading> {
        self.readings.iter().find(|r| r.is_alarm_point)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, SelectionOutcome::Fallback { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelector {
    window_size: usize,
    max_anchor_distance: Option<Duration>,
}

impl Default for WindowSelector {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_anchor_distance: None,
        }
    }
}

impl WindowSelector {
    /// `max_anchor_distance` of `None` accepts the nearest reading no matter how far away it is.
    pub fn new(
        window_size: usize,
        max_anchor_distance: Option<Duration>,
    ) -> Result<Self, SelectError> {
        if window_size == 0 {
            return Err(SelectError::InvalidArgument(
                "window size must be at least 1".to_string(),
            ));
        }
        if max_anchor_distance.is_some_and(|d| d < Duration::zero()) {
            return Err(SelectError::InvalidArgument(
                "max anchor distance must not be negative".to_string(),
            ));
        }
        Ok(Self {
            window_size,
            max_anchor_distance,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn max_anchor_distance(&self) -> Option<Duration> {
        self.max_anchor_distance
    }

    pub fn select(&self, readings: &[SensorReading], alarm_time: Option<&str>) -> SelectionResult {
        let sorted = sort_timestamped(readings);

        let alarm_at = match alarm_time {
            None => return self.fallback(&sorted, FallbackReason::MissingAlarmTime),
            Some(raw) if raw.trim().is_empty() => {
                return self.fallback(&sorted, FallbackReason::MissingAlarmTime)
            }
            Some(raw) => match timestamp::parse(raw) {
                Some(ts) => ts,
                None => {
                    debug!(alarm_time = raw, "alarm time matches no known layout");
                    return self.fallback(&sorted, FallbackReason::UnparsableAlarmTime);
                }
            },
        };

        let Some((anchor_index, distance_ms)) = nearest(&sorted, alarm_at) else {
            return self.fallback(&sorted, FallbackReason::NoTimestampedReadings);
        };

        if let Some(limit) = self.max_anchor_distance {
            if distance_ms > limit.num_milliseconds() {
                debug!(
                    distance_ms,
                    limit_ms = limit.num_milliseconds(),
                    "nearest reading is beyond the anchor distance limit"
                );
                return self.fallback(&sorted, FallbackReason::AnchorTooFar);
            }
        }

        let start = anchor_index.saturating_sub(self.window_size - 1);
        let window = sorted[start..=anchor_index]
            .iter()
            .enumerate()
            .map(|(offset, (_, reading))| reading.annotated(start + offset == anchor_index))
            .collect();
        let anchor_id = sorted[anchor_index].1.id;

        debug!(anchor_id, distance_ms, start, anchor_index, "anchored alarm window");
        SelectionResult {
            readings: window,
            outcome: SelectionOutcome::Anchored {
                anchor_id,
                distance_ms,
            },
        }
    }

    /// Like [`select`](Self::select), but for callers whose reading collection may be absent.
    pub fn try_select(
        &self,
        readings: Option<&[SensorReading]>,
        alarm_time: Option<&str>,
    ) -> Result<SelectionResult, SelectError> {
        let readings = readings.ok_or_else(|| {
            SelectError::InvalidArgument("readings collection is required".to_string())
        })?;
        Ok(self.select(readings, alarm_time))
    }

    /// Selects the window for a fetched alarm, ignoring readings from other devices.
    pub fn select_for_alarm(
        &self,
        payload: &AlarmSensorReadings,
    ) -> Result<SelectionResult, SelectError> {
        let device_id = payload.alarm.device_id.as_str();
        let readings: Option<Vec<SensorReading>> = payload.readings.as_ref().map(|readings| {
            readings
                .iter()
                .filter(|r| r.device_id == device_id)
                .cloned()
                .collect()
        });
        self.try_select(readings.as_deref(), payload.alarm.timestamp.as_deref())
    }

    fn fallback(
        &self,
        sorted: &[(NaiveDateTime, &SensorReading)],
        reason: FallbackReason,
    ) -> SelectionResult {
        let start = sorted.len().saturating_sub(self.window_size);
        debug!(?reason, kept = sorted.len() - start, "falling back to most recent readings");
        SelectionResult {
            readings: sorted[start..]
                .iter()
                .map(|(_, reading)| reading.annotated(false))
                .collect(),
            outcome: SelectionOutcome::Fallback { reason },
        }
    }
}

// Readings without a timestamp are dropped; ties on time are ordered by id.
fn sort_timestamped(readings: &[SensorReading]) -> Vec<(NaiveDateTime, &SensorReading)> {
    let mut sorted: Vec<_> = readings
        .iter()
        .filter_map(|r| r.timestamp.map(|ts| (ts, r)))
        .collect();
    sorted.sort_by_key(|(ts, r)| (*ts, r.id));
    sorted
}

// First minimum in ascending time order wins ties.
fn nearest(sorted: &[(NaiveDateTime, &SensorReading)], target: NaiveDateTime) -> Option<(usize, i64)> {
    let mut best: Option<(usize, i64)> = None;
    for (index, (ts, _)) in sorted.iter().enumerate() {
        let distance = (*ts - target).num_milliseconds().abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best
}
