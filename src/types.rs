use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timestamp;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub id: i64,
    pub device_id: String,
    #[serde(default, with = "timestamp::lenient")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub numeric_value: Option<f64>,
    #[serde(default)]
    pub boolean_value: Option<bool>,
    /// Output-only annotation; set by the window selector on its own copies.
    #[serde(default)]
    pub is_alarm_point: bool,
}

impl SensorReading {
    pub(crate) fn annotated(&self, is_alarm_point: bool) -> Self {
        Self {
            is_alarm_point,
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: i64,
    pub device_id: String,
    /// Raw backend rendering; parsed leniently at selection time.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

// Body of GET /api/alarms/{id}/sensor-readings
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AlarmSensorReadings {
    pub alarm: Alarm,
    #[serde(default)]
    pub readings: Option<Vec<SensorReading>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_decodes_camel_case_with_lenient_timestamp() {
        let json = r#"{
            "id": 7,
            "deviceId": "co-kitchen",
            "timestamp": "2024-01-01T08:00:00.000Z",
            "numericValue": 35.5
        }"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.id, 7);
        assert_eq!(reading.device_id, "co-kitchen");
        assert_eq!(
            reading.timestamp.map(timestamp::format).as_deref(),
            Some("2024-01-01 08:00:00")
        );
        assert_eq!(reading.numeric_value, Some(35.5));
        assert_eq!(reading.boolean_value, None);
        assert!(!reading.is_alarm_point);
    }

    #[test]
    fn unreadable_timestamp_becomes_none() {
        let json = r#"{"id": 1, "deviceId": "m1", "timestamp": "yesterday", "booleanValue": true}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.timestamp, None);
        assert_eq!(reading.boolean_value, Some(true));

        let json = r#"{"id": 2, "deviceId": "m1", "timestamp": null}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.timestamp, None);
    }

    #[test]
    fn numeric_or_odd_timestamps_never_fail_the_payload() {
        let json = r#"{
            "alarm": {"id": 4, "deviceId": "co-kitchen"},
            "readings": [
                {"id": 1, "deviceId": "co-kitchen", "timestamp": 1704096000000.0},
                {"id": 2, "deviceId": "co-kitchen", "timestamp": 1704096000000},
                {"id": 3, "deviceId": "co-kitchen", "timestamp": false},
                {"id": 4, "deviceId": "co-kitchen", "timestamp": {"seconds": 12}},
                {"id": 5, "deviceId": "co-kitchen", "timestamp": [2024, 1, 1]}
            ]
        }"#;
        let payload: AlarmSensorReadings = serde_json::from_str(json).unwrap();
        let stamps: Vec<Option<String>> = payload
            .readings
            .unwrap()
            .iter()
            .map(|r| r.timestamp.map(timestamp::format))
            .collect();
        assert_eq!(
            stamps,
            vec![
                Some("2024-01-01 08:00:00".to_string()),
                Some("2024-01-01 08:00:00".to_string()),
                None,
                None,
                None,
            ]
        );
    }

    #[test]
    fn reading_serializes_with_display_timestamp_and_reads_back() {
        let timed = SensorReading {
            id: 11,
            device_id: "co2-hall".to_string(),
            timestamp: timestamp::parse("2024-01-01T08:30:00Z"),
            numeric_value: Some(950.0),
            boolean_value: None,
            is_alarm_point: true,
        };
        let value = serde_json::to_value(&timed).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 11,
                "deviceId": "co2-hall",
                "timestamp": "2024-01-01 08:30:00",
                "numericValue": 950.0,
                "booleanValue": null,
                "isAlarmPoint": true
            })
        );
        let back: SensorReading = serde_json::from_value(value).unwrap();
        assert_eq!(back, timed);

        let untimed = SensorReading {
            timestamp: None,
            is_alarm_point: false,
            ..timed
        };
        let value = serde_json::to_value(&untimed).unwrap();
        assert_eq!(value["timestamp"], serde_json::Value::Null);
        let back: SensorReading = serde_json::from_value(value).unwrap();
        assert_eq!(back, untimed);
    }

    #[test]
    fn payload_without_readings_field_is_distinct_from_empty() {
        let missing: AlarmSensorReadings =
            serde_json::from_str(r#"{"alarm": {"id": 3, "deviceId": "d"}}"#).unwrap();
        assert!(missing.readings.is_none());

        let empty: AlarmSensorReadings =
            serde_json::from_str(r#"{"alarm": {"id": 3, "deviceId": "d"}, "readings": []}"#)
                .unwrap();
        assert_eq!(empty.readings.map(|r| r.len()), Some(0));
    }

    #[test]
    fn alarm_type_field_maps_to_kind() {
        let alarm: Alarm = serde_json::from_str(
            r#"{"id": 9, "deviceId": "co2-hall", "timestamp": "2024-01-01 11:05:00", "type": "CO2_HIGH", "value": 1800.0}"#,
        )
        .unwrap();
        assert_eq!(alarm.kind.as_deref(), Some("CO2_HIGH"));
        assert_eq!(alarm.timestamp.as_deref(), Some("2024-01-01 11:05:00"));
    }

    #[test]
    fn annotated_copy_leaves_source_untouched() {
        let source = SensorReading {
            id: 1,
            device_id: "d".to_string(),
            timestamp: None,
            numeric_value: Some(1.0),
            boolean_value: None,
            is_alarm_point: false,
        };
        let flagged = source.annotated(true);
        assert!(flagged.is_alarm_point);
        assert!(!source.is_alarm_point);
        assert_eq!(flagged.id, source.id);
    }
}
