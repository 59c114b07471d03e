use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::types::AlarmSensorReadings;

/// Loads a captured sensor-readings response so it can be replayed offline.
pub fn load(path: &Path) -> Result<AlarmSensorReadings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let payload: AlarmSensorReadings = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    info!(
        path = %path.display(),
        alarm_id = payload.alarm.id,
        readings = payload.readings.as_ref().map(Vec::len),
        "Loaded snapshot."
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_backend_shaped_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "alarm": {{"id": 5, "deviceId": "co-1", "timestamp": "2024-01-01T11:05:00Z"}},
                "readings": [
                    {{"id": 1, "deviceId": "co-1", "timestamp": "2024-01-01 11:00:00", "numericValue": 48.0}}
                ]
            }}"#
        )
        .unwrap();
        let payload = load(file.path()).unwrap();
        assert_eq!(payload.alarm.id, 5);
        assert_eq!(payload.readings.map(|r| r.len()), Some(1));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load(file.path()).is_err());
    }
}
