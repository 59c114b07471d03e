use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::types::{Alarm, AlarmSensorReadings};

pub fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

pub(crate) fn alarm_readings_url(backend_url: &str, alarm_id: i64, count: u32) -> String {
    format!(
        "{}/api/alarms/{}/sensor-readings?count={}",
        backend_url.trim_end_matches('/'),
        alarm_id,
        count
    )
}

pub(crate) fn alarms_url(backend_url: &str) -> String {
    format!("{}/api/alarms", backend_url.trim_end_matches('/'))
}

fn authorized(request: RequestBuilder, config: &Config) -> RequestBuilder {
    let request = request.header("X-Request-Id", Uuid::new_v4().to_string());
    match &config.auth_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Fetches an alarm and up to `count` of its device's most recent readings.
pub async fn fetch_alarm_readings(
    client: &Client,
    config: &Config,
    alarm_id: i64,
    count: u32,
) -> Result<AlarmSensorReadings> {
    let url = alarm_readings_url(&config.backend_url, alarm_id, count);
    let response = authorized(client.get(&url), config)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()?;

    let payload: AlarmSensorReadings = response
        .json()
        .await
        .context("malformed alarm sensor-readings response")?;
    info!(
        alarm_id,
        device_id = %payload.alarm.device_id,
        readings = payload.readings.as_ref().map(Vec::len),
        "Fetched alarm sensor readings."
    );
    Ok(payload)
}

pub async fn fetch_alarms(client: &Client, config: &Config) -> Result<Vec<Alarm>> {
    let url = alarms_url(&config.backend_url);
    let alarms: Vec<Alarm> = authorized(client.get(&url), config)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()?
        .json()
        .await
        .context("malformed alarm list response")?;
    info!(count = alarms.len(), "Fetched alarms.");
    Ok(alarms)
}
