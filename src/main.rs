use alarm_window::config::Config;
use alarm_window::{net, simulate, snapshot, timestamp, SelectionResult};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const MAX_DEMO_READINGS: i64 = 10_000;
const DEMO_STEP_MINUTES: i64 = 5;

#[derive(Parser, Debug)]
#[command(
    name = "alarm-window",
    version,
    about = "Pick the sensor readings surrounding a home-safety alarm"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch an alarm and its device's readings from the backend.
    Alarm {
        id: i64,
        #[arg(long)]
        count: Option<u32>,
    },
    /// List alarms known to the backend.
    Alarms,
    /// Select from a saved sensor-readings response.
    File {
        path: PathBuf,
        #[arg(long)]
        alarm_time: Option<String>,
    },
    /// Select from a synthetic CO series.
    Demo {
        #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..=MAX_DEMO_READINGS))]
        count: u32,
        #[arg(long)]
        alarm_time: Option<String>,
    },
}

fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let result = if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|err| anyhow::anyhow!(err.to_string()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(result: &SelectionResult) -> Result<()> {
    tracing::info!(
        selected = result.len(),
        anchor_id = result.anchor().map(|r| r.id),
        fallback = result.is_fallback(),
        "Selection complete."
    );
    print_json(result)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let config = Config::load()?;
    tracing::debug!(backend_url = %config.backend_url, window_size = config.window_size, "Loaded configuration.");
    let selector = config.selector()?;

    match args.command {
        Command::Alarm { id, count } => {
            let client = net::build_client(&config)?;
            let count = count.unwrap_or(config.reading_count);
            let payload = match net::fetch_alarm_readings(&client, &config, id, count).await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(alarm_id = id, error = %e, "Failed to fetch alarm readings.");
                    return Err(e);
                }
            };
            report(&selector.select_for_alarm(&payload)?)
        }
        Command::Alarms => {
            let client = net::build_client(&config)?;
            print_json(&net::fetch_alarms(&client, &config).await?)
        }
        Command::File { path, alarm_time } => {
            let mut payload = snapshot::load(&path)?;
            if alarm_time.is_some() {
                payload.alarm.timestamp = alarm_time;
            }
            report(&selector.select_for_alarm(&payload)?)
        }
        Command::Demo { count, alarm_time } => {
            let step = Duration::minutes(DEMO_STEP_MINUTES);
            let span = Duration::try_minutes(DEMO_STEP_MINUTES * i64::from(count))
                .context("demo series span is out of range")?;
            let start = Utc::now().naive_utc() - span;
            let mut readings = simulate::generate_series("demo-co", start, count as usize, step);
            let alarm_time = alarm_time.or_else(|| {
                readings
                    .last()
                    .and_then(|r| r.timestamp)
                    .map(|ts| timestamp::format(ts - Duration::minutes(1)))
            });
            simulate::shuffle(&mut readings);
            let result = selector
                .try_select(Some(readings.as_slice()), alarm_time.as_deref())
                .context("demo selection failed")?;
            report(&result)
        }
    }
}
