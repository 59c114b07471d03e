pub mod config;
pub mod error;
pub mod net;
pub mod selector;
pub mod simulate;
pub mod snapshot;
pub mod timestamp;
pub mod types;

pub use error::SelectError;
pub use selector::{FallbackReason, SelectionOutcome, SelectionResult, WindowSelector};
pub use types::{Alarm, AlarmSensorReadings, SensorReading};
