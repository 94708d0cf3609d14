//! Shared types for the GFS index and range-extraction services.

pub mod error;
pub mod keys;
pub mod run;

pub use error::{GfsError, GfsResult};
pub use run::{ForecastHour, ModelRun, MODEL_HOUR_INTERVAL};
