//! Deterministic S3 keys and URLs for GFS 0.25 degree output.
//!
//! Key layout in the bucket:
//! `gfs.{YYYYMMDD}/{HH}/atmos/gfs.t{HH}z.pgrb2.0p25.f{FFF}` plus an `.idx`
//! sidecar per data file.

use chrono::{Datelike, Timelike};

use crate::run::{ForecastHour, ModelRun};

/// Key prefix shared by every pgrb2 0.25 degree object of one cycle.
pub fn grib_file_prefix(run: &ModelRun) -> String {
    let dt = run.datetime();
    format!(
        "gfs.{:04}{:02}{:02}/{:02}/atmos/gfs.t{:02}z.pgrb2.0p25",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.hour()
    )
}

/// List-objects-v2 URL scoped to one cycle's pgrb2 objects.
pub fn listing_url(bucket: &str, run: &ModelRun) -> String {
    format!(
        "https://{}.s3.amazonaws.com/?list-type=2&prefix={}",
        bucket,
        grib_file_prefix(run)
    )
}

/// Canonical object key for the data file of one (run, forecast) pair.
pub fn data_key(run: &ModelRun, forecast: ForecastHour) -> String {
    format!("{}.f{:03}", grib_file_prefix(run), forecast.hours())
}

/// Full URL of the data file.
pub fn data_url(bucket: &str, run: &ModelRun, forecast: ForecastHour) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, data_key(run, forecast))
}

/// Full URL of the `.idx` sidecar describing the data file's byte layout.
pub fn index_url(bucket: &str, run: &ModelRun, forecast: ForecastHour) -> String {
    format!("{}.idx", data_url(bucket, run, forecast))
}
