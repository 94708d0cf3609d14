//! Model run and forecast hour types for the 6-hourly GFS cycle.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GfsError, GfsResult};

/// Hours between consecutive GFS cycles (00Z, 06Z, 12Z, 18Z).
pub const MODEL_HOUR_INTERVAL: u32 = 6;

/// A GFS forecast cycle start.
///
/// The wrapped instant is always UTC, aligned to the 6-hour cadence with
/// zeroed minutes and seconds; every constructor enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelRun(DateTime<Utc>);

impl ModelRun {
    /// Build a run from calendar components, rejecting off-cycle hours.
    pub fn from_ymd_hour(year: i32, month: u32, day: u32, hour: u32) -> GfsResult<Self> {
        if hour % MODEL_HOUR_INTERVAL != 0 {
            return Err(GfsError::InvalidRun(format!(
                "cycle hour {:02} is not a multiple of {}",
                hour, MODEL_HOUR_INTERVAL
            )));
        }
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .map(ModelRun)
            .ok_or_else(|| {
                GfsError::InvalidRun(format!(
                    "{:04}-{:02}-{:02} {:02}Z is not a valid date",
                    year, month, day, hour
                ))
            })
    }

    /// Floor an arbitrary instant to the most recent cycle start.
    pub fn floor(instant: DateTime<Utc>) -> Self {
        let run_hour = instant.hour() - instant.hour() % MODEL_HOUR_INTERVAL;
        let naive = instant
            .date_naive()
            .and_hms_opt(run_hour, 0, 0)
            .expect("floored cycle hour is within 0..24");
        ModelRun(Utc.from_utc_datetime(&naive))
    }

    /// The newest cycle that could be fully published at `now`.
    ///
    /// Cycles are never complete the instant they start; `publication_delay`
    /// is the typical lag before all forecast files appear in the bucket.
    pub fn latest_possible(now: DateTime<Utc>, publication_delay: Duration) -> Self {
        Self::floor(now - publication_delay)
    }

    /// Step back a whole number of cycles.
    pub fn minus_cycles(&self, cycles: u32) -> Self {
        ModelRun(self.0 - Duration::hours((cycles * MODEL_HOUR_INTERVAL) as i64))
    }

    /// The cycle start instant.
    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Valid time of a forecast issued by this run.
    pub fn valid_time(&self, forecast: ForecastHour) -> DateTime<Utc> {
        self.0 + Duration::hours(forecast.hours() as i64)
    }
}

/// Non-negative lead time in hours from a model run's start.
///
/// No upper bound is enforced here; the remote store defines which lead
/// times actually exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ForecastHour(u32);

impl ForecastHour {
    pub fn new(hours: u32) -> Self {
        Self(hours)
    }

    pub fn hours(&self) -> u32 {
        self.0
    }

    /// Parse a path segment like `24`, `f24`, or `fh024`.
    pub fn parse_spec(spec: &str) -> GfsResult<Self> {
        let lowered = spec.to_ascii_lowercase();
        lowered
            .trim_start_matches(['f', 'h'])
            .parse::<u32>()
            .map(ForecastHour)
            .map_err(|_| GfsError::InvalidPath(format!("bad forecast hour spec: {}", spec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_floor_to_cycle() {
        let now = Utc.with_ymd_and_hms(2023, 4, 8, 14, 37, 12).unwrap();
        let run = ModelRun::floor(now);
        assert_eq!(run.datetime().hour(), 12);
        assert_eq!(run.datetime().minute(), 0);
        assert_eq!(run.datetime().second(), 0);
    }

    #[test]
    fn test_floor_is_identity_on_cycle_start() {
        let exact = Utc.with_ymd_and_hms(2023, 4, 8, 6, 0, 0).unwrap();
        assert_eq!(ModelRun::floor(exact).datetime(), exact);
    }

    #[test]
    fn test_latest_possible_crosses_day_boundary() {
        // 00:30Z minus a 2 hour delay lands in the previous day's 18Z cycle.
        let now = Utc.with_ymd_and_hms(2023, 4, 9, 0, 30, 0).unwrap();
        let run = ModelRun::latest_possible(now, Duration::hours(2));
        assert_eq!(run.datetime().day(), 8);
        assert_eq!(run.datetime().hour(), 18);
    }

    #[test]
    fn test_minus_cycles() {
        let run = ModelRun::from_ymd_hour(2023, 4, 9, 0).unwrap();
        let two_back = run.minus_cycles(2);
        assert_eq!(two_back.datetime().day(), 8);
        assert_eq!(two_back.datetime().hour(), 12);
    }

    #[test]
    fn test_off_cycle_hour_rejected() {
        assert!(ModelRun::from_ymd_hour(2023, 4, 8, 13).is_err());
        assert!(ModelRun::from_ymd_hour(2023, 4, 8, 18).is_ok());
    }

    #[test]
    fn test_valid_time() {
        let run = ModelRun::from_ymd_hour(2023, 4, 8, 12).unwrap();
        let valid = run.valid_time(ForecastHour::new(24));
        assert_eq!(valid, Utc.with_ymd_and_hms(2023, 4, 9, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_forecast_spec() {
        assert_eq!(ForecastHour::parse_spec("24").unwrap().hours(), 24);
        assert_eq!(ForecastHour::parse_spec("f024").unwrap().hours(), 24);
        assert_eq!(ForecastHour::parse_spec("FH6").unwrap().hours(), 6);
        assert!(ForecastHour::parse_spec("abc").is_err());
        assert!(ForecastHour::parse_spec("").is_err());
    }
}
