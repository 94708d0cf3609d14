//! Latest-complete-run resolution against the object store listing.
//!
//! A cycle's forecast files appear in the bucket one by one over roughly
//! an hour, so "newest run" is only usable once the full set is there.
//! The resolver walks candidate cycles newest-first and picks the first
//! one whose published file count matches the expected total.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use gfs_common::{keys, GfsError, GfsResult, ModelRun};

use crate::config::ModelSourceConfig;
use crate::store::ObjectLister;

/// Whether a key is a final per-forecast-hour data file.
///
/// Listings also carry the analysis-only object and the `.idx` sidecars;
/// neither counts toward run completeness.
fn is_forecast_data_key(key: &str) -> bool {
    !key.ends_with(".anl") && !key.ends_with(".idx")
}

/// Count of published forecast files for one candidate run.
async fn count_forecast_files(
    lister: &dyn ObjectLister,
    config: &ModelSourceConfig,
    run: &ModelRun,
) -> GfsResult<usize> {
    let url = keys::listing_url(&config.bucket, run);
    let keys = lister.list_keys(&url).await?;
    Ok(keys.iter().filter(|k| is_forecast_data_key(k)).count())
}

/// Resolve the newest run whose full forecast set has been published.
///
/// Candidates are checked newest-first and the first complete one wins,
/// so the result is always the newest complete run. A listing failure
/// aborts resolution instead of falling through to an older cycle; a
/// transient outage must surface as an error, never as stale data.
pub async fn latest_complete_run(
    lister: &dyn ObjectLister,
    config: &ModelSourceConfig,
    now: DateTime<Utc>,
) -> GfsResult<ModelRun> {
    let latest_possible = ModelRun::latest_possible(
        now,
        Duration::hours(config.publication_delay_hours as i64),
    );

    for cycles_back in 0..config.max_runs_to_check {
        let run = latest_possible.minus_cycles(cycles_back);
        let count = count_forecast_files(lister, config, &run).await?;

        if count == config.expected_forecast_files {
            info!(run = %run.datetime(), forecasts = count, "Found complete run");
            return Ok(run);
        }

        debug!(
            run = %run.datetime(),
            forecasts = count,
            expected = config.expected_forecast_files,
            "Run incomplete"
        );
    }

    Err(GfsError::RunNotResolved {
        candidates_checked: config.max_runs_to_check,
    })
}
