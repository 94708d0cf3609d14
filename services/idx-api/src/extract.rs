//! Range extraction over a parsed index.
//!
//! One orchestrator covers both request modes: return the whole parsed
//! index for inspection, or extract a single variable's bytes with a
//! ranged GET. The byte-range lookup happens before any data fetch, so an
//! absent variable never costs a round trip to the data file.

use bytes::Bytes;
use tracing::debug;

use gfs_common::{keys, ForecastHour, GfsError, GfsResult, ModelRun};
use grib_idx::{parse_idx, ByteRange, IndexMap};

use crate::store::ObjectFetcher;

/// One cycle's index file, fetched and parsed.
pub struct ParsedIndex {
    pub idx_url: String,
    pub grib_url: String,
    pub index: IndexMap,
}

impl ParsedIndex {
    /// Byte range for one (level, parameter) pair.
    pub fn byte_range(&self, level: &str, parameter: &str) -> GfsResult<ByteRange> {
        self.index
            .get(level)
            .and_then(|params| params.get(parameter))
            .copied()
            .ok_or_else(|| GfsError::VariableNotFound {
                level: level.to_string(),
                parameter: parameter.to_string(),
            })
    }

    /// Drop every level except `level`. An unknown level leaves the map empty.
    pub fn retain_level(&mut self, level: &str) {
        self.index.retain(|k, _| k == level);
    }
}

/// Fetch and parse the `.idx` sidecar for one (run, forecast) pair.
pub async fn fetch_index(
    fetcher: &dyn ObjectFetcher,
    bucket: &str,
    run: &ModelRun,
    forecast: ForecastHour,
) -> GfsResult<ParsedIndex> {
    let idx_url = keys::index_url(bucket, run, forecast);
    let grib_url = keys::data_url(bucket, run, forecast);

    debug!(url = %idx_url, "Fetching index");
    let body = fetcher.fetch_text(&idx_url).await?;
    let index = parse_idx(&body)?;

    Ok(ParsedIndex {
        idx_url,
        grib_url,
        index,
    })
}

/// One GRIB message extracted via a ranged GET.
pub struct GribSlice {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub range: ByteRange,
}

/// Fetch a single variable's bytes without downloading the full file.
pub async fn fetch_variable(
    fetcher: &dyn ObjectFetcher,
    parsed: &ParsedIndex,
    level: &str,
    parameter: &str,
) -> GfsResult<GribSlice> {
    let range = parsed.byte_range(level, parameter)?;
    let (bytes, content_type) = fetcher.fetch_range(&parsed.grib_url, range).await?;

    Ok(GribSlice {
        bytes,
        content_type,
        range,
    })
}
