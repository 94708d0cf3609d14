//! Parser for GRIB `.idx` sidecar files.
//!
//! An `.idx` file maps the messages inside a large GRIB file to byte
//! offsets, one colon-delimited record per line:
//!
//! ```text
//! 1:0:d=2023040812:PRMSL:mean sea level:anl:
//! 2:1005022:d=2023040812:CLMR:1 hybrid level:anl:
//! 3:1115513:d=2023040812:ICMR:1 hybrid level:anl:
//! ```
//!
//! Records are ascending by start byte. Each message ends where the next
//! one starts; the last message runs to the end of the file, so a client
//! holding the parsed map can fetch any single message with one HTTP
//! Range request.

use std::collections::HashMap;

use gfs_common::{GfsError, GfsResult};
use serde::Serialize;

/// Fields per record: seq, start byte, run tag, parameter, level, descriptor.
const FIELDS_PER_RECORD: usize = 6;

/// Byte span of one GRIB message.
///
/// `end` is exclusive; `None` means the message runs to the end of the
/// file and a ranged fetch must be open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Value for an HTTP `Range` header covering this span.
    ///
    /// HTTP ranges are inclusive on both ends, so a bounded span drops one
    /// byte off the exclusive end.
    pub fn to_range_header(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end - 1),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Parsed index: level -> parameter -> byte range.
pub type IndexMap = HashMap<String, HashMap<String, ByteRange>>;

/// Parse `.idx` text into an [`IndexMap`].
///
/// Records are scanned in reverse so each one can take the start byte of
/// its successor as its exclusive end; the first record scanned (the
/// file's last) gets an unbounded end. Any line that does not split into
/// the six expected fields, or whose start byte is not numeric, fails the
/// whole parse: the format gives no safe way to skip a corrupt record.
pub fn parse_idx(idx: &str) -> GfsResult<IndexMap> {
    let mut map: IndexMap = HashMap::new();
    let mut next_start: Option<u64> = None;

    let lines: Vec<&str> = idx.lines().collect();
    for (line_no, line) in lines.iter().enumerate().rev() {
        let fields: Vec<&str> = line.trim_end_matches(':').split(':').collect();
        if fields.len() != FIELDS_PER_RECORD {
            return Err(GfsError::MalformedIndex {
                line: line_no + 1,
                message: format!(
                    "expected {} fields, got {}",
                    FIELDS_PER_RECORD,
                    fields.len()
                ),
            });
        }

        let start: u64 = fields[1].parse().map_err(|_| GfsError::MalformedIndex {
            line: line_no + 1,
            message: format!("bad start byte: {:?}", fields[1]),
        })?;
        let parameter = fields[3];
        let level = fields[4];

        map.entry(level.to_string()).or_default().insert(
            parameter.to_string(),
            ByteRange {
                start,
                end: next_start,
            },
        );
        next_start = Some(start);
    }

    Ok(map)
}
